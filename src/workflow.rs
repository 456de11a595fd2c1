use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::classify::{MediaClassifier, MediaContext, MediaFile, MediaKind};
use crate::config::Config;
use crate::duration::DurationProbe;
use crate::error::{MediaError, Result};
use crate::filter::{build_cross_fade_concat, build_plain_concat};
use crate::looping::{required_loop_count, LoopRequest, TransitionSpec};
use crate::media::{
    playlist_entry, AudioFormat, CommandAssembler, EncoderRunner, EncoderRunnerFactory,
    SnapshotFormat,
};
use crate::naming::{ensure_output_directory, overwrites_input, plan_name};

/// Extension of every loop output
const LOOP_EXTENSION: &str = "mp4";

/// Where a snapshot is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotPosition {
    /// The configured default timestamp
    Fixed,
    /// Half of the probed duration, rounded down
    Midpoint,
}

/// Result of handling one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Processed(PathBuf),
    Skipped(String),
}

/// Per-batch tally. A batch never aborts on a single file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchReport {
    fn record(&mut self, path: &Path, outcome: Result<FileOutcome>, verbose: bool) {
        match outcome {
            Ok(FileOutcome::Processed(output)) => {
                self.succeeded += 1;
                info!("Processed {} -> {}", path.display(), output.display());
            }
            Ok(FileOutcome::Skipped(reason)) => {
                self.skipped += 1;
                if verbose {
                    info!("Skipping {}: {}", path.display(), reason);
                } else {
                    debug!("Skipping {}: {}", path.display(), reason);
                }
            }
            Err(e) => {
                self.failed += 1;
                warn!("Failed to process {}: {}", path.display(), e);
            }
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

pub struct Workflow {
    config: Config,
    runner: Box<dyn EncoderRunner>,
    assembler: CommandAssembler,
    verbose: bool,
}

impl Workflow {
    pub fn new(config: Config, verbose: bool) -> Self {
        let runner = EncoderRunnerFactory::create_runner(config.media.clone());
        Self::with_runner(config, runner, verbose)
    }

    pub fn with_runner(config: Config, runner: Box<dyn EncoderRunner>, verbose: bool) -> Self {
        let assembler = CommandAssembler::new(&config);
        Self {
            config,
            runner,
            assembler,
            verbose,
        }
    }

    /// Warn early when the encoder cannot be started. Each invocation would fail anyway.
    pub fn check_encoder(&self) {
        if let Err(e) = self.runner.check_availability() {
            warn!("{}", e);
        }
    }

    fn classifier(&self, context: MediaContext) -> MediaClassifier {
        MediaClassifier::new(context, self.config.media.sniff_content)
    }

    fn probe(&self) -> DurationProbe<'_> {
        DurationProbe::new(self.runner.as_ref(), &self.assembler)
    }

    /// Diagnostics shown only with `--verbose`
    fn diagnostic(&self, message: &str) {
        if self.verbose {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
    }

    fn inspect(&self, classifier: &MediaClassifier, path: &Path, wanted: MediaKind) -> Result<Option<MediaFile>> {
        let file = classifier.inspect(path)?;
        if file.kind == wanted {
            Ok(Some(file))
        } else {
            Ok(None)
        }
    }

    /// Convert every audio file of the batch in a single encoder run
    pub async fn convert(
        &self,
        files: &[PathBuf],
        format: AudioFormat,
        output_dir: Option<&Path>,
    ) -> Result<BatchReport> {
        info!("Converting {} file(s) to {}", files.len(), format.extension());
        if let Some(dir) = output_dir {
            ensure_output_directory(dir).await?;
        }

        let classifier = self.classifier(MediaContext::Audio);
        let mut report = BatchReport::default();
        let mut jobs = Vec::new();

        for path in files {
            match self.inspect(&classifier, path, MediaKind::Audio) {
                Ok(Some(file)) => {
                    let output = plan_name(path, "", format.extension(), output_dir);
                    if overwrites_input(path, &output) {
                        report.record(path, Ok(FileOutcome::Skipped("output would overwrite input".to_string())), self.verbose);
                        continue;
                    }
                    self.diagnostic(&format!("{} -> {}", path.display(), output.display()));
                    jobs.push((file, output));
                }
                Ok(None) => report.record(path, Ok(FileOutcome::Skipped("not an mp3 or wav file".to_string())), self.verbose),
                Err(e) => report.record(path, Err(e), self.verbose),
            }
        }

        if jobs.is_empty() {
            info!("No audio files to convert");
            return Ok(report);
        }

        let result = match self.assembler.assemble_convert(&jobs, format) {
            Ok(invocation) => {
                self.diagnostic(&format!("Command is {}", invocation));
                self.runner.run(&invocation).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                for (file, output) in jobs {
                    report.record(&file.path, Ok(FileOutcome::Processed(output)), self.verbose);
                }
            }
            Err(e) => {
                warn!("Conversion failed: {}", e);
                report.failed += jobs.len();
            }
        }

        self.summarize("convert", &report);
        Ok(report)
    }

    /// Loop every video of the batch
    pub async fn loop_videos(
        &self,
        files: &[PathBuf],
        request: LoopRequest,
        transition: TransitionSpec,
        output_dir: Option<&Path>,
    ) -> Result<BatchReport> {
        request.validate()?;
        info!("Looping {} file(s): {:?}", files.len(), request);
        if let Some(dir) = output_dir {
            ensure_output_directory(dir).await?;
        }

        let classifier = self.classifier(MediaContext::Video);
        let mut report = BatchReport::default();

        for path in files {
            let outcome = match self.inspect(&classifier, path, MediaKind::Video) {
                Ok(Some(mut file)) => self.loop_one(&mut file, request, transition, output_dir).await,
                Ok(None) => Ok(FileOutcome::Skipped("not a video file".to_string())),
                Err(e) => Err(e),
            };
            report.record(path, outcome, self.verbose);
        }

        self.summarize("loop", &report);
        Ok(report)
    }

    async fn loop_one(
        &self,
        file: &mut MediaFile,
        request: LoopRequest,
        transition: TransitionSpec,
        output_dir: Option<&Path>,
    ) -> Result<FileOutcome> {
        let probe = self.probe();
        let transition_seconds = transition.effective_seconds();

        let count = if request.needs_clip_duration() {
            let clip = probe.duration_of(file).await?;
            required_loop_count(request, clip, transition_seconds)?
        } else {
            required_loop_count(request, 0, 0)?
        };

        let output = plan_name(&file.path, &request.name_suffix(), LOOP_EXTENSION, output_dir);
        self.diagnostic(&format!("Loop {} x{} -> {}", file.path.display(), count, output.display()));

        let invocation = if transition.is_active() {
            let clip = probe.duration_of(file).await?;
            let graph = build_cross_fade_concat(count, transition_seconds, clip)?;
            self.diagnostic(&format!("filter_complex is\n{}", graph));
            self.assembler.assemble_loop_graph(file, &graph, &output)?
        } else if self.config.looping.use_concat_demuxer {
            return self.loop_with_playlist(file, count, output).await;
        } else {
            let graph = build_plain_concat(count)?;
            self.diagnostic(&format!("filter_complex is\n{}", graph));
            self.assembler.assemble_loop_graph(file, &graph, &output)?
        };

        self.runner.run(&invocation).await?;
        Ok(FileOutcome::Processed(output))
    }

    /// Loop through a temporary concat playlist. The playlist is removed when
    /// this returns, whatever the outcome.
    async fn loop_with_playlist(&self, file: &MediaFile, count: u32, output: PathBuf) -> Result<FileOutcome> {
        let source = fs::canonicalize(&file.path).await?;
        let playlist_dir = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);
        let prefix = crate::naming::base_name(&source);

        let mut playlist = tempfile::Builder::new()
            .prefix(&prefix)
            .tempfile_in(&playlist_dir)?;

        let entry = playlist_entry(&source);
        self.diagnostic(&format!("playlist entry is\n{}", entry.trim_end()));
        playlist.write_all(entry.repeat(count as usize).as_bytes())?;
        playlist.flush()?;

        let invocation = self.assembler.assemble_loop_playlist(file, playlist.path(), &output)?;
        self.runner.run(&invocation).await?;

        Ok(FileOutcome::Processed(output))
    }

    /// Extract one frame from every video of the batch
    pub async fn snapshot(
        &self,
        files: &[PathBuf],
        position: SnapshotPosition,
        format: SnapshotFormat,
        output_dir: Option<&Path>,
    ) -> Result<BatchReport> {
        info!("Taking snapshots of {} file(s)", files.len());
        if let Some(dir) = output_dir {
            ensure_output_directory(dir).await?;
        }

        let classifier = self.classifier(MediaContext::Video);
        let mut report = BatchReport::default();

        for path in files {
            let outcome = match self.inspect(&classifier, path, MediaKind::Video) {
                Ok(Some(mut file)) => self.snapshot_one(&mut file, position, format, output_dir).await,
                Ok(None) => Ok(FileOutcome::Skipped("not a video file".to_string())),
                Err(e) => Err(e),
            };
            report.record(path, outcome, self.verbose);
        }

        self.summarize("snapshot", &report);
        Ok(report)
    }

    async fn snapshot_one(
        &self,
        file: &mut MediaFile,
        position: SnapshotPosition,
        format: SnapshotFormat,
        output_dir: Option<&Path>,
    ) -> Result<FileOutcome> {
        let duration = self.probe().duration_of(file).await?;
        let default_timestamp = self.config.snapshot.default_timestamp;

        if duration < default_timestamp {
            return Ok(FileOutcome::Skipped(format!("shorter than {}s", default_timestamp)));
        }

        let timestamp = match position {
            SnapshotPosition::Fixed => default_timestamp,
            SnapshotPosition::Midpoint => {
                let mid = duration / 2;
                self.diagnostic(&format!("Total {}, mid {}", duration, mid));
                mid
            }
        };

        let output = plan_name(&file.path, &timestamp.to_string(), format.extension(), output_dir);
        let invocation = self.assembler.assemble_snapshot(file, timestamp, &output)?;
        self.runner.run(&invocation).await?;

        Ok(FileOutcome::Processed(output))
    }

    /// Rename every file of the batch to its modification time.
    /// Two files with the same modification second and extension collide; the later one wins.
    pub async fn rename(&self, files: &[PathBuf]) -> Result<BatchReport> {
        info!("Renaming {} file(s)", files.len());
        let mut report = BatchReport::default();

        for path in files {
            let outcome = match self.assembler.assemble_rename(path) {
                Ok(plan) => {
                    self.diagnostic(&format!("Rename {} to {}", plan.from.display(), plan.to.display()));
                    fs::rename(&plan.from, &plan.to)
                        .await
                        .map(|_| FileOutcome::Processed(plan.to))
                        .map_err(MediaError::from)
                }
                Err(MediaError::NotAFile(_)) => Ok(FileOutcome::Skipped("directory".to_string())),
                Err(e) => Err(e),
            };
            report.record(path, outcome, self.verbose);
        }

        self.summarize("rename", &report);
        Ok(report)
    }

    fn summarize(&self, operation: &str, report: &BatchReport) {
        info!(
            "{} finished: {} succeeded, {} skipped, {} failed",
            operation, report.succeeded, report.skipped, report.failed
        );
    }
}
