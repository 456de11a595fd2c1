use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::classify::{MediaContext, MediaFile};
use crate::config::{Config, ConvertConfig, LoopConfig, SnapshotConfig};
use crate::error::{MediaError, Result};
use crate::filter::FilterGraph;
use crate::naming::{extension_of, timestamped_name};

/// Target format of `convert`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }
}

impl FromStr for AudioFormat {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "wav" => Ok(AudioFormat::Wav),
            "mp3" => Ok(AudioFormat::Mp3),
            _ => Err(MediaError::InvalidFormat(format!(
                "Unknown format '{}'. Valid values are [mp3|wav]",
                s
            ))),
        }
    }
}

/// Image format of `snapshot`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Png,
    Jpg,
}

impl SnapshotFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SnapshotFormat::Png => "png",
            SnapshotFormat::Jpg => "jpg",
        }
    }
}

impl FromStr for SnapshotFormat {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "png" => Ok(SnapshotFormat::Png),
            "jpg" => Ok(SnapshotFormat::Jpg),
            _ => Err(MediaError::InvalidFormat(format!(
                "Unknown format '{}'. Valid values are [png|jpg]",
                s
            ))),
        }
    }
}

/// One encoder run: the program and its arguments, one token per argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub description: String,
}

impl EncoderInvocation {
    pub fn new<S1: Into<String>, S2: Into<String>>(program: S1, description: S2) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy())
    }

    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy())
    }

    pub fn no_audio(self) -> Self {
        self.arg("-an")
    }

    pub fn audio_channels(self, channels: u32) -> Self {
        self.arg("-ac").arg(channels.to_string())
    }

    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.arg("-ar").arg(rate.to_string())
    }

    pub fn audio_bitrate<S: Into<String>>(self, bitrate: S) -> Self {
        self.arg("-b:a").arg(bitrate)
    }

    pub fn map<S: Into<String>>(self, stream: S) -> Self {
        self.arg("-map").arg(stream)
    }

    pub fn filter_complex(self, graph: &FilterGraph) -> Self {
        self.arg("-filter_complex").arg(graph.to_string())
    }

    pub fn seek(self, seconds: u64) -> Self {
        self.arg("-ss").arg(seconds.to_string())
    }

    pub fn frames(self, count: u32) -> Self {
        self.arg("-vframes").arg(count.to_string())
    }

    pub fn quality(self, scale: u32) -> Self {
        self.arg("-qscale:v").arg(scale.to_string())
    }
}

impl fmt::Display for EncoderInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.program, self.args)
    }
}

/// A planned filesystem rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub from: PathBuf,
    pub to: PathBuf,
}

fn ensure_eligible(file: &MediaFile, context: MediaContext) -> Result<()> {
    if file.is_eligible_for(context) {
        Ok(())
    } else {
        Err(MediaError::UnsupportedMediaType(file.path.display().to_string()))
    }
}

/// Builds argument vectors for every operation. Never runs anything.
#[derive(Debug, Clone)]
pub struct CommandAssembler {
    binary_path: String,
    hide_banner: bool,
    overwrite: bool,
    convert: ConvertConfig,
    looping: LoopConfig,
    snapshot: SnapshotConfig,
}

impl CommandAssembler {
    pub fn new(config: &Config) -> Self {
        Self {
            binary_path: config.media.binary_path.clone(),
            hide_banner: config.media.hide_banner,
            overwrite: config.media.overwrite,
            convert: config.convert.clone(),
            looping: config.looping.clone(),
            snapshot: config.snapshot.clone(),
        }
    }

    fn base<S: Into<String>>(&self, description: S) -> EncoderInvocation {
        let mut invocation = EncoderInvocation::new(&self.binary_path, description);
        if self.hide_banner {
            invocation = invocation.arg("-hide_banner");
        }
        if self.overwrite {
            invocation = invocation.arg("-y");
        }
        invocation
    }

    /// Convert several audio files in one run. Inputs are mapped by position,
    /// so the n-th job reads stream `n:a`.
    pub fn assemble_convert(
        &self,
        jobs: &[(MediaFile, PathBuf)],
        format: AudioFormat,
    ) -> Result<EncoderInvocation> {
        if jobs.is_empty() {
            return Err(MediaError::UnsupportedMediaType("no audio inputs".to_string()));
        }
        for (file, _) in jobs {
            ensure_eligible(file, MediaContext::Audio)?;
        }

        let mut invocation = self.base(format!("Convert {} file(s) to {}", jobs.len(), format.extension()));
        for (file, _) in jobs {
            invocation = invocation.input(&file.path);
        }

        for (index, (_, output)) in jobs.iter().enumerate() {
            invocation = invocation
                .audio_channels(self.convert.channels)
                .audio_sample_rate(self.convert.sample_rate);
            if format == AudioFormat::Mp3 {
                invocation = invocation.audio_bitrate(&self.convert.mp3_bitrate);
            }
            invocation = invocation.map(format!("{}:a", index)).output(output);
        }

        Ok(invocation)
    }

    /// Loop through the concat demuxer, reading a playlist that lists the source repeatedly
    pub fn assemble_loop_playlist(
        &self,
        file: &MediaFile,
        playlist: &Path,
        output: &Path,
    ) -> Result<EncoderInvocation> {
        ensure_eligible(file, MediaContext::Video)?;

        Ok(self
            .base(format!("Loop {}", file.path.display()))
            .arg("-f").arg("concat")
            .arg("-safe").arg("0")
            .input(playlist)
            .args(self.looping.concat_options.iter().cloned())
            .output(output))
    }

    /// Loop through a filter graph on a single input. Audio is dropped.
    pub fn assemble_loop_graph(
        &self,
        file: &MediaFile,
        graph: &FilterGraph,
        output: &Path,
    ) -> Result<EncoderInvocation> {
        ensure_eligible(file, MediaContext::Video)?;

        Ok(self
            .base(format!("Loop {}", file.path.display()))
            .input(&file.path)
            .args(self.looping.video_options.iter().cloned())
            .no_audio()
            .filter_complex(graph)
            .map(graph.map_target())
            .output(output))
    }

    /// Extract a single frame at `timestamp` seconds
    pub fn assemble_snapshot(
        &self,
        file: &MediaFile,
        timestamp: u64,
        output: &Path,
    ) -> Result<EncoderInvocation> {
        ensure_eligible(file, MediaContext::Video)?;

        Ok(self
            .base(format!("Snapshot of {} at {}s", file.path.display(), timestamp))
            .seek(timestamp)
            .input(&file.path)
            .frames(1)
            .quality(self.snapshot.quality)
            .output(output))
    }

    /// Inspect a file without producing output; the duration shows up in the diagnostics
    pub fn assemble_probe(&self, path: &Path) -> EncoderInvocation {
        EncoderInvocation::new(&self.binary_path, format!("Probe {}", path.display()))
            .arg("-hide_banner")
            .input(path)
    }

    /// Plan renaming a file to its modification time, in the same directory
    pub fn assemble_rename(&self, path: &Path) -> Result<RenamePlan> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| MediaError::PathUnavailable(format!("{}: {}", path.display(), e)))?;
        if metadata.is_dir() {
            return Err(MediaError::NotAFile(path.display().to_string()));
        }

        let modified: chrono::DateTime<chrono::Local> = metadata.modified()?.into();
        let extension = extension_of(path);
        let name = timestamped_name(modified.naive_local(), extension.as_deref());

        let to = match path.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        };

        Ok(RenamePlan {
            from: path.to_path_buf(),
            to,
        })
    }
}

/// Escape a path for a single-quoted concat playlist entry
pub fn playlist_entry(path: &Path) -> String {
    let escaped = path.to_string_lossy().replace('\'', r"'\''");
    format!("file '{}'\n", escaped)
}
