//! Mediaprep - batch preparation of media files for ffmpeg

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mediaprep::cli::{Args, Commands};
use mediaprep::config::{Config, DEFAULT_CONFIG_FILE};
use mediaprep::looping::{LoopRequest, TransitionSpec};
use mediaprep::media::{AudioFormat, SnapshotFormat};
use mediaprep::workflow::{BatchReport, SnapshotPosition, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };

    setup_logging(args.verbose, config.logging.log_dir.as_deref())?;

    let report = match args.command {
        Commands::Convert { format, output_directory, files } => {
            let format: AudioFormat = format.parse()?;
            let workflow = Workflow::new(config, args.verbose);
            workflow.check_encoder();
            workflow.convert(&files, format, output_directory.as_deref()).await?
        }
        Commands::Loop {
            count,
            length,
            with_cross_fade,
            transition_duration,
            output_directory,
            files,
        } => {
            let request = LoopRequest::from_options(count, length)?;
            let transition = TransitionSpec::new(
                with_cross_fade,
                transition_duration.unwrap_or(config.looping.transition_seconds),
            );
            let workflow = Workflow::new(config, args.verbose);
            workflow.check_encoder();
            workflow
                .loop_videos(&files, request, transition, output_directory.as_deref())
                .await?
        }
        Commands::Snapshot { mid, format, output_directory, files } => {
            let format: SnapshotFormat = format.parse()?;
            let position = if mid {
                SnapshotPosition::Midpoint
            } else {
                SnapshotPosition::Fixed
            };
            let workflow = Workflow::new(config, args.verbose);
            workflow.check_encoder();
            workflow
                .snapshot(&files, position, format, output_directory.as_deref())
                .await?
        }
        Commands::Rename { files } => {
            let workflow = Workflow::new(config, args.verbose);
            workflow.rename(&files).await?
        }
    };

    log_report(&report);
    Ok(())
}

fn log_report(report: &BatchReport) {
    if report.failed > 0 {
        info!("{} of {} file(s) failed", report.failed, report.total());
    }
}

/// Setup console logging, plus a daily rolling file when a log directory is configured
fn setup_logging(verbose: bool, log_dir: Option<&Path>) -> Result<()> {
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = rolling::daily(dir, "mediaprep.log");
            let (non_blocking_file, guard) = non_blocking(file_appender);
            // Keep the guard alive for the duration of the program
            std::mem::forget(guard);

            Some(
                fmt::layer()
                    .with_writer(non_blocking_file)
                    .with_target(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    if let Some(dir) = log_dir {
        info!("Logging to {}", dir.join("mediaprep.log").display());
    }

    Ok(())
}
