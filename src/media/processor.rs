use async_trait::async_trait;
use std::process::{Command as StdCommand, Stdio};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{MediaError, Result};
use super::{EncoderInvocation, EncoderRunner};

/// Bytes of diagnostic output kept for error reports
const DIAGNOSTIC_TAIL: usize = 4096;

/// Runs invocations through the ffmpeg binary
pub struct FfmpegRunner {
    config: MediaConfig,
}

impl FfmpegRunner {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }
}

/// Keep only the last `limit` bytes of `buffer`
fn keep_tail(buffer: &mut Vec<u8>, limit: usize) {
    if buffer.len() > limit {
        let excess = buffer.len() - limit;
        buffer.drain(..excess);
    }
}

#[async_trait]
impl EncoderRunner for FfmpegRunner {
    async fn run(&self, invocation: &EncoderInvocation) -> Result<()> {
        debug!("Executing encoder command: {}", invocation);
        debug!("Description: {}", invocation.description);

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MediaError::EncoderFailed(format!("Failed to start {}: {}", invocation.program, e)))?;

        // Forward stderr untouched while keeping its tail for the error report
        let mut diagnostics = Vec::new();
        if let Some(mut stderr) = child.stderr.take() {
            let mut console = tokio::io::stderr();
            let mut chunk = [0u8; 4096];
            loop {
                let read = stderr.read(&mut chunk).await?;
                if read == 0 {
                    break;
                }
                console.write_all(&chunk[..read]).await?;
                diagnostics.extend_from_slice(&chunk[..read]);
                keep_tail(&mut diagnostics, DIAGNOSTIC_TAIL);
            }
            console.flush().await?;
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(MediaError::EncoderFailed(format!(
                "{} failed ({}): {}",
                invocation.description,
                status,
                String::from_utf8_lossy(&diagnostics).trim()
            )));
        }

        Ok(())
    }

    async fn capture(&self, invocation: &EncoderInvocation) -> Result<String> {
        debug!("Capturing encoder diagnostics: {}", invocation);

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| MediaError::EncoderFailed(format!("Failed to start {}: {}", invocation.program, e)))?;

        Ok(String::from_utf8_lossy(&output.stderr).into_owned())
    }

    fn check_availability(&self) -> Result<()> {
        let output = StdCommand::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| MediaError::EncoderFailed(format!("Encoder not found: {}", e)))?;

        if output.status.success() {
            info!("Encoder is available: {}", self.config.binary_path);
            Ok(())
        } else {
            Err(MediaError::EncoderFailed("Encoder version check failed".to_string()))
        }
    }
}
