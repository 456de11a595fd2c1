// Encoder plumbing
//
// - Commands: typed argument building and the per-operation assembler
// - Processor: runs assembled invocations as subprocesses

pub mod commands;
pub mod processor;

use async_trait::async_trait;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Executes encoder invocations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EncoderRunner: Send + Sync {
    /// Run an invocation to completion, forwarding its output.
    /// Any non-zero exit is an `EncoderFailed` error.
    async fn run(&self, invocation: &EncoderInvocation) -> Result<()>;

    /// Run an invocation and return its diagnostic stream regardless of exit status
    async fn capture(&self, invocation: &EncoderInvocation) -> Result<String>;

    /// Check if the encoder binary can be started
    fn check_availability(&self) -> Result<()>;
}

/// Factory for creating encoder runners
pub struct EncoderRunnerFactory;

impl EncoderRunnerFactory {
    /// Create the default runner (ffmpeg subprocess)
    pub fn create_runner(config: MediaConfig) -> Box<dyn EncoderRunner> {
        Box::new(processor::FfmpegRunner::new(config))
    }
}
