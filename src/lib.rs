//! Mediaprep - batch preparation of media files for ffmpeg
//!
//! Classifies inputs as audio or video, derives output names, and assembles
//! ffmpeg invocations for format conversion, looping (optionally cross-faded),
//! snapshots and timestamped renames.

pub mod cli;
pub mod classify;
pub mod config;
pub mod duration;
pub mod error;
pub mod filter;
pub mod looping;
pub mod media;
pub mod naming;
pub mod workflow;
