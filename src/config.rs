use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, MediaError};

/// Name of the configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mediaprep.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub media: MediaConfig,
    pub convert: ConvertConfig,
    #[serde(rename = "loop")]
    pub looping: LoopConfig,
    pub snapshot: SnapshotConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Pass `-hide_banner` to every invocation
    pub hide_banner: bool,
    /// Pass `-y` so existing outputs are replaced without prompting
    pub overwrite: bool,
    /// Sniff the first 512 bytes when the extension has no known MIME type
    pub sniff_content: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub channels: u32,
    pub sample_rate: u32,
    /// Bitrate for mp3 output, e.g. "32k"
    pub mp3_bitrate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Transition length used when `--transitionDuration` is not given
    pub transition_seconds: u64,
    /// Loop without transition through a concat playlist. When false the
    /// plain concat filter graph is used instead.
    pub use_concat_demuxer: bool,
    /// Encoder options for loops built from a filter graph
    pub video_options: Vec<String>,
    /// Encoder options for loops built from a concat playlist
    pub concat_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Seek position in seconds when not snapshotting the midpoint
    pub default_timestamp: u64,
    /// `-qscale:v` value, only meaningful for jpg
    pub quality: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for a daily rolling log file. Console only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            hide_banner: true,
            overwrite: false,
            sniff_content: false,
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 44100,
            mp3_bitrate: "32k".to_string(),
        }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            transition_seconds: 2,
            use_concat_demuxer: true,
            video_options: [
                "-f", "mp4",
                "-vcodec", "libx264",
                "-preset", "fast",
                "-profile:v", "main",
                "-movflags", "+faststart",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            concat_options: vec!["-qscale:v".to_string(), "0".to_string()],
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            default_timestamp: 2,
            quality: 1,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MediaError::Config(format!("Failed to read config file: {}", e)))?;

        Ok(toml::from_str(&content)?)
    }
}
