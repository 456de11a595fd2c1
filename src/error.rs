use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Path unavailable: {0}")]
    PathUnavailable(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Duration unavailable: {0}")]
    DurationUnavailable(String),

    #[error(
        "Invalid loop count {0}, must be between {min} and {max}",
        min = crate::looping::MIN_LOOP_COUNT,
        max = crate::looping::MAX_LOOP_COUNT
    )]
    InvalidCount(u32),

    #[error(
        "Invalid target duration {0}s, must be positive and reachable within {max} loops",
        max = crate::looping::MAX_LOOP_COUNT
    )]
    InvalidDuration(u64),

    #[error("Clip of {clip}s is not longer than the {transition}s transition")]
    DegenerateTransition { clip: u64, transition: u64 },

    #[error("Transition of {transition}s leaves no middle section in a clip of {clip}s")]
    TransitionExceedsClip { clip: u64, transition: u64 },

    #[error("Encoder failed: {0}")]
    EncoderFailed(String),
}

pub type Result<T> = std::result::Result<T, MediaError>;
