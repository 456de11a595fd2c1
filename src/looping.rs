use tracing::debug;

use crate::error::{MediaError, Result};

/// Smallest loop that still repeats the clip
pub const MIN_LOOP_COUNT: u32 = 2;

/// Largest loop accepted, whether given directly or derived from a length
pub const MAX_LOOP_COUNT: u32 = 10_000;

/// How long a loop should be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopRequest {
    /// Concatenate the clip exactly this many times
    ByCount(u32),
    /// Concatenate the clip until the output lasts at least this many seconds
    ByTargetDuration(u64),
}

impl LoopRequest {
    /// Build a request from optional CLI values. A count always wins over a length.
    pub fn from_options(count: Option<u32>, length: Option<u64>) -> Result<Self> {
        let request = match (count, length) {
            (Some(count), _) => LoopRequest::ByCount(count),
            (None, Some(length)) => LoopRequest::ByTargetDuration(length),
            (None, None) => {
                return Err(MediaError::MissingParameter(
                    "either a loop count or a target length is required".to_string(),
                ));
            }
        };

        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            LoopRequest::ByCount(count) if !(MIN_LOOP_COUNT..=MAX_LOOP_COUNT).contains(&count) => {
                Err(MediaError::InvalidCount(count))
            }
            LoopRequest::ByTargetDuration(0) => Err(MediaError::InvalidDuration(0)),
            _ => Ok(()),
        }
    }

    /// Whether the clip duration is needed to resolve the loop count
    pub fn needs_clip_duration(&self) -> bool {
        matches!(self, LoopRequest::ByTargetDuration(_))
    }

    /// Output name suffix, e.g. `loop-3` or `length-120`
    pub fn name_suffix(&self) -> String {
        match self {
            LoopRequest::ByCount(count) => format!("loop-{}", count),
            LoopRequest::ByTargetDuration(seconds) => format!("length-{}", seconds),
        }
    }
}

/// Cross-fade settings for a loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionSpec {
    pub cross_fade: bool,
    pub transition_seconds: u64,
}

impl TransitionSpec {
    pub fn new(cross_fade: bool, transition_seconds: u64) -> Self {
        Self {
            cross_fade,
            transition_seconds: if cross_fade { transition_seconds } else { 0 },
        }
    }

    /// Transition length that actually applies downstream
    pub fn effective_seconds(&self) -> u64 {
        if self.cross_fade { self.transition_seconds } else { 0 }
    }

    /// A zero-length cross-fade degrades to a plain cut
    pub fn is_active(&self) -> bool {
        self.effective_seconds() > 0
    }
}

/// Number of clip repetitions needed to satisfy a request.
///
/// For a target duration the output is modelled as `count - 1` clips of
/// `clip - transition` seconds followed by one full clip, so
/// `count = ceil((target - transition) / (clip - transition))`. The result is
/// never below [`MIN_LOOP_COUNT`]. A target needing more than
/// [`MAX_LOOP_COUNT`] repetitions is an `InvalidDuration`.
pub fn required_loop_count(
    request: LoopRequest,
    clip_seconds: u64,
    transition_seconds: u64,
) -> Result<u32> {
    match request {
        LoopRequest::ByCount(count) => {
            request.validate()?;
            Ok(count)
        }
        LoopRequest::ByTargetDuration(target) => {
            request.validate()?;

            if clip_seconds <= transition_seconds {
                return Err(MediaError::DegenerateTransition {
                    clip: clip_seconds,
                    transition: transition_seconds,
                });
            }

            let numerator = target.saturating_sub(transition_seconds);
            let span = clip_seconds - transition_seconds;
            let count = numerator.div_ceil(span);
            let count = u32::try_from(count)
                .ok()
                .filter(|count| *count <= MAX_LOOP_COUNT)
                .ok_or(MediaError::InvalidDuration(target))?
                .max(MIN_LOOP_COUNT);

            debug!("Loop {} times", count);
            Ok(count)
        }
    }
}
