//! Filter graphs for looping a single video input.
//!
//! A graph is a list of `;`-separated statements. Every statement only reads
//! labels produced by an earlier one, and the last statement writes the
//! label handed to `-map`.

use std::fmt;

use crate::error::{MediaError, Result};
use crate::looping::{MAX_LOOP_COUNT, MIN_LOOP_COUNT};

const INPUT_VIDEO: &str = "[0:v]";

pub const PLAIN_OUTPUT_LABEL: &str = "outv";
pub const CROSS_FADE_OUTPUT_LABEL: &str = "output";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGraph {
    statements: Vec<String>,
    output_label: String,
}

impl FilterGraph {
    fn new<S: Into<String>>(output_label: S) -> Self {
        Self {
            statements: Vec::new(),
            output_label: output_label.into(),
        }
    }

    fn push<S: Into<String>>(&mut self, statement: S) {
        self.statements.push(statement.into());
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn output_label(&self) -> &str {
        &self.output_label
    }

    /// Argument for `-map`, e.g. `[outv]`
    pub fn map_target(&self) -> String {
        format!("[{}]", self.output_label)
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.statements.join("; "))
    }
}

fn check_count(count: u32) -> Result<()> {
    if !(MIN_LOOP_COUNT..=MAX_LOOP_COUNT).contains(&count) {
        return Err(MediaError::InvalidCount(count));
    }
    Ok(())
}

/// Repeat the input video `count` times and concatenate, dropping audio
pub fn build_plain_concat(count: u32) -> Result<FilterGraph> {
    check_count(count)?;

    let mut graph = FilterGraph::new(PLAIN_OUTPUT_LABEL);
    graph.push(format!(
        "{}concat=n={}:v=1[{}]",
        INPUT_VIDEO.repeat(count as usize),
        count,
        PLAIN_OUTPUT_LABEL
    ));
    Ok(graph)
}

fn trim(start: u64, end: u64, label: &str) -> String {
    format!(
        "{}trim=start={}:end={},setpts=PTS-STARTPTS[{}]",
        INPUT_VIDEO, start, end, label
    )
}

fn alpha_fade(source: &str, direction: &str, transition: u64, label: &str) -> String {
    format!(
        "[{}]format=pix_fmts=yuva420p,fade=t={}:st=0:d={}:alpha=1[{}]",
        source, direction, transition, label
    )
}

fn split(source: &str, prefix: &str, copies: u32) -> String {
    let outputs: String = (1..=copies).map(|i| format!("[{}{}]", prefix, i)).collect();
    format!("[{}]split={}{}", source, copies, outputs)
}

/// Loop the input video `count` times with a cross-fade of `transition`
/// seconds between repetitions of a `clip` second long video.
///
/// The output is the head clip `[0, clip - transition)`, then `count - 1`
/// pairs of (cross-fade, middle clip `[transition, clip - transition)`), then
/// the tail clip `[clip - transition, clip)`: `2 * count` segments in total.
/// The middle clip must not be empty, so `clip` has to exceed `2 * transition`.
pub fn build_cross_fade_concat(count: u32, transition: u64, clip: u64) -> Result<FilterGraph> {
    check_count(count)?;
    if transition.saturating_mul(2) >= clip {
        return Err(MediaError::TransitionExceedsClip { clip, transition });
    }
    let segments = count
        .checked_mul(2)
        .ok_or(MediaError::InvalidCount(count))?;

    let body_end = clip - transition;
    let copies = count - 1;
    let mut graph = FilterGraph::new(CROSS_FADE_OUTPUT_LABEL);

    graph.push(trim(0, body_end, "clip1"));
    graph.push(trim(transition, body_end, "clip2"));
    graph.push(trim(body_end, clip, "clip3"));
    graph.push(trim(body_end, clip, "fadeoutsrc"));
    graph.push(trim(0, transition, "fadeinsrc"));

    graph.push(alpha_fade("fadeinsrc", "in", transition, "fadein"));
    graph.push(alpha_fade("fadeoutsrc", "out", transition, "fadeout"));

    graph.push("[fadein]fifo[fadeinfifo]");
    graph.push("[fadeout]fifo[fadeoutfifo]");
    graph.push("[fadeoutfifo][fadeinfifo]overlay[crossfade]");

    graph.push(split("crossfade", "cf", copies));
    graph.push(split("clip2", "cl", copies));

    let pairs: String = (1..=copies).map(|i| format!("[cf{}][cl{}]", i, i)).collect();
    graph.push(format!(
        "[clip1]{}[clip3]concat=n={}:v=1[{}]",
        pairs,
        segments,
        CROSS_FADE_OUTPUT_LABEL
    ));

    Ok(graph)
}
