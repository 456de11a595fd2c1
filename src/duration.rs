use std::path::Path;
use tracing::debug;

use crate::classify::MediaFile;
use crate::error::{MediaError, Result};
use crate::media::{CommandAssembler, EncoderRunner};

const DURATION_MARKER: &str = "Duration:";

/// Extract the duration, in whole seconds, from encoder diagnostics.
///
/// The encoder reports `Duration: HH:MM:SS.ff, ...`. Each field is rounded up
/// on its own before the fields are combined, so the result is never shorter
/// than the media.
pub fn parse_duration(diagnostics: &str) -> Result<u64> {
    let start = diagnostics
        .find(DURATION_MARKER)
        .ok_or_else(|| MediaError::DurationUnavailable("no duration in encoder output".to_string()))?
        + DURATION_MARKER.len();

    let value = diagnostics[start..]
        .trim_start()
        .split(|c: char| c == ',' || c.is_whitespace())
        .next()
        .unwrap_or_default();

    let fields: Vec<&str> = value.split(':').collect();
    if fields.len() != 3 {
        return Err(MediaError::DurationUnavailable(format!(
            "unexpected duration '{}'",
            value
        )));
    }

    let mut parts = [0u64; 3];
    for (part, field) in parts.iter_mut().zip(&fields) {
        let parsed: f64 = field.parse().map_err(|_| {
            MediaError::DurationUnavailable(format!("unexpected duration '{}'", value))
        })?;
        if !parsed.is_finite() || parsed < 0.0 {
            return Err(MediaError::DurationUnavailable(format!(
                "unexpected duration '{}'",
                value
            )));
        }
        *part = parsed.ceil() as u64;
    }

    let [hours, minutes, seconds] = parts;
    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Reads media durations through the encoder's inspect mode
pub struct DurationProbe<'a> {
    runner: &'a dyn EncoderRunner,
    assembler: &'a CommandAssembler,
}

impl<'a> DurationProbe<'a> {
    pub fn new(runner: &'a dyn EncoderRunner, assembler: &'a CommandAssembler) -> Self {
        Self { runner, assembler }
    }

    /// Probe a path directly, without caching
    pub async fn duration_seconds(&self, path: &Path) -> Result<u64> {
        let invocation = self.assembler.assemble_probe(path);
        let diagnostics = self
            .runner
            .capture(&invocation)
            .await
            .map_err(|e| MediaError::DurationUnavailable(format!("{}: {}", path.display(), e)))?;

        let seconds = parse_duration(&diagnostics)
            .map_err(|e| MediaError::DurationUnavailable(format!("{}: {}", path.display(), e)))?;
        debug!("Duration of {} is {}s", path.display(), seconds);
        Ok(seconds)
    }

    /// Duration of a file, probed on first use and cached on the file afterwards
    pub async fn duration_of(&self, file: &mut MediaFile) -> Result<u64> {
        if let Some(seconds) = file.duration_seconds {
            return Ok(seconds);
        }

        let seconds = self.duration_seconds(&file.path).await?;
        file.duration_seconds = Some(seconds);
        Ok(seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::MediaKind;
    use crate::config::Config;
    use crate::media::MockEncoderRunner;

    const FFMPEG_STDERR: &str = "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'beach.mp4':\n  \
        Metadata:\n    major_brand     : isom\n  \
        Duration: 00:01:02.50, start: 0.000000, bitrate: 1205 kb/s\n  \
        Stream #0:0(und): Video: h264\n\
        At least one output file must be specified\n";

    #[test]
    fn test_parse_duration_rounds_each_field_up() {
        assert_eq!(parse_duration(FFMPEG_STDERR).unwrap(), 63);
        assert_eq!(parse_duration("Duration: 01:00:00.00, start").unwrap(), 3600);
        assert_eq!(parse_duration("Duration: 00:00:29.01,").unwrap(), 30);
        assert_eq!(parse_duration("  Duration: 00:00:07.00\n").unwrap(), 7);
    }

    #[test]
    fn test_parse_duration_failures() {
        assert!(matches!(
            parse_duration("Stream #0:0: Audio: mp3"),
            Err(MediaError::DurationUnavailable(_))
        ));
        assert!(matches!(
            parse_duration("Duration: N/A, bitrate: N/A"),
            Err(MediaError::DurationUnavailable(_))
        ));
        assert!(matches!(
            parse_duration("Duration: 00:xx:10.00,"),
            Err(MediaError::DurationUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_duration_is_cached_on_file() {
        let config = Config::default();
        let assembler = CommandAssembler::new(&config);

        let mut runner = MockEncoderRunner::new();
        runner
            .expect_capture()
            .withf(|invocation| invocation.args.iter().any(|a| a == "/v/beach.mp4"))
            .times(1)
            .returning(|_| Ok(FFMPEG_STDERR.to_string()));

        let probe = DurationProbe::new(&runner, &assembler);
        let mut file = MediaFile::new("/v/beach.mp4", MediaKind::Video);

        assert_eq!(probe.duration_of(&mut file).await.unwrap(), 63);
        assert_eq!(probe.duration_of(&mut file).await.unwrap(), 63);
        assert_eq!(file.duration_seconds, Some(63));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_duration_unavailable() {
        let config = Config::default();
        let assembler = CommandAssembler::new(&config);

        let mut runner = MockEncoderRunner::new();
        runner
            .expect_capture()
            .returning(|_| Err(MediaError::EncoderFailed("not found".to_string())));

        let probe = DurationProbe::new(&runner, &assembler);
        let err = probe.duration_seconds(Path::new("/v/beach.mp4")).await.unwrap_err();
        assert!(matches!(err, MediaError::DurationUnavailable(_)));
    }
}
