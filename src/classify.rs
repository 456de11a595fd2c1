//! Audio/video classification of input paths.
//!
//! Classification is driven by the MIME type derived from the lowercase file
//! extension. When enabled, files whose extension yields no MIME type are
//! sniffed from their first 512 bytes instead.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{MediaError, Result};
use crate::naming::extension_of;

pub const MIME_MP3: &str = "audio/mpeg";
pub const MIME_WAV: &str = "audio/x-wav";
pub const MIME_VIDEO_PREFIX: &str = "video/";

const SNIFF_LEN: usize = 512;

/// Extensions whose MIME type must not depend on the guess database
const MIME_OVERRIDES: &[(&str, &str)] = &[
    ("mp3", MIME_MP3),
    ("wav", MIME_WAV),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
    Other,
}

/// Which kind of file an operation is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaContext {
    Audio,
    Video,
}

/// An input file together with its classification and lazily probed duration
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub duration_seconds: Option<u64>,
}

impl MediaFile {
    pub fn new<P: Into<PathBuf>>(path: P, kind: MediaKind) -> Self {
        Self {
            path: path.into(),
            kind,
            duration_seconds: None,
        }
    }

    pub fn is_eligible_for(&self, context: MediaContext) -> bool {
        matches!(
            (context, self.kind),
            (MediaContext::Audio, MediaKind::Audio) | (MediaContext::Video, MediaKind::Video)
        )
    }
}

/// Classifies paths for one operation context
#[derive(Debug, Clone, Copy)]
pub struct MediaClassifier {
    context: MediaContext,
    sniff_content: bool,
}

impl MediaClassifier {
    pub fn new(context: MediaContext, sniff_content: bool) -> Self {
        Self { context, sniff_content }
    }

    pub fn classify<P: AsRef<Path>>(&self, path: P) -> Result<MediaKind> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)
            .map_err(|e| MediaError::PathUnavailable(format!("{}: {}", path.display(), e)))?;

        if metadata.is_dir() {
            debug!("{} \t directory", path.display());
            return Ok(MediaKind::Other);
        }

        let mime = detect_media_type(path, self.sniff_content).unwrap_or_default();
        let kind = kind_for_mime(self.context, &mime);

        if kind == MediaKind::Other {
            debug!("{} \t {}", path.display(), mime);
        }

        Ok(kind)
    }

    /// Classify and wrap the result into a `MediaFile`
    pub fn inspect<P: AsRef<Path>>(&self, path: P) -> Result<MediaFile> {
        let kind = self.classify(&path)?;
        Ok(MediaFile::new(path.as_ref(), kind))
    }
}

/// Map a MIME type to a kind under the given context
pub fn kind_for_mime(context: MediaContext, mime: &str) -> MediaKind {
    match context {
        MediaContext::Audio if mime == MIME_MP3 || mime == MIME_WAV => MediaKind::Audio,
        MediaContext::Video if mime.starts_with(MIME_VIDEO_PREFIX) => MediaKind::Video,
        _ => MediaKind::Other,
    }
}

/// MIME type for a lowercase extension (without the dot)
pub fn mime_for_extension(extension: &str) -> Option<String> {
    if let Some((_, mime)) = MIME_OVERRIDES.iter().find(|(ext, _)| *ext == extension) {
        return Some(mime.to_string());
    }

    mime_guess::from_ext(extension)
        .first_raw()
        .map(|mime| mime.to_string())
}

/// MIME type of a file from its extension, optionally falling back to content sniffing
pub fn detect_media_type(path: &Path, sniff_content: bool) -> Option<String> {
    let by_extension = extension_of(path).and_then(|ext| mime_for_extension(&ext));
    if by_extension.is_some() || !sniff_content {
        return by_extension;
    }

    let mut header = Vec::with_capacity(SNIFF_LEN);
    let file = File::open(path).ok()?;
    file.take(SNIFF_LEN as u64).read_to_end(&mut header).ok()?;

    sniff_mime(&header).map(|mime| mime.to_string())
}

/// Recognise the handful of container signatures relevant to audio/video work
pub fn sniff_mime(header: &[u8]) -> Option<&'static str> {
    if header.starts_with(b"ID3") {
        return Some(MIME_MP3);
    }
    if header.len() >= 2 && header[0] == 0xFF && (header[1] & 0xE0) == 0xE0 {
        return Some(MIME_MP3);
    }
    if header.len() >= 12 && &header[0..4] == b"RIFF" {
        match &header[8..12] {
            b"WAVE" => return Some(MIME_WAV),
            b"AVI " => return Some("video/avi"),
            _ => {}
        }
    }
    if header.len() >= 8 && &header[4..8] == b"ftyp" {
        return Some("video/mp4");
    }
    if header.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some("video/webm");
    }
    if header.starts_with(b"OggS") {
        return Some("application/ogg");
    }
    None
}
