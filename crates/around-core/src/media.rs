//! Media classification by filename suffix.
//!
//! Classification never inspects content bytes: the suffix is taken from the
//! client-supplied filename exactly as received, including the leading dot,
//! and compared case-sensitively.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use utoipa::ToSchema;

/// Coarse media kind of a post attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    #[default]
    Unknown,
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Unknown => write!(f, "unknown"),
        }
    }
}

const IMAGE_SUFFIXES: &[&str] = &[".jpeg", ".jpg", ".gif", ".png"];
const VIDEO_SUFFIXES: &[&str] = &[".mov", ".mp4", ".avi", ".flv", ".wmv"];

/// Map a filename suffix (e.g. `".png"`) to its media kind.
///
/// Total function: anything outside the known set is [`MediaKind::Unknown`].
pub fn classify_suffix(suffix: &str) -> MediaKind {
    if IMAGE_SUFFIXES.contains(&suffix) {
        MediaKind::Image
    } else if VIDEO_SUFFIXES.contains(&suffix) {
        MediaKind::Video
    } else {
        MediaKind::Unknown
    }
}

/// Extract the suffix of a filename, including the leading dot.
///
/// Returns an empty string when the filename has no extension. The case of the
/// extension is preserved.
pub fn file_suffix(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_suffixes() {
        for suffix in [".jpeg", ".jpg", ".gif", ".png"] {
            assert_eq!(classify_suffix(suffix), MediaKind::Image, "{}", suffix);
        }
        for suffix in [".mov", ".mp4", ".avi", ".flv", ".wmv"] {
            assert_eq!(classify_suffix(suffix), MediaKind::Video, "{}", suffix);
        }
    }

    #[test]
    fn test_unmapped_suffixes_are_unknown() {
        for suffix in ["", ".", ".webp", ".txt", "png", ".PNG", ".Jpeg", ".mp4 "] {
            assert_eq!(classify_suffix(suffix), MediaKind::Unknown, "{:?}", suffix);
        }
    }

    #[test]
    fn test_file_suffix() {
        assert_eq!(file_suffix("holiday.jpeg"), ".jpeg");
        assert_eq!(file_suffix("archive.tar.gz"), ".gz");
        assert_eq!(file_suffix("IMG_0001.JPG"), ".JPG");
        assert_eq!(file_suffix("noext"), "");
        assert_eq!(file_suffix(".hidden"), "");
    }

    #[test]
    fn test_media_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MediaKind::Video).unwrap(),
            "\"video\""
        );
        let kind: MediaKind = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(kind, MediaKind::Unknown);
    }
}
