// Common data models for the download pipeline

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sentinel yt-dlp uses for "this stream carries no such track".
pub const NO_CODEC: &str = "none";

/// Maximum codec tag length shown to clients.
pub const CODEC_DISPLAY_LEN: usize = 20;

/// One encoding variant of the source media, as reported by the extractor.
/// Deserialized straight from one entry of the `formats` array in
/// `yt-dlp --dump-json` output; everything beyond `format_id` is optional
/// in practice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawVariant {
    pub format_id: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    // yt-dlp emits these as floats for some sources
    #[serde(default)]
    pub filesize: Option<f64>,
    #[serde(default)]
    pub filesize_approx: Option<f64>,
}

impl RawVariant {
    pub fn has_video(&self) -> bool {
        matches!(self.vcodec.as_deref(), Some(v) if v != NO_CODEC && !v.is_empty())
    }

    pub fn has_audio(&self) -> bool {
        matches!(self.acodec.as_deref(), Some(a) if a != NO_CODEC && !a.is_empty())
    }

    /// Exact size when known, approximate otherwise.
    pub fn effective_size(&self) -> Option<u64> {
        self.filesize
            .or(self.filesize_approx)
            .filter(|b| *b > 0.0)
            .map(|b| b as u64)
    }
}

/// Full probe result for one URL. Produced once per info request, never
/// persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub formats: Vec<RawVariant>,
}

/// One user-selectable quality, deduplicated per vertical resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityOption {
    pub format_id: String,
    /// Display label, e.g. "1080p"
    pub resolution: String,
    pub ext: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesize: Option<u64>,
    /// bytes / 1048576, rounded to 2 decimals; absent when size is unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesize_mb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f32>,
    /// Codec tag truncated for display
    pub vcodec: String,
    /// Set when the variant has no audio track and the orchestrator will
    /// have to fetch and mux a separate audio stream.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub needs_merge: bool,
}

/// The single finished file produced for one download request.
#[derive(Debug, Clone)]
pub struct DownloadedArtifact {
    pub path: PathBuf,
    pub file_name: String,
    pub len: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_track_sentinels() {
        let v = RawVariant {
            format_id: "137".to_string(),
            height: Some(1080),
            fps: None,
            vcodec: Some("avc1.640028".to_string()),
            acodec: Some(NO_CODEC.to_string()),
            ext: Some("mp4".to_string()),
            filesize: None,
            filesize_approx: Some(1_048_576.0),
        };
        assert!(v.has_video());
        assert!(!v.has_audio());
        assert_eq!(v.effective_size(), Some(1_048_576));
    }

    #[test]
    fn metadata_tolerates_sparse_json() {
        let meta: VideoMetadata = serde_json::from_str(
            r#"{"title": "clip", "formats": [{"format_id": "22"}]}"#,
        )
        .unwrap();
        assert_eq!(meta.title.as_deref(), Some("clip"));
        assert!(meta.uploader.is_none());
        assert_eq!(meta.formats.len(), 1);
        assert!(!meta.formats[0].has_video());
    }
}
