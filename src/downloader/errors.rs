// Error types for the download pipeline

use std::fmt;

#[derive(Debug, Clone)]
pub enum DownloadError {
    /// Extractor could not produce metadata (bad URL, removed or blocked video)
    ExtractionFailed(String),

    /// Requested format/audio combination is not available for this video
    UnavailableFormat(String),

    /// URL rejected before or during extraction
    InvalidUrl(String),

    /// The source site did not respond within the configured timeout
    NetworkTimeout,

    /// yt-dlp not found on the system
    ToolNotFound(String),

    /// Failed to parse yt-dlp JSON output
    ParseError(String),

    /// The external tool reported success but left no file in the job directory
    ArtifactMissing(String),

    /// Subprocess could not be spawned or waited on
    ExecutionError(String),

    /// Filesystem failure in the scratch directory
    Io(String),

    /// Unknown error with details
    Unknown(String),
}

impl DownloadError {
    /// Whether the failure is attributable to the caller's input or the
    /// source's availability (HTTP 4xx) rather than to this service (5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ExtractionFailed(_)
                | Self::UnavailableFormat(_)
                | Self::InvalidUrl(_)
                | Self::NetworkTimeout
        )
    }
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExtractionFailed(msg) => {
                write!(f, "could not extract video information: {}", msg)
            }
            Self::UnavailableFormat(msg) => {
                write!(f, "requested format is not available: {}", msg)
            }
            Self::InvalidUrl(msg) => write!(f, "invalid or unsupported URL: {}", msg),
            Self::NetworkTimeout => {
                write!(f, "network timeout: the source did not respond in time")
            }
            Self::ToolNotFound(tool) => write!(f, "external tool not found: {}", tool),
            Self::ParseError(msg) => write!(f, "failed to parse extractor output: {}", msg),
            Self::ArtifactMissing(msg) => write!(f, "downloaded file not found: {}", msg),
            Self::ExecutionError(msg) => write!(f, "execution error: {}", msg),
            Self::Io(msg) => write!(f, "filesystem error: {}", msg),
            Self::Unknown(msg) => write!(f, "unknown error: {}", msg),
        }
    }
}

impl std::error::Error for DownloadError {}

// Classify a failed yt-dlp run by its stderr. A nonzero exit from the tool
// almost always means the input URL or the chosen format is the problem, so
// the default class is ExtractionFailed (client side), matching how the
// tool's own DownloadError exception is treated.
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        if s.contains("Unsupported URL") || s.contains("is not a valid URL") {
            return Self::InvalidUrl(s);
        }

        if s.contains("Requested format is not available") {
            return Self::UnavailableFormat(s);
        }

        if s.contains("timed out") || s.contains("timeout") {
            return Self::NetworkTimeout;
        }

        Self::ExtractionFailed(s)
    }
}
