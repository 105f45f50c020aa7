// Download pipeline: extractor seam, format selection, orchestration,
// and scratch-directory retention.

pub mod errors;
pub mod extractor;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod retention;
pub mod utils;

pub use errors::DownloadError;
pub use extractor::{MediaExtractor, YtDlpExtractor};
pub use models::{DownloadedArtifact, QualityOption, RawVariant, VideoMetadata};
pub use orchestrator::DownloadOrchestrator;
