// MediaExtractor seam over the external yt-dlp binary
//
// Two modes, mirroring the tool itself:
// - probe: `--dump-json` metadata only, no media bytes fetched
// - fetch: download the chosen format, mux with best audio, write one
//   container file into the caller-supplied output template

use async_trait::async_trait;
use std::process::Command as StdCommand;
use tracing::{debug, info, warn};

use super::errors::DownloadError;
use super::models::VideoMetadata;
use super::utils::{last_error_line, run_output_with_timeout};

/// One fetch+mux invocation. `output_template` is an absolute yt-dlp
/// output template ending in `%(title)s.%(ext)s`.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub format_id: String,
    pub output_template: String,
}

/// Trait seam over the extraction/download collaborator.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Check if the underlying tool is installed
    fn is_available(&self) -> bool;

    /// Probe mode: full format metadata without fetching media bytes
    async fn probe(&self, url: &str) -> Result<VideoMetadata, DownloadError>;

    /// Fetch+mux mode: produce one finished container file
    async fn fetch(&self, request: &FetchRequest) -> Result<(), DownloadError>;
}

/// Production extractor shelling out to the yt-dlp binary.
pub struct YtDlpExtractor {
    ytdlp_path: String,
    probe_timeout_secs: u64,
    fetch_timeout_secs: u64,
}

impl YtDlpExtractor {
    pub fn new(
        path_override: Option<String>,
        probe_timeout_secs: u64,
        fetch_timeout_secs: u64,
    ) -> Self {
        let ytdlp_path = path_override.unwrap_or_else(Self::find_ytdlp);
        Self {
            ytdlp_path,
            probe_timeout_secs,
            fetch_timeout_secs,
        }
    }

    /// Find the yt-dlp binary in common install locations.
    fn find_ytdlp() -> String {
        let common_paths = [
            "/usr/local/bin/yt-dlp",
            "/usr/bin/yt-dlp",
            "/opt/homebrew/bin/yt-dlp",
        ];

        for path in common_paths {
            if std::path::Path::new(path).exists() {
                return path.to_string();
            }
        }

        // Try to find via `which`
        if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
            if output.status.success() {
                if let Ok(path) = String::from_utf8(output.stdout) {
                    let trimmed = path.trim();
                    if !trimmed.is_empty() {
                        return trimmed.to_string();
                    }
                }
            }
        }

        // Last resort: hope it's in PATH
        "yt-dlp".to_string()
    }

    fn probe_args(&self, url: &str) -> Vec<String> {
        vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            "15".to_string(),
            "--retries".to_string(),
            "2".to_string(),
            url.to_string(),
        ]
    }

    fn fetch_args(&self, request: &FetchRequest) -> Vec<String> {
        vec![
            "-f".to_string(),
            // chosen format plus best matching audio, with fallbacks
            format!("{}+bestaudio[ext=m4a]/bestaudio/best", request.format_id),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            "30".to_string(),
            "--retries".to_string(),
            "2".to_string(),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
            "-o".to_string(),
            request.output_template.clone(),
            request.url.to_string(),
        ]
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    fn is_available(&self) -> bool {
        match StdCommand::new(&self.ytdlp_path).arg("--version").output() {
            Ok(out) => out.status.success(),
            Err(_) => false,
        }
    }

    async fn probe(&self, url: &str) -> Result<VideoMetadata, DownloadError> {
        let args = self.probe_args(url);
        debug!(url, "probing with {}", self.ytdlp_path);

        let output =
            run_output_with_timeout(&self.ytdlp_path, &args, self.probe_timeout_secs).await?;

        if !output.status.success() {
            let stderr = last_error_line(&output.stderr);
            warn!(url, %stderr, "probe failed");
            return Err(DownloadError::from(stderr));
        }

        if output.stdout.is_empty() {
            return Err(DownloadError::ExtractionFailed(
                "extractor returned no metadata".to_string(),
            ));
        }

        let metadata: VideoMetadata = serde_json::from_slice(&output.stdout)
            .map_err(|e| DownloadError::ParseError(format!("invalid probe JSON: {}", e)))?;

        debug!(
            url,
            variants = metadata.formats.len(),
            "probe succeeded"
        );
        Ok(metadata)
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<(), DownloadError> {
        let args = self.fetch_args(request);
        info!(
            url = %request.url,
            format_id = %request.format_id,
            "fetching with {}",
            self.ytdlp_path
        );

        let output =
            run_output_with_timeout(&self.ytdlp_path, &args, self.fetch_timeout_secs).await?;

        if !output.status.success() {
            let stderr = last_error_line(&output.stderr);
            warn!(url = %request.url, %stderr, "fetch failed");
            return Err(DownloadError::from(stderr));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> YtDlpExtractor {
        YtDlpExtractor::new(Some("yt-dlp".to_string()), 30, 300)
    }

    #[test]
    fn fetch_args_build_merge_selector() {
        let args = extractor().fetch_args(&FetchRequest {
            url: "https://example.com/v".to_string(),
            format_id: "137".to_string(),
            output_template: "/tmp/x/ab12cd34_%(title)s.%(ext)s".to_string(),
        });

        let selector_pos = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[selector_pos + 1], "137+bestaudio[ext=m4a]/bestaudio/best");
        assert!(args.contains(&"--merge-output-format".to_string()));
        assert!(args.contains(&"mp4".to_string()));
        assert_eq!(args.last().unwrap(), "https://example.com/v");
    }

    #[test]
    fn probe_args_request_metadata_only() {
        let args = extractor().probe_args("https://example.com/v");
        assert!(args.contains(&"--dump-json".to_string()));
        assert!(!args.iter().any(|a| a == "-f"));
    }
}
