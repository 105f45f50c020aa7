// Download orchestration over the MediaExtractor seam
//
// Each request gets its own job directory under the scratch root, named by
// a random short identifier that is also the output filename prefix. The
// external tool picks the final extension, so the finished artifact is
// located afterwards by that prefix inside the request's own directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::errors::DownloadError;
use super::extractor::{FetchRequest, MediaExtractor};
use super::models::{DownloadedArtifact, VideoMetadata};
use super::retention;

pub struct DownloadOrchestrator {
    extractor: Arc<dyn MediaExtractor>,
    scratch_root: PathBuf,
    stale_job_age: Duration,
}

impl DownloadOrchestrator {
    pub fn new(
        extractor: Arc<dyn MediaExtractor>,
        scratch_root: PathBuf,
        stale_job_age: Duration,
    ) -> Self {
        Self {
            extractor,
            scratch_root,
            stale_job_age,
        }
    }

    pub fn scratch_root(&self) -> &PathBuf {
        &self.scratch_root
    }

    /// Probe mode: metadata only, nothing written to disk.
    pub async fn probe(&self, url: &str) -> Result<VideoMetadata, DownloadError> {
        self.extractor.probe(url).await
    }

    /// Fetch the chosen format, mux it with the best audio track, and
    /// return the finished artifact. The job directory is cleaned up here
    /// on failure; on success the caller owns its lifetime (the file still
    /// has to be streamed out).
    pub async fn download(
        &self,
        url: &str,
        format_id: &str,
    ) -> Result<DownloadedArtifact, DownloadError> {
        retention::sweep_stale(&self.scratch_root, self.stale_job_age).await;

        let request_id = short_request_id();
        let job_dir = self.scratch_root.join(&request_id);
        tokio::fs::create_dir_all(&job_dir)
            .await
            .map_err(|e| DownloadError::Io(format!("could not create job directory: {}", e)))?;

        debug!(%request_id, job_dir = %job_dir.display(), "starting download job");

        let request = FetchRequest {
            url: url.to_string(),
            format_id: format_id.to_string(),
            output_template: format!("{}/{}_%(title)s.%(ext)s", job_dir.display(), request_id),
        };

        if let Err(e) = self.extractor.fetch(&request).await {
            retention::remove_job_dir(&job_dir).await;
            return Err(e);
        }

        match locate_artifact(&job_dir, &request_id).await {
            Ok(artifact) => {
                info!(
                    %request_id,
                    file = %artifact.file_name,
                    len = artifact.len,
                    "download finished"
                );
                Ok(artifact)
            }
            Err(e) => {
                retention::remove_job_dir(&job_dir).await;
                Err(e)
            }
        }
    }
}

/// Collision-resistant short identifier, safe for filenames and headers.
fn short_request_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Find the single file the external tool wrote. The extension is chosen
/// by the tool at write time, so match on the request-id prefix.
async fn locate_artifact(
    job_dir: &PathBuf,
    request_id: &str,
) -> Result<DownloadedArtifact, DownloadError> {
    let prefix = format!("{}_", request_id);

    let mut entries = tokio::fs::read_dir(job_dir)
        .await
        .map_err(|e| DownloadError::Io(format!("could not open job directory: {}", e)))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DownloadError::Io(format!("could not read job directory: {}", e)))?
    {
        let file_name = entry.file_name().to_string_lossy().to_string();
        if !file_name.starts_with(&prefix) {
            continue;
        }

        let path = entry.path();
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| DownloadError::Io(format!("could not stat artifact: {}", e)))?;
        if !metadata.is_file() {
            continue;
        }

        return Ok(DownloadedArtifact {
            path,
            file_name,
            len: metadata.len(),
        });
    }

    Err(DownloadError::ArtifactMissing(format!(
        "no file with prefix {} in the job directory after download",
        prefix
    )))
}
