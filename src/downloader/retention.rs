// Scratch-directory retention policy
//
// Every sweep here is best-effort: failures are logged and swallowed, a
// cleanup problem must never fail the surrounding request.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// How long a served job directory is kept so the response body can finish
/// streaming before its file disappears.
pub const SERVE_GRACE: Duration = Duration::from_secs(10 * 60);

/// Remove everything directly under the scratch root. Invoked once during
/// service shutdown.
pub async fn sweep_all(root: &Path) {
    sweep(root, None).await;
}

/// Remove entries older than `max_age`. Invoked before each download so a
/// crash can only leave debris until the next request, while concurrent
/// in-flight job directories stay untouched.
pub async fn sweep_stale(root: &Path, max_age: Duration) {
    sweep(root, Some(max_age)).await;
}

async fn sweep(root: &Path, max_age: Option<Duration>) {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                warn!(root = %root.display(), "could not open scratch directory for cleanup: {}", e);
            }
            return;
        }
    };

    let now = SystemTime::now();

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(root = %root.display(), "could not iterate scratch directory: {}", e);
                break;
            }
        };

        let path = entry.path();
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = %path.display(), "could not stat scratch entry: {}", e);
                continue;
            }
        };

        if let Some(max_age) = max_age {
            let age = metadata
                .modified()
                .ok()
                .and_then(|m| now.duration_since(m).ok())
                .unwrap_or(Duration::ZERO);
            if age < max_age {
                continue;
            }
        }

        let result = if metadata.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };

        match result {
            Ok(()) => debug!(path = %path.display(), "removed scratch entry"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), "could not remove scratch entry: {}", e),
        }
    }
}

/// Remove one request's job directory now.
pub async fn remove_job_dir(dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(dir).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(dir = %dir.display(), "could not remove job directory: {}", e);
        }
    }
}

/// Remove a served job directory after a grace period, off the request path.
pub fn remove_job_dir_later(dir: PathBuf, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        remove_job_dir(&dir).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn touch(path: &Path) {
        tokio::fs::write(path, b"x").await.unwrap();
    }

    #[tokio::test]
    async fn sweep_all_empties_the_root() {
        let root = tempfile::tempdir().unwrap();
        touch(&root.path().join("stale.mp4")).await;
        let job = root.path().join("ab12cd34");
        tokio::fs::create_dir(&job).await.unwrap();
        touch(&job.join("ab12cd34_clip.mp4")).await;

        sweep_all(root.path()).await;

        let mut entries = tokio::fs::read_dir(root.path()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stale_sweep_spares_fresh_jobs() {
        let root = tempfile::tempdir().unwrap();
        let fresh = root.path().join("fresh");
        tokio::fs::create_dir(&fresh).await.unwrap();

        sweep_stale(root.path(), Duration::from_secs(3600)).await;

        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn zero_age_sweep_removes_everything() {
        let root = tempfile::tempdir().unwrap();
        let job = root.path().join("old");
        tokio::fs::create_dir(&job).await.unwrap();

        sweep_stale(root.path(), Duration::ZERO).await;

        assert!(!job.exists());
    }

    #[tokio::test]
    async fn missing_root_is_not_an_error() {
        sweep_all(Path::new("/nonexistent/scratch/dir")).await;
    }

    #[tokio::test]
    async fn remove_job_dir_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let job = root.path().join("job");
        tokio::fs::create_dir(&job).await.unwrap();

        remove_job_dir(&job).await;
        remove_job_dir(&job).await;
        assert!(!job.exists());
    }
}
