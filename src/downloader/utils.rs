// Subprocess and filename helpers shared by the extractor and the HTTP layer

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};

use super::errors::DownloadError;

/// Name substituted when ASCII transliteration of a title leaves nothing.
pub const FALLBACK_FILENAME: &str = "video.mp4";

/// Run a command to completion with a hard timeout, capturing both pipes.
/// The child is killed if the timeout elapses.
pub async fn run_output_with_timeout(
    program: &str,
    args: &[String],
    timeout_secs: u64,
) -> Result<Output, DownloadError> {
    let mut child = TokioCommand::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DownloadError::ToolNotFound(program.to_string())
            } else {
                DownloadError::ExecutionError(format!("failed to start {}: {}", program, e))
            }
        })?;

    let mut stdout_pipe = child.stdout.take().ok_or_else(|| {
        DownloadError::ExecutionError(format!("failed to capture stdout from {}", program))
    })?;
    let mut stderr_pipe = child.stderr.take().ok_or_else(|| {
        DownloadError::ExecutionError(format!("failed to capture stderr from {}", program))
    })?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    let waited = timeout(Duration::from_secs(timeout_secs), child.wait()).await;
    match waited {
        Ok(status_res) => {
            let status = status_res.map_err(|e| {
                DownloadError::ExecutionError(format!("failed to wait for {}: {}", program, e))
            })?;
            let stdout = stdout_task
                .await
                .map_err(|e| DownloadError::ExecutionError(format!("stdout task failed: {}", e)))?
                .map_err(|e| DownloadError::ExecutionError(format!("failed to read stdout: {}", e)))?;
            let stderr = stderr_task
                .await
                .map_err(|e| DownloadError::ExecutionError(format!("stderr task failed: {}", e)))?
                .map_err(|e| DownloadError::ExecutionError(format!("failed to read stderr: {}", e)))?;
            Ok(Output {
                status,
                stdout,
                stderr,
            })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(DownloadError::NetworkTimeout)
        }
    }
}

/// Last line of stderr that carries a diagnostic, preferring explicit
/// `ERROR:` lines over trailing noise.
pub fn last_error_line(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let error_line = text
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("ERROR:"))
        .next_back();

    error_line
        .or_else(|| {
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .next_back()
        })
        .unwrap_or("tool exited with an error and no diagnostics")
        .to_string()
}

lazy_static! {
    // Printable ASCII minus the quote and backslash, which would break the
    // quoted filename parameter.
    static ref HEADER_UNSAFE_RE: Regex = Regex::new(r#"[^\x20-\x21\x23-\x5B\x5D-\x7E]"#).unwrap();
}

/// ASCII-only filename for the plain `filename=` Content-Disposition
/// parameter. Falls back to a fixed name when nothing survives.
pub fn ascii_fallback_filename(name: &str) -> String {
    let stripped = HEADER_UNSAFE_RE.replace_all(name, "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Two-parameter Content-Disposition value: ASCII fallback plus the
/// RFC 5987 percent-encoded UTF-8 original.
pub fn content_disposition(file_name: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_fallback_filename(file_name),
        urlencoding::encode(file_name)
    )
}

pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}
