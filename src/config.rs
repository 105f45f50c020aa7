use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Socket address the server binds to
    pub bind_addr: String,
    /// Origins permitted by the CORS layer
    pub allowed_origins: Vec<String>,
    /// Root of the transient download area
    pub scratch_dir: PathBuf,
    /// Explicit yt-dlp binary path; discovered on well-known paths when unset
    pub ytdlp_path: Option<String>,
    /// Timeout for metadata probes
    pub probe_timeout_secs: u64,
    /// Timeout for the fetch+mux call
    pub download_timeout_secs: u64,
    /// Concurrent yt-dlp download processes
    pub max_concurrent_downloads: usize,
    /// Age after which an abandoned job directory is swept
    pub stale_job_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            scratch_dir: PathBuf::from("downloads"),
            ytdlp_path: None,
            probe_timeout_secs: 30,
            download_timeout_secs: 300,
            max_concurrent_downloads: 2,
            stale_job_secs: 2 * 60 * 60,
        }
    }
}

impl Config {
    /// Build the configuration from environment variables, falling back to
    /// development defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = read_env("APP_ADDR")
            .or_else(|| read_env("PORT").map(|port| format!("0.0.0.0:{}", port)))
            .unwrap_or(defaults.bind_addr);

        let allowed_origins = read_env("ALLOWED_ORIGINS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.allowed_origins);

        Self {
            bind_addr,
            allowed_origins,
            scratch_dir: read_env("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
            ytdlp_path: read_env("YTDLP_PATH"),
            probe_timeout_secs: read_parsed_env("PROBE_TIMEOUT_SECS")
                .unwrap_or(defaults.probe_timeout_secs),
            download_timeout_secs: read_parsed_env("DOWNLOAD_TIMEOUT_SECS")
                .unwrap_or(defaults.download_timeout_secs),
            max_concurrent_downloads: read_parsed_env("MAX_CONCURRENT_DOWNLOADS")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.max_concurrent_downloads),
            stale_job_secs: read_parsed_env("STALE_JOB_SECS").unwrap_or(defaults.stale_job_secs),
        }
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn read_parsed_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    read_env(name).and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_development_setup() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.scratch_dir, PathBuf::from("downloads"));
        assert!(config.ytdlp_path.is_none());
        assert!(config.max_concurrent_downloads > 0);
    }
}
