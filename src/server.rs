// Application state and router assembly

use axum::http::{header, HeaderValue};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::api;
use crate::config::Config;
use crate::downloader::{DownloadOrchestrator, YtDlpExtractor};

pub struct AppState {
    pub config: Config,
    pub orchestrator: DownloadOrchestrator,
    /// Bounds concurrent yt-dlp download processes
    pub download_semaphore: Semaphore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let extractor = Arc::new(YtDlpExtractor::new(
            config.ytdlp_path.clone(),
            config.probe_timeout_secs,
            config.download_timeout_secs,
        ));
        let orchestrator = DownloadOrchestrator::new(
            extractor,
            config.scratch_dir.clone(),
            Duration::from_secs(config.stale_job_secs),
        );
        let download_semaphore = Semaphore::new(config.max_concurrent_downloads);
        Self {
            config,
            orchestrator,
            download_semaphore,
        }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    api::router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// Credentialed CORS for the configured frontend origins. Wildcards are
// not allowed together with credentials, so methods and headers mirror
// the preflight request instead.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .expose_headers([header::CONTENT_DISPOSITION])
}

/// Resolves on Ctrl-C or SIGTERM, triggering graceful shutdown.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("could not install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("could not install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
