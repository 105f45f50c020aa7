use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use youtube_downloader_api::config::Config;
use youtube_downloader_api::downloader::{retention, MediaExtractor, YtDlpExtractor};
use youtube_downloader_api::server::{app, shutdown_signal, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "youtube_downloader_api=debug,tower_http=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tokio::fs::create_dir_all(&config.scratch_dir).await?;

    let extractor = YtDlpExtractor::new(
        config.ytdlp_path.clone(),
        config.probe_timeout_secs,
        config.download_timeout_secs,
    );
    if !extractor.is_available() {
        warn!("yt-dlp was not found; media requests will fail until it is installed");
    }

    let scratch_dir = config.scratch_dir.clone();
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("listening on {}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Scratch space is transient; leave nothing behind on a clean exit.
    info!("shutting down, clearing scratch directory");
    retention::sweep_all(&scratch_dir).await;

    Ok(())
}
