// HTTP surface: routes, request/response bodies, error envelope

pub mod error;
pub mod handlers;
pub mod models;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::server::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/video-info", post(handlers::video_info))
        .route("/api/download", post(handlers::download))
}
