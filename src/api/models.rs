// Request and response bodies for the JSON endpoints

use serde::{Deserialize, Serialize};

use crate::downloader::QualityOption;

#[derive(Debug, Deserialize)]
pub struct VideoUrlRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    pub format_id: String,
}

#[derive(Debug, Serialize)]
pub struct VideoInfoResponse {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub uploader: String,
    pub formats: Vec<QualityOption>,
}
