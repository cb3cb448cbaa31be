use axum::{
    http::{header, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

use crate::AppError;

#[derive(Embed)]
#[folder = "frontend/"]
#[exclude = "*.map"]
pub struct FrontendAssets;

/// Serve a dashboard asset; `/` maps to `index.html`.
pub async fn static_handler(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    match FrontendAssets::get(path) {
        Some(file) => (
            [(header::CONTENT_TYPE, file.metadata.mimetype().to_string())],
            file.data,
        )
            .into_response(),
        None => AppError::not_found("Not found.").into_response(),
    }
}
