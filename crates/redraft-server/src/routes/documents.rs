//! Source document routes — upload raw text for rewrite by reference.
//!
//! A stored document's key is passed back to `POST /api/rewrite` as
//! `storageRef`, so large reports can be uploaded once and rewritten
//! without resending the text.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use redraft_store::Storage;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/documents", get(list_documents).post(upload_document))
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub name: Option<String>,
    pub text: String,
}

/// POST /api/documents — store raw source text, return its storage key.
async fn upload_document(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UploadRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "text is required" })),
        );
    }

    let name = match req.name {
        Some(name) => sanitize_name(&name),
        None => uuid::Uuid::new_v4().to_string(),
    };
    let key = format!("documents/{name}.txt");

    match state.storage.put(&key, req.text.as_bytes(), "text/plain") {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "storageRef": key,
                "size": req.text.len(),
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

/// GET /api/documents — list stored source documents.
async fn list_documents(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.storage.list("documents/") {
        Ok(keys) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "documents": keys,
                "total": keys.len(),
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

/// Strip anything that could escape the documents prefix.
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name_strips_traversal() {
        assert_eq!(sanitize_name("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_name("report-2024_v1.txt"), "report-2024_v1.txt");
        assert!(!sanitize_name("").is_empty());
    }
}
