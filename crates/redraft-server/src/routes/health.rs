//! Service health and job-queue summary.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use redraft_store::JobStatus;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// GET /api/health — liveness, provider availability, job counts.
async fn get_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let resolved = state.llm_config.read().resolve_provider();
    let jobs = state.jobs.list().unwrap_or_default();

    let processing = jobs.iter().filter(|j| j.status == JobStatus::Processing).count();
    let completed = jobs.iter().filter(|j| j.status == JobStatus::Completed).count();
    let failed = jobs.iter().filter(|j| j.status == JobStatus::Failed).count();

    Json(serde_json::json!({
        "status": "ok",
        "llmAvailable": state.inference.is_some(),
        "llmProvider": resolved.as_ref().map(|(p, _, _)| p.to_string()),
        "model": state.inference.as_ref().map(|c| c.model().to_string()),
        "jobs": {
            "processing": processing,
            "completed": completed,
            "failed": failed,
            "total": jobs.len(),
        },
    }))
}
