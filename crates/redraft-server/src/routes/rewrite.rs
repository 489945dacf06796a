//! Rewrite job routes — submit, poll, list.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use redraft_core::Error;
use redraft_store::{JobStatus, RewriteJob, Storage};

use crate::state::{AppState, JobInput, RewriteRequest};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rewrite", post(submit_rewrite))
        .route("/rewrite/jobs", get(list_jobs))
        .route("/rewrite/jobs/{job_id}", get(get_job))
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub text: Option<String>,
    #[serde(rename = "storageRef")]
    pub storage_ref: Option<String>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// POST /api/rewrite — create a job and return immediately.
///
/// The PROCESSING record is persisted before the response, so a poll
/// right after submission finds the job rather than NOT_FOUND.
async fn submit_rewrite(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitRequest>,
) -> impl IntoResponse {
    let input = match (req.text, req.storage_ref) {
        (Some(text), _) if !text.trim().is_empty() => JobInput::Inline(text),
        (_, Some(key)) if !key.trim().is_empty() => JobInput::StorageRef(key),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "either text or storageRef is required",
                })),
            );
        }
    };

    let job_id = uuid::Uuid::new_v4().to_string();
    let job = RewriteJob::new(job_id.clone(), req.session_id);
    if let Err(e) = state.jobs.create(&job) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        );
    }

    let _ = state.rewrite_tx.send(RewriteRequest {
        job_id: job_id.clone(),
        input,
    });

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "jobId": job_id,
            "status": "PROCESSING",
        })),
    )
}

/// GET /api/rewrite/jobs — list all jobs, newest first.
async fn list_jobs(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let jobs = match state.jobs.list() {
        Ok(jobs) => jobs,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            );
        }
    };

    let processing = jobs.iter().filter(|j| j.status == JobStatus::Processing).count();
    let completed = jobs.iter().filter(|j| j.status == JobStatus::Completed).count();
    let failed = jobs.iter().filter(|j| j.status == JobStatus::Failed).count();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "jobs": jobs,
            "total": jobs.len(),
            "processing": processing,
            "completed": completed,
            "failed": failed,
        })),
    )
}

/// GET /api/rewrite/jobs/:jobId — poll one job.
///
/// Five outcomes: NOT_FOUND, PROCESSING, COMPLETED with the result text,
/// FAILED with error details, and the internal-consistency case where the
/// record says COMPLETED but the result blob is gone.
async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let job = match state.jobs.load(&job_id) {
        Ok(Some(job)) => job,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({
                    "status": "NOT_FOUND",
                    "jobId": job_id,
                })),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            );
        }
    };

    match job.status {
        JobStatus::Processing => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "PROCESSING",
                "jobId": job.job_id,
                "createdAt": job.created_at,
            })),
        ),
        JobStatus::Failed => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "FAILED",
                "jobId": job.job_id,
                "error": job.error,
                "errorType": job.error_type,
                "createdAt": job.created_at,
                "updatedAt": job.updated_at,
            })),
        ),
        JobStatus::Completed => completed_response(&state, job),
    }
}

fn completed_response(state: &AppState, job: RewriteJob) -> (StatusCode, Json<serde_json::Value>) {
    let Some(result_key) = job.result_key.as_deref() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "job is marked COMPLETED but has no result reference",
                "jobId": job.job_id,
            })),
        );
    };

    match state.storage.get(result_key) {
        Ok(bytes) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "COMPLETED",
                "jobId": job.job_id,
                "rewrittenText": String::from_utf8_lossy(&bytes),
                "resultLength": job.result_length,
                "originalLength": job.original_length,
                "model": job.model,
                "validationPassed": job.validation_passed,
                "violations": job.violations,
                "createdAt": job.created_at,
                "updatedAt": job.updated_at,
            })),
        ),
        Err(Error::NotFound(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "job is marked COMPLETED but its result is missing",
                "jobId": job.job_id,
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}
