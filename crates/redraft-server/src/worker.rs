//! Background rewrite worker — executes jobs queued by Submit.
//!
//! Submit never observes this phase; failure becomes visible only through
//! the terminal FAILED record. The result blob is stored strictly before
//! the COMPLETED flip so a status reader can never see a COMPLETED job
//! without a durably stored result.

use std::sync::Arc;

use tracing::{error, info};

use redraft_core::{Error, Result};
use redraft_llm::engine::RewriteEngine;
use redraft_store::{JobCompletion, JobStore, Storage};
use redraft_text::entities::HeuristicAnalyzer;
use redraft_text::validate::validate_and_sanitize;

use crate::state::{AppState, JobInput, RewriteRequest};

/// Start the background rewrite worker task.
pub fn start_rewrite_worker(state: Arc<AppState>) {
    let mut rx = match state.take_rewrite_rx() {
        Some(rx) => rx,
        None => {
            error!("Rewrite worker already started");
            return;
        }
    };

    tokio::spawn(async move {
        info!("Background rewrite worker started");
        while let Some(request) = rx.recv().await {
            process_rewrite_job(&state, request).await;
        }
    });
}

/// Run one job to its terminal state. Every error path ends in a FAILED
/// record; nothing propagates out of the worker loop.
pub(crate) async fn process_rewrite_job(state: &AppState, request: RewriteRequest) {
    let job_id = request.job_id.clone();
    info!("Processing rewrite job {}", job_id);

    match execute(state, request).await {
        Ok(()) => info!("Rewrite job {} completed", job_id),
        Err(e) => {
            error!("Rewrite job {} failed: {}", job_id, e);
            if let Err(store_err) = state.jobs.fail(&job_id, &e) {
                error!("Could not record failure for job {}: {}", job_id, store_err);
            }
        }
    }
}

async fn execute(state: &AppState, request: RewriteRequest) -> Result<()> {
    let original = resolve_input(state, &request.input)?;

    let original_length = original.chars().count();
    let limit = state.config.limits.max_total_chars;
    if original_length > limit {
        return Err(Error::InputTooLarge {
            actual: original_length,
            limit,
        });
    }

    let client = state
        .inference
        .clone()
        .ok_or_else(|| Error::Config("no inference provider configured".into()))?;
    let engine = RewriteEngine::new(client, state.config.limits.clone());
    let model = engine.model().to_string();

    let rewritten = engine.rewrite(&original).await?;
    let report = validate_and_sanitize(&HeuristicAnalyzer, &original, &rewritten);

    let result_key = JobStore::result_key(&request.job_id);
    state
        .storage
        .put(&result_key, report.sanitized_text.as_bytes(), "text/plain")?;

    state.jobs.complete(
        &request.job_id,
        JobCompletion {
            result_key,
            result_length: report.sanitized_text.chars().count(),
            original_length,
            model,
            validation_passed: report.is_valid,
            violations: report.violations,
        },
    )
}

fn resolve_input(state: &AppState, input: &JobInput) -> Result<String> {
    match input {
        JobInput::Inline(text) => Ok(text.clone()),
        JobInput::StorageRef(key) => {
            let bytes = state.storage.get(key)?;
            String::from_utf8(bytes)
                .map_err(|e| Error::Storage(format!("source {key} is not valid UTF-8: {e}")))
        }
    }
}
