//! Persisted rewrite-job records.
//!
//! One JSON record per job id under `jobs/`, one result blob per
//! completed job under `results/`. Submit writes the initial record, the
//! worker writes the terminal record, status readers only read; a
//! terminal record is write-once.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::storage::Storage;
use redraft_core::{Error, Result};

/// Lifecycle state of a rewrite job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

/// One asynchronous rewrite request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteJob {
    #[serde(rename = "jobId")]
    pub job_id: String,
    pub status: JobStatus,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(rename = "resultKey", skip_serializing_if = "Option::is_none")]
    pub result_key: Option<String>,
    #[serde(rename = "resultLength", skip_serializing_if = "Option::is_none")]
    pub result_length: Option<usize>,
    #[serde(rename = "originalLength", skip_serializing_if = "Option::is_none")]
    pub original_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "validationPassed", skip_serializing_if = "Option::is_none")]
    pub validation_passed: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "errorType", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl RewriteJob {
    /// Fresh PROCESSING record, timestamps set to now.
    pub fn new(job_id: String, session_id: Option<String>) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            job_id,
            status: JobStatus::Processing,
            session_id,
            created_at: now.clone(),
            updated_at: now,
            result_key: None,
            result_length: None,
            original_length: None,
            model: None,
            validation_passed: None,
            violations: Vec::new(),
            error: None,
            error_type: None,
        }
    }
}

/// Completion metadata written alongside the COMPLETED transition.
#[derive(Debug, Clone)]
pub struct JobCompletion {
    pub result_key: String,
    pub result_length: usize,
    pub original_length: usize,
    pub model: String,
    pub validation_passed: bool,
    pub violations: Vec<String>,
}

/// Storage-backed job records.
#[derive(Clone)]
pub struct JobStore {
    storage: Arc<dyn Storage>,
}

impl JobStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    fn record_key(job_id: &str) -> String {
        format!("jobs/{job_id}.json")
    }

    /// Storage key of the result blob for a job.
    pub fn result_key(job_id: &str) -> String {
        format!("results/{job_id}.txt")
    }

    /// Persist the initial PROCESSING record. Called synchronously at
    /// submit time so a poll right after submission finds the job.
    pub fn create(&self, job: &RewriteJob) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(job)?;
        self.storage
            .put(&Self::record_key(&job.job_id), &bytes, "application/json")?;
        info!("Created rewrite job {}", job.job_id);
        Ok(())
    }

    pub fn load(&self, job_id: &str) -> Result<Option<RewriteJob>> {
        match self.storage.get(&Self::record_key(job_id)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// All job records, newest first.
    pub fn list(&self) -> Result<Vec<RewriteJob>> {
        let mut jobs = Vec::new();
        for key in self.storage.list("jobs/")? {
            let bytes = self.storage.get(&key)?;
            jobs.push(serde_json::from_slice::<RewriteJob>(&bytes)?);
        }
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    /// Transition a job to COMPLETED. The caller must have stored the
    /// result blob before this flip.
    pub fn complete(&self, job_id: &str, completion: JobCompletion) -> Result<()> {
        self.transition(job_id, |job| {
            job.status = JobStatus::Completed;
            job.result_key = Some(completion.result_key);
            job.result_length = Some(completion.result_length);
            job.original_length = Some(completion.original_length);
            job.model = Some(completion.model);
            job.validation_passed = Some(completion.validation_passed);
            job.violations = completion.violations;
        })?;
        info!("Completed rewrite job {}", job_id);
        Ok(())
    }

    /// Transition a job to FAILED with the error's message and class.
    pub fn fail(&self, job_id: &str, error: &Error) -> Result<()> {
        self.transition(job_id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(error.to_string());
            job.error_type = Some(error.error_type().to_string());
        })?;
        info!("Failed rewrite job {}: {}", job_id, error);
        Ok(())
    }

    fn transition(&self, job_id: &str, apply: impl FnOnce(&mut RewriteJob)) -> Result<()> {
        let mut job = self
            .load(job_id)?
            .ok_or_else(|| Error::NotFound(Self::record_key(job_id)))?;
        if job.status != JobStatus::Processing {
            return Err(Error::Internal(format!(
                "job {job_id} is already terminal"
            )));
        }
        apply(&mut job);
        job.updated_at = Utc::now().to_rfc3339();
        let bytes = serde_json::to_vec_pretty(&job)?;
        self.storage
            .put(&Self::record_key(job_id), &bytes, "application/json")
    }
}
