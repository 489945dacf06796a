//! Shared application state.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;

use redraft_core::RedraftConfig;
use redraft_llm::client::InferenceClient;
use redraft_llm::config::LlmConfig;
use redraft_store::{JobStore, Storage};

/// Where the worker finds the original text for a job.
#[derive(Debug, Clone)]
pub enum JobInput {
    Inline(String),
    StorageRef(String),
}

/// A queued rewrite request handed to the background worker.
pub struct RewriteRequest {
    pub job_id: String,
    pub input: JobInput,
}

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: RedraftConfig,
    pub storage: Arc<dyn Storage>,
    pub jobs: JobStore,
    /// None when no provider is configured; jobs then fail at execution.
    pub inference: Option<Arc<dyn InferenceClient>>,
    pub llm_config: RwLock<LlmConfig>,
    pub rewrite_tx: mpsc::UnboundedSender<RewriteRequest>,
    rewrite_rx: Mutex<Option<mpsc::UnboundedReceiver<RewriteRequest>>>,
}

impl AppState {
    pub fn new(
        config: RedraftConfig,
        storage: Arc<dyn Storage>,
        inference: Option<Arc<dyn InferenceClient>>,
        llm_config: LlmConfig,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let jobs = JobStore::new(storage.clone());

        Self {
            config,
            storage,
            jobs,
            inference,
            llm_config: RwLock::new(llm_config),
            rewrite_tx: tx,
            rewrite_rx: Mutex::new(Some(rx)),
        }
    }

    /// Take the rewrite receiver (can only be called once, by the worker).
    pub fn take_rewrite_rx(&self) -> Option<mpsc::UnboundedReceiver<RewriteRequest>> {
        self.rewrite_rx.lock().take()
    }
}
