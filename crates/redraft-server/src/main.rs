//! redraft — asynchronous investigation-report rewrite service.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod routes;
mod state;
mod worker;

use state::AppState;

use redraft_llm::client::{HttpInference, InferenceClient};
use redraft_llm::config::LlmConfig;
use redraft_store::{FsStorage, Storage};

fn resolve_data_dir() -> PathBuf {
    std::env::var("REDRAFT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = redraft_core::RedraftConfig::from_env(&data_dir)?;
    let port = config.port;

    let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(&config.data_paths.storage)?);

    let llm_config = LlmConfig::load(&config.data_paths.llm_config_file);
    let inference: Option<Arc<dyn InferenceClient>> = match HttpInference::from_config(&llm_config)
    {
        Ok(client) => {
            info!("Inference provider ready: model {}", client.model());
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!("No inference provider configured ({}); jobs will fail at execution", e);
            None
        }
    };

    let state = Arc::new(AppState::new(config, storage, inference, llm_config));

    // Start the background rewrite worker
    worker::start_rewrite_worker(state.clone());

    // Build router
    let app = routes::build_router(state.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("redraft server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
