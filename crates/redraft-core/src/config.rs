//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Paths to all redraft data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Object storage root (`data/storage/`): job records, results, documents.
    pub storage: PathBuf,
    /// LLM provider configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            storage: root.join("storage"),
            llm_config_file: root.join("llm-config.json"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.storage)?;
        Ok(())
    }
}

/// Bounds and tuning for the rewrite pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteLimits {
    /// Maximum bytes of source text handed to a single inference call.
    pub max_chunk_size: usize,
    /// Overlap carried between consecutive chunks.
    pub overlap_size: usize,
    /// Maximum total input size in characters; larger jobs fail fast.
    pub max_total_chars: usize,
    /// Output token cap per inference call.
    pub max_output_tokens: usize,
    /// Sampling temperature. Kept near zero: the contract is reorganize,
    /// never invent.
    pub temperature: f64,
}

impl Default for RewriteLimits {
    fn default() -> Self {
        Self {
            max_chunk_size: 12_000,
            overlap_size: 400,
            max_total_chars: 120_000,
            max_output_tokens: 8_192,
            temperature: 0.1,
        }
    }
}

/// Top-level redraft configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedraftConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Rewrite pipeline bounds.
    pub limits: RewriteLimits,
}

impl RedraftConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3010);

        let defaults = RewriteLimits::default();
        let limits = RewriteLimits {
            max_chunk_size: env_usize("REDRAFT_MAX_CHUNK_SIZE", defaults.max_chunk_size),
            overlap_size: env_usize("REDRAFT_OVERLAP_SIZE", defaults.overlap_size),
            max_total_chars: env_usize("REDRAFT_MAX_TOTAL_CHARS", defaults.max_total_chars),
            max_output_tokens: env_usize("REDRAFT_MAX_OUTPUT_TOKENS", defaults.max_output_tokens),
            temperature: defaults.temperature,
        };

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            limits,
        })
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = RewriteLimits::default();
        assert!(limits.overlap_size < limits.max_chunk_size);
        assert!(limits.max_chunk_size < limits.max_total_chars);
        assert!(limits.temperature < 0.5);
    }
}
