//! Redraft Core — configuration and shared error types.

pub mod config;
pub mod error;

pub use config::{DataPaths, RedraftConfig, RewriteLimits};
pub use error::{Error, Result};
