//! Error types for the voxcore engine

use thiserror::Error;

/// Main error type for the engine.
///
/// Volume, blend and mesh operations are total and never return this; it
/// only surfaces from configuration loading and validation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
