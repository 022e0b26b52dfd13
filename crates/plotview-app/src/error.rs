//! Application-level errors.

use crate::engine::EngineFailure;
use plotview_core::SceneError;
use plotview_render::{CanvasError, SyncError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineFailure),
    #[error("Scene sync failed: {0}")]
    Sync(#[from] SyncError),
    #[error("Scene update failed: {0}")]
    Scene(#[from] SceneError),
    #[error("Canvas error: {0}")]
    Canvas(#[from] CanvasError),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Figure has no plot; call update() first")]
    NoPlot,
    #[error("{0}")]
    Usage(String),
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
