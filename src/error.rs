//! Library error type

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PresenterError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid value for {name}: {value} (must be finite and > 0)")]
    InvalidThreshold { name: &'static str, value: f32 },

    #[error("confidence floor must lie in 0.0..=1.0, got {0}")]
    InvalidConfidenceFloor(f32),

    #[error("unknown dispatch backend {0:?} (expected log, xdotool or qemu)")]
    UnknownBackend(String),

    #[error("qemu dispatch selected but no monitor socket configured")]
    MissingMonitorSocket,

    #[error("{backend} dispatch failed: {message}")]
    Dispatch {
        backend: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, PresenterError>;
