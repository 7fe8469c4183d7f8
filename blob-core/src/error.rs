//! Error types for engine initialization, rendering and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort [`crate::engine::Engine::init`].
///
/// These are reported once to the host, which is expected to carry on
/// without the effect.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid surface dimensions: {width}x{height}")]
    InvalidSurfaceSize { width: u32, height: u32 },
    #[error("drawing surface could not provide a render context")]
    ContextUnavailable,
    #[error("engine is already initialized")]
    AlreadyInitialized,
}

/// A failure while submitting a single frame.
///
/// The engine logs these and skips the frame; the next tick retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("render context lost")]
    ContextLost,
    #[error("render backend error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
