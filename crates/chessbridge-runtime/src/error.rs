//! Error types for the engine binding

use chessbridge_config::ConfigError;
use std::os::raw::c_int;
use thiserror::Error;

/// Failures while locating, opening or binding a native module
#[derive(Error, Debug)]
pub enum LoadError {
    /// Module file or directory could not be found or read
    #[error("Engine module not found: {0}")]
    NotFound(String),

    /// The file exists but is not a loadable library
    #[error("Malformed engine module {path}: {reason}")]
    Malformed { path: String, reason: String },

    /// A required entry point is not exported
    #[error("Symbol '{symbol}' not found in {module}")]
    SymbolMissing { module: String, symbol: String },

    /// engine.toml is unreadable or invalid
    #[error("Invalid engine manifest: {0}")]
    Manifest(ConfigError),
}

impl From<ConfigError> for LoadError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound(_) | ConfigError::LibraryNotFound { .. } => {
                LoadError::NotFound(err.to_string())
            }
            other => LoadError::Manifest(other),
        }
    }
}

/// Errors surfaced by [`ChessEngine`](crate::ChessEngine)
///
/// Native rejections (bad FEN, illegal move) are not errors; the call
/// surface reports them as `false`, `None` or an empty value.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Engine module is not loaded")]
    NotLoaded,

    #[error("Native engine init failed with status {status}")]
    NativeInitFailed { status: c_int },

    #[error("Engine is not initialized")]
    EngineNotReady,

    #[error("Failed to allocate {capacity} bytes of native scratch memory")]
    AllocationFailed { capacity: usize },

    #[error("No decoder available for '{symbol}': module exports no allocator for buffer returns")]
    DecodingUnavailable { symbol: String },
}

impl EngineError {
    /// True for errors that indicate a broken binding rather than a runtime condition
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::Load(_) | EngineError::DecodingUnavailable { .. }
        )
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
