//! chessbridge configuration
//!
//! Resolves where a native chess engine module lives and how its symbols are
//! exported:
//! - Module locator (a caller-supplied file or directory)
//! - Module manifest (`engine.toml` next to the library)
//!
//! No environment variables are consulted. The locator is the only input.
//!
//! # Example
//!
//! ```no_run
//! use chessbridge_config::ModuleLocator;
//!
//! let resolved = ModuleLocator::new("./engine").resolve().unwrap();
//! println!("{}", resolved.library_path.display());
//! ```

pub mod locator;
pub mod manifest;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Module location not found: {0}")]
    NotFound(PathBuf),

    #[error("No engine library named '{name}' in {dir}")]
    LibraryNotFound { name: String, dir: PathBuf },

    #[error("Failed to read manifest: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use locator::{ModuleLocator, ResolvedModule};
pub use manifest::{ModuleAbi, ModuleManifest, StringReturn, MANIFEST_FILE};
