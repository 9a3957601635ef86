//! Module manifest (engine.toml)
//!
//! Describes how an engine library exports its entry points. Every field is
//! optional; a missing manifest is equivalent to an empty one.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name looked up inside a locator directory
pub const MANIFEST_FILE: &str = "engine.toml";

/// Default library stem (`libchess_engine.so`, `chess_engine.dll`, ...)
pub const DEFAULT_LIBRARY: &str = "chess_engine";

/// Root of engine.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ModuleManifest {
    #[serde(default)]
    pub module: ModuleAbi,
}

/// How string results come back from the native side
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StringReturn {
    /// Host passes a scratch region and its capacity; native fills it
    #[default]
    Buffer,
    /// Native returns a pointer to a NUL-terminated string it owns
    Direct,
}

/// The `[module]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ModuleAbi {
    /// Library stem, resolved with platform naming
    pub library: String,

    /// Prefix prepended to every exported symbol (e.g. "_")
    pub symbol_prefix: String,

    /// Marshalling strategy for all string-returning symbols
    pub string_return: StringReturn,

    /// Allocator entry point (without prefix)
    pub malloc: String,

    /// Deallocator entry point (without prefix)
    pub free: String,
}

impl Default for ModuleAbi {
    fn default() -> Self {
        Self {
            library: DEFAULT_LIBRARY.to_string(),
            symbol_prefix: String::new(),
            string_return: StringReturn::Buffer,
            malloc: "malloc".to_string(),
            free: "free".to_string(),
        }
    }
}

impl ModuleAbi {
    /// Full exported name for a contract symbol
    pub fn symbol_name(&self, symbol: &str) -> String {
        format!("{}{}", self.symbol_prefix, symbol)
    }
}

impl ModuleManifest {
    /// Parse a manifest from TOML text
    pub fn from_toml_str(content: &str, file: &Path) -> ConfigResult<Self> {
        let manifest: ModuleManifest =
            toml::from_str(content).map_err(|error| ConfigError::TomlParseError {
                file: file.to_path_buf(),
                error,
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load and validate a manifest file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, path)
    }

    fn validate(&self) -> ConfigResult<()> {
        let abi = &self.module;
        let checks = [
            ("module.library", &abi.library),
            ("module.malloc", &abi.malloc),
            ("module.free", &abi.free),
        ];
        for (field, value) in checks {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        if abi.library.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                field: "module.library".to_string(),
                reason: "must be a library name, not a path".to_string(),
            });
        }
        Ok(())
    }
}
