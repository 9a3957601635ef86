//! Module locator
//!
//! Turns the caller-supplied base path into a concrete library file plus the
//! ABI description that goes with it.

use crate::manifest::{ModuleAbi, ModuleManifest, MANIFEST_FILE};
use crate::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// Caller-supplied module location: a library file or a directory holding one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLocator {
    base: PathBuf,
}

/// A locator after resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModule {
    /// Library file to open
    pub library_path: PathBuf,
    /// ABI the library exports
    pub abi: ModuleAbi,
    /// Manifest that was read, if any
    pub manifest_path: Option<PathBuf>,
}

impl ModuleLocator {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve to a library path and ABI
    ///
    /// A file is taken as the library itself with the default ABI. A directory
    /// is searched for `engine.toml` and then for the library it names.
    pub fn resolve(&self) -> ConfigResult<ResolvedModule> {
        if self.base.is_file() {
            return Ok(ResolvedModule {
                library_path: self.base.clone(),
                abi: ModuleAbi::default(),
                manifest_path: None,
            });
        }

        if !self.base.is_dir() {
            return Err(ConfigError::NotFound(self.base.clone()));
        }

        let manifest_path = self.base.join(MANIFEST_FILE);
        let (manifest, manifest_path) = if manifest_path.is_file() {
            (
                ModuleManifest::load_from_file(&manifest_path)?,
                Some(manifest_path),
            )
        } else {
            (ModuleManifest::default(), None)
        };

        let library_path = find_library(&self.base, &manifest.module.library).ok_or_else(|| {
            ConfigError::LibraryNotFound {
                name: manifest.module.library.clone(),
                dir: self.base.clone(),
            }
        })?;

        Ok(ResolvedModule {
            library_path,
            abi: manifest.module,
            manifest_path,
        })
    }
}

/// Candidate file names for a library stem, in priority order
///
/// - Linux: lib{name}.so
/// - macOS: lib{name}.dylib or lib{name}.so
/// - Windows: {name}.dll
pub fn library_file_names(name: &str) -> Vec<String> {
    let extensions: &[&str] = if cfg!(target_os = "windows") {
        &["dll"]
    } else if cfg!(target_os = "macos") {
        &["dylib", "so"]
    } else {
        &["so"]
    };

    let prefixes: &[&str] = if cfg!(target_os = "windows") {
        &["", "lib"]
    } else {
        &["lib", ""]
    };

    let mut names = Vec::with_capacity(extensions.len() * prefixes.len());
    for prefix in prefixes {
        for ext in extensions {
            names.push(format!("{}{}.{}", prefix, name, ext));
        }
    }
    names
}

fn find_library(dir: &Path, name: &str) -> Option<PathBuf> {
    library_file_names(name)
        .into_iter()
        .map(|file| dir.join(file))
        .find(|path| path.is_file())
}
