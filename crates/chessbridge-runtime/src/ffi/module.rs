//! Native module sources
//!
//! A module is anything that can hand out symbol addresses by name:
//! - `DylibModule`: a shared library opened with `libloading`
//! - `StaticModule`: a table of `extern "C"` functions linked into the host

use crate::error::LoadError;
use libloading::Library;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Source of engine entry points
pub trait NativeModule {
    /// Address of an exported symbol, or `None` if it is not exported
    fn resolve(&self, symbol: &str) -> Option<*const ()>;

    /// Human-readable module name for diagnostics
    fn describe(&self) -> String;
}

/// Engine shipped as a shared library
///
/// # Safety
///
/// Opening a library runs its initialisers in this process. The caller must
/// trust the module.
pub struct DylibModule {
    library: Library,
    path: PathBuf,
}

impl DylibModule {
    /// Open a library file
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.display().to_string()));
        }

        let library = unsafe {
            Library::new(path).map_err(|e| LoadError::Malformed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        };

        Ok(Self {
            library,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NativeModule for DylibModule {
    fn resolve(&self, symbol: &str) -> Option<*const ()> {
        // The symbol's address is read as a plain pointer; the loader casts it
        // to the contract signature.
        unsafe {
            self.library
                .get::<*const ()>(symbol.as_bytes())
                .ok()
                .map(|sym| *sym)
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Engine entry points registered by address
///
/// Used for engines statically linked into the host binary.
///
/// ```
/// # use chessbridge_runtime::ffi::{NativeModule, StaticModule};
/// extern "C" fn init() -> i32 {
///     0
/// }
///
/// let module = StaticModule::new("linked-engine").with_symbol("init", init as *const ());
/// assert!(module.resolve("init").is_some());
/// assert!(module.resolve("cleanup").is_none());
/// ```
pub struct StaticModule {
    name: String,
    symbols: HashMap<String, *const ()>,
}

// Safety: the table only stores code addresses, which are valid from any thread
unsafe impl Send for StaticModule {}

impl StaticModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: HashMap::new(),
        }
    }

    /// Register an entry point under its exported name
    pub fn with_symbol(mut self, name: impl Into<String>, address: *const ()) -> Self {
        self.symbols.insert(name.into(), address);
        self
    }

    /// Drop an entry point, e.g. to simulate an incomplete export table
    pub fn without_symbol(mut self, name: &str) -> Self {
        self.symbols.remove(name);
        self
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }
}

impl NativeModule for StaticModule {
    fn resolve(&self, symbol: &str) -> Option<*const ()> {
        self.symbols.get(symbol).copied()
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}
