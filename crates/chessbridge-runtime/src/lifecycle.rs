//! Engine lifecycle
//!
//! `Unloaded --load--> Loaded --init--> Initialized --cleanup--> Loaded`
//!
//! [`ChessEngine`] owns the only handle to the native module and is the only
//! place where [`EngineState`] changes. Every call surface operation checks
//! for `Initialized` before it touches native code or native memory.

use crate::arena::{ArenaStats, ScratchArena};
use crate::error::{EngineError, EngineResult, LoadError};
use crate::ffi::loader::{bind_symbols, EngineBindings};
use crate::ffi::module::{DylibModule, NativeModule};
use crate::ffi::types::{status_ok, ReturnStrategy};
use chessbridge_config::{ModuleAbi, ModuleLocator};
use tracing::{debug, info, warn};

/// Where the engine is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No module loaded
    Unloaded,
    /// Module loaded and bound, native `init` not yet run
    Loaded,
    /// Ready for position, move and query calls
    Initialized,
}

/// A loaded module together with its bound entry points and scratch arena
pub(crate) struct BoundModule {
    pub(crate) bindings: EngineBindings,
    pub(crate) arena: ScratchArena,
    description: String,
    // Declared last so the library outlives the pointers bound from it
    _module: Box<dyn NativeModule + Send>,
}

/// Binding to one native chess engine module
///
/// ```no_run
/// use chessbridge_config::ModuleLocator;
/// use chessbridge_runtime::ChessEngine;
///
/// let mut engine = ChessEngine::new();
/// engine.load_module(&ModuleLocator::new("./engine")).unwrap();
/// engine.init().unwrap();
/// engine.set_position("8/8/8/8/8/8/8/K6k w - - 0 1").unwrap();
/// let moves = engine.get_legal_moves().unwrap();
/// ```
pub struct ChessEngine {
    state: EngineState,
    module: Option<BoundModule>,
}

impl ChessEngine {
    pub fn new() -> Self {
        Self {
            state: EngineState::Unloaded,
            module: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Initialized
    }

    /// Description of the loaded module (its path, for shared libraries)
    pub fn module_description(&self) -> Option<&str> {
        self.module.as_ref().map(|m| m.description.as_str())
    }

    /// Scratch allocation counters of the loaded module
    pub fn arena_stats(&self) -> ArenaStats {
        self.module
            .as_ref()
            .map(|m| m.arena.stats())
            .unwrap_or_default()
    }

    /// Strategies bound for (best move, legal moves, fen)
    pub fn return_strategies(&self) -> Option<[ReturnStrategy; 3]> {
        self.module.as_ref().map(|m| m.bindings.string_strategies())
    }

    /// Load and bind the module at `locator`
    ///
    /// Does nothing if a module is already loaded. On failure the engine stays
    /// `Unloaded`.
    pub fn load_module(&mut self, locator: &ModuleLocator) -> EngineResult<()> {
        if self.module.is_some() {
            debug!("engine module already loaded");
            return Ok(());
        }

        let resolved = locator.resolve().map_err(LoadError::from)?;
        let module = DylibModule::open(&resolved.library_path)?;
        self.load_with(Box::new(module), &resolved.abi)
    }

    /// Bind an already opened module (shared library or static table)
    pub fn load_with(
        &mut self,
        module: Box<dyn NativeModule + Send>,
        abi: &ModuleAbi,
    ) -> EngineResult<()> {
        if self.module.is_some() {
            debug!("engine module already loaded");
            return Ok(());
        }

        let bindings = bind_symbols(module.as_ref(), abi)?;
        let arena = ScratchArena::new(bindings.allocator);
        let description = module.describe();

        self.module = Some(BoundModule {
            bindings,
            arena,
            description,
            _module: module,
        });
        self.state = EngineState::Loaded;
        info!(module = %self.module_description().unwrap_or_default(), "engine module loaded");
        Ok(())
    }

    /// Run the native `init` entry point
    ///
    /// Fails with `NotLoaded` before a module is loaded and with
    /// `NativeInitFailed` if the engine reports a non-zero status; the state
    /// is unchanged in both cases. Calling it again once initialized is a no-op.
    pub fn init(&mut self) -> EngineResult<()> {
        let bound = match (&self.module, self.state) {
            (None, _) | (_, EngineState::Unloaded) => return Err(EngineError::NotLoaded),
            (Some(_), EngineState::Initialized) => {
                debug!("engine already initialized");
                return Ok(());
            }
            (Some(bound), EngineState::Loaded) => bound,
        };

        let status = unsafe { (bound.bindings.init)() };
        debug!(symbol = "init", status, "native call");
        if !status_ok(status) {
            warn!(status, "native engine init failed");
            return Err(EngineError::NativeInitFailed { status });
        }

        self.state = EngineState::Initialized;
        info!("engine initialized");
        Ok(())
    }

    /// Run native teardown and return to `Loaded`
    ///
    /// A no-op unless initialized, so it is safe to call repeatedly and from
    /// shutdown paths. Native teardown reports nothing back; the state moves
    /// to `Loaded` regardless.
    pub fn cleanup(&mut self) {
        if self.state != EngineState::Initialized {
            return;
        }

        match &self.module {
            Some(bound) => {
                unsafe { (bound.bindings.cleanup)() };
                debug!(symbol = "cleanup", "native call");
            }
            None => warn!("initialized engine without a module; skipping native cleanup"),
        }

        self.state = EngineState::Loaded;
        info!("engine cleaned up");
    }

    /// The bound module, provided the engine is initialized
    pub(crate) fn ready(&self) -> EngineResult<&BoundModule> {
        match (&self.module, self.state) {
            (Some(bound), EngineState::Initialized) => Ok(bound),
            _ => Err(EngineError::EngineNotReady),
        }
    }
}

impl Default for ChessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ChessEngine {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl std::fmt::Debug for ChessEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChessEngine")
            .field("state", &self.state)
            .field("module", &self.module_description())
            .finish()
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
