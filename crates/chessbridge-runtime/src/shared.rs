//! Thread-safe handle for multi-threaded hosts
//!
//! The native engine has process-global state and no reentrancy guarantee,
//! so all access goes through one mutex: one call in flight at a time.

use crate::analysis::AnalysisReport;
use crate::lifecycle::ChessEngine;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable, lock-guarded [`ChessEngine`]
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<ChessEngine>>,
}

impl SharedEngine {
    pub fn new(engine: ChessEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run `f` with exclusive access to the engine
    pub fn with<R>(&self, f: impl FnOnce(&mut ChessEngine) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Analyze a position under the lock
    pub fn analyze_position(&self, fen: &str, depth: u32) -> AnalysisReport {
        self.with(|engine| engine.analyze_position(fen, depth))
    }

    fn lock(&self) -> MutexGuard<'_, ChessEngine> {
        // A panic in another caller does not invalidate the native state
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl From<ChessEngine> for SharedEngine {
    fn from(engine: ChessEngine) -> Self {
        Self::new(engine)
    }
}
