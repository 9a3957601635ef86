//! chessbridge runtime - host binding for native chess engine modules
//!
//! This library provides:
//! - Loading and symbol binding of an engine module (shared library or static table)
//! - Scratch buffers allocated through the module's own allocator
//! - String marshalling across the C boundary
//! - The engine lifecycle and its synchronous call surface
//! - Whole-position analysis reports

/// chessbridge runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod analysis;
pub mod arena;
pub mod error;
pub mod ffi;
pub mod lifecycle;
pub mod move_token;
pub mod shared;
pub mod surface;

pub use analysis::{AnalysisReport, INVALID_FEN};
pub use arena::ArenaStats;
pub use error::{EngineError, EngineResult, LoadError};
pub use ffi::loader::symbols;
pub use ffi::{ReturnStrategy, StaticModule};
pub use lifecycle::{ChessEngine, EngineState};
pub use move_token::{MoveToken, NO_MOVE};
pub use shared::SharedEngine;
pub use surface::DEFAULT_SEARCH_DEPTH;

pub use chessbridge_config::{ModuleAbi, ModuleLocator, StringReturn};
