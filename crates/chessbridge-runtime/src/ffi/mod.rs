//! Native boundary
//!
//! - `types`: C signatures of the engine contract and per-symbol return strategies
//! - `module`: where symbols come from (shared library or static table)
//! - `loader`: binding every contract symbol once, at load time
//! - `marshal`: host text ↔ C strings
//!
//! # Safety
//!
//! All `unsafe` around foreign calls lives under this module and in the
//! call surface. Symbols are trusted to match the declared contract.

pub mod loader;
pub mod marshal;
pub mod module;
pub mod types;

pub use loader::{bind_symbols, EngineBindings};
pub use marshal::MarshalError;
pub use module::{DylibModule, NativeModule, StaticModule};
pub use types::{ReturnStrategy, StringBinding};
