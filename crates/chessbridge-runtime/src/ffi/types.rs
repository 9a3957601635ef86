//! Engine contract types
//!
//! Defines:
//! - C function pointer types for every contract symbol
//! - `ReturnStrategy`: how a string-returning symbol hands back its text
//! - `StringBinding`: a bound string symbol, typed by strategy
//! - The per-symbol status conventions
//!
//! Status conventions (fixed per symbol, never a global constant):
//!
//! | Symbol                                     | Success when            |
//! |--------------------------------------------|-------------------------|
//! | init, set_position, make_move, undo_move   | status == 0             |
//! | get_best_move, get_fen (buffer)            | status == 0             |
//! | get_legal_moves (buffer)                   | count >= 0              |
//! | get_best_move, get_legal_moves, get_fen (direct) | pointer non-null  |
//! | is_checkmate, is_stalemate, is_in_check    | non-zero means true     |
//! | evaluate_position                          | raw value, no status    |

use std::os::raw::{c_char, c_int};

/// `init`, `undo_move`: 0 on success
pub type StatusFn = unsafe extern "C" fn() -> c_int;
/// `is_checkmate`, `is_stalemate`, `is_in_check`: non-zero means true
pub type FlagFn = unsafe extern "C" fn() -> c_int;
/// `evaluate_position`: centipawn score, no status
pub type ScoreFn = unsafe extern "C" fn() -> c_int;
/// `cleanup`
pub type VoidFn = unsafe extern "C" fn();
/// `set_position`, `make_move`
pub type TextArgFn = unsafe extern "C" fn(*const c_char) -> c_int;
/// `get_best_move(buf, cap, depth)`
pub type BestMoveBufferFn = unsafe extern "C" fn(*mut c_char, c_int, c_int) -> c_int;
/// `get_best_move(depth)`
pub type BestMoveDirectFn = unsafe extern "C" fn(c_int) -> *const c_char;
/// `get_legal_moves(buf, cap)`, `get_fen(buf, cap)`
pub type TextBufferFn = unsafe extern "C" fn(*mut c_char, c_int) -> c_int;
/// `get_legal_moves()`, `get_fen()`
pub type TextDirectFn = unsafe extern "C" fn() -> *const c_char;
/// Module allocator
pub type MallocFn = unsafe extern "C" fn(usize) -> *mut u8;
/// Module deallocator
pub type FreeFn = unsafe extern "C" fn(*mut u8);

/// Status value meaning success for status-returning symbols
pub const STATUS_OK: c_int = 0;

/// Scratch capacity for a single move token
pub const MOVE_TOKEN_CAPACITY: usize = 32;
/// Scratch capacity for a whitespace-separated legal move listing
pub const LEGAL_MOVES_CAPACITY: usize = 4096;
/// Scratch capacity for a FEN string
pub const FEN_CAPACITY: usize = 128;

/// True when a status-returning symbol reported success
pub fn status_ok(status: c_int) -> bool {
    status == STATUS_OK
}

/// True when a legal-move buffer call reported a usable count
pub fn count_ok(count: c_int) -> bool {
    count >= 0
}

/// True for a boolean-coded native return
pub fn flag_set(value: c_int) -> bool {
    value != 0
}

/// How a string-returning symbol delivers its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnStrategy {
    /// Host allocates `capacity` bytes, native writes a NUL-terminated string
    BufferReturn { capacity: usize },
    /// Native returns a pointer to a string it owns
    DirectReturn,
}

/// A string-returning symbol bound with exactly one strategy
///
/// Chosen once in [`bind_symbols`](crate::ffi::bind_symbols). The call
/// surface matches on the variant to get the right function pointer type;
/// there is no per-call strategy decision.
#[derive(Clone, Copy)]
pub enum StringBinding<B, D> {
    Buffer { func: B, capacity: usize },
    /// `limit` bounds how far a direct result is scanned for its terminator
    Direct { func: D, limit: usize },
}

impl<B, D> StringBinding<B, D> {
    pub fn strategy(&self) -> ReturnStrategy {
        match self {
            StringBinding::Buffer { capacity, .. } => ReturnStrategy::BufferReturn {
                capacity: *capacity,
            },
            StringBinding::Direct { .. } => ReturnStrategy::DirectReturn,
        }
    }
}

impl<B, D> std::fmt::Debug for StringBinding<B, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StringBinding({:?})", self.strategy())
    }
}
