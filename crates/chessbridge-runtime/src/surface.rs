//! Synchronous call surface
//!
//! Every operation requires [`EngineState::Initialized`](crate::EngineState)
//! and fails with [`EngineError::EngineNotReady`] otherwise, before any native
//! call or allocation. Native rejections are not errors: they come back as
//! `false`, `None` or an empty value. `Err` is reserved for the readiness
//! precondition and for scratch allocation failure.

use crate::arena::ScratchArena;
use crate::error::EngineResult;
use crate::ffi::marshal::{decode_bounded, to_c_string, MarshalError};
use crate::ffi::types::{
    count_ok, flag_set, status_ok, StringBinding, TextArgFn, TextBufferFn, TextDirectFn,
};
use crate::lifecycle::ChessEngine;
use crate::move_token::{parse_best_move, parse_move_list, MoveToken};
use std::os::raw::{c_char, c_int};
use tracing::{debug, warn};

/// Search depth used when the host does not pick one
pub const DEFAULT_SEARCH_DEPTH: u32 = 4;

/// Depth as passed to the engine: at least 1
fn native_depth(depth: u32) -> c_int {
    c_int::try_from(depth.max(1)).unwrap_or(c_int::MAX)
}

fn decoded(symbol: &str, result: Result<String, MarshalError>) -> Option<String> {
    match result {
        Ok(text) => Some(text),
        Err(err) => {
            warn!(symbol, error = %err, "could not decode native result");
            None
        }
    }
}

/// Decode a string the engine returned directly; `None` for a null result
fn read_direct(symbol: &str, ptr: *const c_char, limit: usize) -> Option<String> {
    debug!(symbol, null = ptr.is_null(), "native call");
    if ptr.is_null() {
        return None;
    }
    decoded(symbol, unsafe { decode_bounded(ptr, limit) })
}

/// Call a status-returning text symbol; `None` when the engine reports failure
fn read_text(
    arena: &ScratchArena,
    symbol: &str,
    binding: &StringBinding<TextBufferFn, TextDirectFn>,
) -> EngineResult<Option<String>> {
    match *binding {
        StringBinding::Buffer { func, capacity } => arena.with_scratch(capacity, |buffer| {
            let status = unsafe { func(buffer.as_mut_ptr(), buffer.capacity_c_int()) };
            debug!(symbol, status, "native call");
            if !status_ok(status) {
                return None;
            }
            decoded(symbol, buffer.read_string())
        }),
        StringBinding::Direct { func, limit } => Ok(read_direct(symbol, unsafe { func() }, limit)),
    }
}

/// Call a status-returning symbol with a text argument
fn call_with_text(symbol: &str, func: TextArgFn, text: &str) -> bool {
    let arg = match to_c_string(text) {
        Ok(arg) => arg,
        Err(err) => {
            warn!(symbol, error = %err, "argument cannot cross the native boundary");
            return false;
        }
    };
    let status = unsafe { func(arg.as_ptr()) };
    debug!(symbol, status, "native call");
    status_ok(status)
}

impl ChessEngine {
    /// Set the current position from a FEN string
    ///
    /// The FEN is not validated here; `false` means the engine rejected it.
    pub fn set_position(&mut self, fen: &str) -> EngineResult<bool> {
        let bound = self.ready()?;
        Ok(call_with_text(
            "set_position",
            bound.bindings.set_position,
            fen,
        ))
    }

    /// Search for the best move at `depth` plies (0 is treated as 1)
    ///
    /// `None` when the engine has no move ("0000"), reports failure, or
    /// returns something that is not a move token.
    pub fn get_best_move(&mut self, depth: u32) -> EngineResult<Option<MoveToken>> {
        let bound = self.ready()?;
        let depth = native_depth(depth);

        let text = match bound.bindings.get_best_move {
            StringBinding::Buffer { func, capacity } => {
                bound.arena.with_scratch(capacity, |buffer| {
                    let status =
                        unsafe { func(buffer.as_mut_ptr(), buffer.capacity_c_int(), depth) };
                    debug!(symbol = "get_best_move", status, depth, "native call");
                    if !status_ok(status) {
                        return None;
                    }
                    decoded("get_best_move", buffer.read_string())
                })?
            }
            StringBinding::Direct { func, limit } => {
                read_direct("get_best_move", unsafe { func(depth) }, limit)
            }
        };

        Ok(text.as_deref().and_then(parse_best_move))
    }

    /// Play a move given in coordinate notation
    ///
    /// The token is passed through untouched; the engine decides legality.
    pub fn make_move(&mut self, token: &str) -> EngineResult<bool> {
        let bound = self.ready()?;
        Ok(call_with_text("make_move", bound.bindings.make_move, token))
    }

    /// Take back the last move; `false` if there is nothing to undo
    pub fn undo_move(&mut self) -> EngineResult<bool> {
        let bound = self.ready()?;
        let status = unsafe { (bound.bindings.undo_move)() };
        debug!(symbol = "undo_move", status, "native call");
        Ok(status_ok(status))
    }

    /// All legal moves in the current position, in engine order
    ///
    /// Empty when there are none, when the engine reports failure, and when
    /// the payload is blank. A buffer reporting zero moves is not read.
    pub fn get_legal_moves(&mut self) -> EngineResult<Vec<MoveToken>> {
        let bound = self.ready()?;

        match bound.bindings.get_legal_moves {
            StringBinding::Buffer { func, capacity } => {
                bound.arena.with_scratch(capacity, |buffer| {
                    let count = unsafe { func(buffer.as_mut_ptr(), buffer.capacity_c_int()) };
                    debug!(symbol = "get_legal_moves", count, "native call");
                    if !count_ok(count) || count == 0 {
                        return Vec::new();
                    }

                    let moves = decoded("get_legal_moves", buffer.read_string())
                        .as_deref()
                        .map(parse_move_list)
                        .unwrap_or_default();
                    if moves.len() != count as usize {
                        warn!(
                            reported = count,
                            parsed = moves.len(),
                            "legal move count does not match payload"
                        );
                    }
                    moves
                })
            }
            StringBinding::Direct { func, limit } => {
                let text = read_direct("get_legal_moves", unsafe { func() }, limit);
                Ok(text.as_deref().map(parse_move_list).unwrap_or_default())
            }
        }
    }

    pub fn is_checkmate(&mut self) -> EngineResult<bool> {
        let bound = self.ready()?;
        let value = unsafe { (bound.bindings.is_checkmate)() };
        debug!(symbol = "is_checkmate", value, "native call");
        Ok(flag_set(value))
    }

    pub fn is_stalemate(&mut self) -> EngineResult<bool> {
        let bound = self.ready()?;
        let value = unsafe { (bound.bindings.is_stalemate)() };
        debug!(symbol = "is_stalemate", value, "native call");
        Ok(flag_set(value))
    }

    pub fn is_in_check(&mut self) -> EngineResult<bool> {
        let bound = self.ready()?;
        let value = unsafe { (bound.bindings.is_in_check)() };
        debug!(symbol = "is_in_check", value, "native call");
        Ok(flag_set(value))
    }

    /// Static evaluation from the side to move's point of view, as reported
    pub fn evaluate_position(&mut self) -> EngineResult<i32> {
        let bound = self.ready()?;
        let score = unsafe { (bound.bindings.evaluate_position)() };
        debug!(symbol = "evaluate_position", score, "native call");
        Ok(score)
    }

    /// FEN of the current position, or an empty string on failure
    pub fn get_current_fen(&mut self) -> EngineResult<String> {
        let bound = self.ready()?;
        let text = read_text(&bound.arena, "get_fen", &bound.bindings.get_fen)?;
        Ok(text.unwrap_or_default())
    }
}
