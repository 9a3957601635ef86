//! Position analysis
//!
//! Runs the whole call surface over one position and folds the answers into a
//! single [`AnalysisReport`]. Failures never escape: they end up in the
//! report's `error` field.

use crate::error::EngineResult;
use crate::lifecycle::{panic_message, ChessEngine};
use crate::move_token::MoveToken;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

/// Error text for a position the engine refused
pub const INVALID_FEN: &str = "Invalid FEN position";

/// Everything known about one position after an analysis request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub best_move: Option<MoveToken>,
    /// Centipawns, from the side to move's perspective
    pub evaluation: i32,
    pub legal_moves: Vec<MoveToken>,
    pub move_count: usize,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
    pub is_in_check: bool,
    pub depth: u32,
    pub fen: String,
}

impl AnalysisReport {
    /// A report carrying only an error
    pub fn failed(error: impl Into<String>, depth: u32) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            best_move: None,
            evaluation: 0,
            legal_moves: Vec::new(),
            move_count: 0,
            is_checkmate: false,
            is_stalemate: false,
            is_in_check: false,
            depth,
            fen: String::new(),
        }
    }

    /// True when the side to move has no legal moves
    pub fn is_game_over(&self) -> bool {
        self.is_checkmate || self.is_stalemate
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl ChessEngine {
    /// Analyze `fen` at `depth`
    ///
    /// Sets the position first and stops there if the engine rejects it.
    /// Otherwise queries best move, evaluation, legal moves, the three game
    /// state flags and the resulting FEN, in that order.
    pub fn analyze_position(&mut self, fen: &str, depth: u32) -> AnalysisReport {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_analysis(fen, depth)));

        match outcome {
            Ok(Ok(report)) => report,
            Ok(Err(err)) => {
                warn!(error = %err, "analysis aborted");
                AnalysisReport::failed(err.to_string(), depth)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(reason = %message, "analysis panicked");
                AnalysisReport::failed(format!("engine panicked: {}", message), depth)
            }
        }
    }

    fn run_analysis(&mut self, fen: &str, depth: u32) -> EngineResult<AnalysisReport> {
        if !self.set_position(fen)? {
            return Ok(AnalysisReport::failed(INVALID_FEN, depth));
        }

        let best_move = self.get_best_move(depth)?;
        let evaluation = self.evaluate_position()?;
        let legal_moves = self.get_legal_moves()?;
        let is_checkmate = self.is_checkmate()?;
        let is_stalemate = self.is_stalemate()?;
        let is_in_check = self.is_in_check()?;
        let fen = self.get_current_fen()?;

        Ok(AnalysisReport {
            success: true,
            error: None,
            best_move,
            evaluation,
            move_count: legal_moves.len(),
            legal_moves,
            is_checkmate,
            is_stalemate,
            is_in_check,
            depth,
            fen,
        })
    }
}
