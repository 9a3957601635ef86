//! Moves command - legal moves of a position

use super::{open_engine, set_position};
use anyhow::Result;
use chessbridge_runtime::ChessEngine;
use std::io::{self, Write};
use std::path::Path;

pub fn run(module: &Path, fen: &str) -> Result<()> {
    let mut engine = open_engine(module)?;
    execute(&mut engine, fen, &mut io::stdout().lock())
}

/// Write the legal moves of `fen`, one per line
pub fn execute(engine: &mut ChessEngine, fen: &str, out: &mut impl Write) -> Result<()> {
    set_position(engine, fen)?;
    for token in engine.get_legal_moves()? {
        writeln!(out, "{}", token)?;
    }
    Ok(())
}
