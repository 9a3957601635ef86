//! Bestmove command - engine's choice for a position

use super::{open_engine, set_position};
use anyhow::Result;
use chessbridge_runtime::ChessEngine;
use std::io::{self, Write};
use std::path::Path;

pub fn run(module: &Path, fen: &str, depth: u32) -> Result<()> {
    let mut engine = open_engine(module)?;
    execute(&mut engine, fen, depth, &mut io::stdout().lock())
}

pub fn execute(
    engine: &mut ChessEngine,
    fen: &str,
    depth: u32,
    out: &mut impl Write,
) -> Result<()> {
    set_position(engine, fen)?;
    match engine.get_best_move(depth)? {
        Some(token) => writeln!(out, "{}", token)?,
        None => writeln!(out, "(none)")?,
    }
    Ok(())
}
