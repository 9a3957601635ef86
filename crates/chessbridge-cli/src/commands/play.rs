//! Play command - apply a move sequence

use super::{open_engine, set_position};
use anyhow::{bail, Result};
use chessbridge_runtime::ChessEngine;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

pub fn run(module: &Path, fen: &str, moves: &[String]) -> Result<()> {
    let mut engine = open_engine(module)?;
    execute(&mut engine, fen, moves, &mut io::stdout().lock())
}

/// Play `moves` from `fen` and write the resulting FEN
///
/// Stops at the first rejected move; nothing is written in that case.
pub fn execute(
    engine: &mut ChessEngine,
    fen: &str,
    moves: &[String],
    out: &mut impl Write,
) -> Result<()> {
    set_position(engine, fen)?;

    for (ply, token) in moves.iter().enumerate() {
        if !engine.make_move(token)? {
            bail!("Move {} rejected at ply {}", token, ply + 1);
        }
        info!(ply = ply + 1, token = %token, "move played");
    }

    writeln!(out, "{}", engine.get_current_fen()?)?;
    Ok(())
}
