pub mod analyze;
pub mod bestmove;
pub mod check;
pub mod moves;
pub mod play;

#[cfg(test)]
pub(crate) mod test_engine;

use anyhow::{bail, Context, Result};
use chessbridge_runtime::{ChessEngine, ModuleLocator};
use std::path::Path;

/// Standard initial position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Load and initialize the engine module at `module`
pub fn open_engine(module: &Path) -> Result<ChessEngine> {
    let mut engine = ChessEngine::new();
    engine
        .load_module(&ModuleLocator::new(module))
        .with_context(|| format!("Failed to load engine module: {}", module.display()))?;
    engine.init().context("Failed to initialize engine")?;
    Ok(engine)
}

/// Set `fen` on an initialized engine, failing if the engine rejects it
pub fn set_position(engine: &mut ChessEngine, fen: &str) -> Result<()> {
    if !engine.set_position(fen)? {
        bail!("Engine rejected position: {}", fen);
    }
    Ok(())
}
