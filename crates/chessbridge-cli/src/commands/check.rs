//! Check command - load a module and report its binding without running it

use anyhow::{Context, Result};
use chessbridge_config::ModuleLocator;
use chessbridge_runtime::ffi::DylibModule;
use chessbridge_runtime::{symbols, ChessEngine, ReturnStrategy};
use std::path::Path;

pub fn run(module: &Path) -> Result<()> {
    let resolved = ModuleLocator::new(module)
        .resolve()
        .with_context(|| format!("Failed to locate engine module: {}", module.display()))?;

    let library = DylibModule::open(&resolved.library_path)?;
    let mut engine = ChessEngine::new();
    engine
        .load_with(Box::new(library), &resolved.abi)
        .context("Failed to bind engine symbols")?;

    println!("library:  {}", resolved.library_path.display());
    if let Some(manifest) = &resolved.manifest_path {
        println!("manifest: {}", manifest.display());
    }
    for symbol in symbols::REQUIRED {
        println!("  bound {}", resolved.abi.symbol_name(symbol));
    }
    if let Some([best_move, legal_moves, fen]) = engine.return_strategies() {
        println!("strings:");
        println!("  get_best_move   {}", describe(best_move));
        println!("  get_legal_moves {}", describe(legal_moves));
        println!("  get_fen         {}", describe(fen));
    }
    Ok(())
}

fn describe(strategy: ReturnStrategy) -> String {
    match strategy {
        ReturnStrategy::BufferReturn { capacity } => format!("buffer ({} bytes)", capacity),
        ReturnStrategy::DirectReturn => "direct".to_string(),
    }
}
