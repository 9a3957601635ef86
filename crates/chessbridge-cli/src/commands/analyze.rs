//! Analyze command - full report for one position

use super::open_engine;
use anyhow::{bail, Result};
use chessbridge_runtime::{AnalysisReport, ChessEngine, MoveToken};
use std::io::{self, Write};
use std::path::Path;

pub fn run(module: &Path, fen: &str, depth: u32, json: bool) -> Result<()> {
    let mut engine = open_engine(module)?;
    execute(&mut engine, fen, depth, json, &mut io::stdout().lock())
}

/// Write the report for `fen`, then fail if the analysis did
pub fn execute(
    engine: &mut ChessEngine,
    fen: &str,
    depth: u32,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let report = engine.analyze_position(fen, depth);

    if json {
        writeln!(out, "{}", report.to_json()?)?;
    } else {
        write!(out, "{}", format_report(&report))?;
    }

    if let Some(error) = &report.error {
        bail!("Analysis failed: {}", error);
    }
    Ok(())
}

/// Human-readable rendering of a report
pub fn format_report(report: &AnalysisReport) -> String {
    if !report.success {
        return format!(
            "error: {}\n",
            report.error.as_deref().unwrap_or("unknown failure")
        );
    }

    let best = report
        .best_move
        .as_ref()
        .map(MoveToken::to_string)
        .unwrap_or_else(|| "(none)".to_string());
    let state = if report.is_checkmate {
        "checkmate"
    } else if report.is_stalemate {
        "stalemate"
    } else if report.is_in_check {
        "check"
    } else {
        "in play"
    };
    let moves: Vec<&str> = report.legal_moves.iter().map(MoveToken::as_str).collect();

    format!(
        "fen:        {}\n\
         depth:      {}\n\
         best move:  {}\n\
         evaluation: {}\n\
         state:      {}\n\
         moves ({}): {}\n",
        report.fen,
        report.depth,
        best,
        report.evaluation,
        state,
        report.move_count,
        moves.join(" ")
    )
}
