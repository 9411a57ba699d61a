//! Query commands - read single entries from the tables
//!
//! Both commands either load a previously built artifact (`--tables`) or
//! build the tables in memory from a preset.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hexstack_core::{
    encode, Coords, LookupTables, PieceDescriptor, Preset, Radius, TableConfig,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct TableSource {
    /// Previously built tables artifact
    #[arg(long, value_name = "FILE")]
    pub tables: Option<PathBuf>,

    /// Weight set to build from when no artifact is given
    #[arg(long, default_value = "default")]
    pub preset: Preset,
}

#[derive(Args)]
pub struct ScoreArgs {
    /// Piece notation, top layer first (e.g. S, rp, WR)
    #[arg(long)]
    pub piece: String,

    /// Cell index (0-44)
    #[arg(long)]
    pub cell: usize,

    #[command(flatten)]
    pub source: TableSource,
}

#[derive(Args)]
pub struct NeighboursArgs {
    /// Cell index (0-44)
    #[arg(long)]
    pub cell: usize,

    /// 1 for steps, 2 for jumps
    #[arg(long, default_value = "1")]
    pub radius: u8,

    #[command(flatten)]
    pub source: TableSource,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run_score(args: ScoreArgs) -> Result<()> {
    let tables = load_tables(&args.source)?;

    let descriptor: PieceDescriptor = args.piece.parse()?;
    let code = encode(&descriptor)?;
    let score = tables.evaluate_code(code, args.cell)?;
    let coords = Coords::from_index(args.cell)?;

    println!(
        "{descriptor} (code {code}) on cell {} (row {}, col {}): {score}",
        args.cell, coords.row, coords.col
    );
    Ok(())
}

pub fn run_neighbours(args: NeighboursArgs) -> Result<()> {
    let tables = load_tables(&args.source)?;

    let radius = Radius::try_from(args.radius)?;
    let cells = tables.neighbours(args.cell, radius)?;
    let list: Vec<String> = cells.iter().map(ToString::to_string).collect();

    println!("cell {} radius {}: [{}]", args.cell, args.radius, list.join(", "));
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_tables(source: &TableSource) -> Result<LookupTables> {
    match &source.tables {
        Some(path) => LookupTables::load(path)
            .with_context(|| format!("Failed to load tables: {}", path.display())),
        None => {
            tracing::debug!("Building tables from preset {}", source.preset);
            Ok(LookupTables::build(&TableConfig::from_preset(source.preset))?)
        }
    }
}
