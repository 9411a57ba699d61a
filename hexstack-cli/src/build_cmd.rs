//! Build command - build the lookup tables and write the artifact
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_config(), build_tables(), write_artifact()
//! - Level 3: (delegated to hexstack-core)
//! - Level 4: summary formatting

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hexstack_core::{LookupTables, Preset, TableConfig, NUM_CELLS};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BuildArgs {
    /// Named weight set (default, linear, tuned, cell-tuned)
    #[arg(long, default_value = "default", conflicts_with = "config")]
    pub preset: Preset,

    /// Table config or weights JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seed for Zobrist hash keys (omit to skip them)
    #[arg(long)]
    pub zobrist_seed: Option<u64>,

    /// Width of the score table in piece ids
    #[arg(long)]
    pub padded_piece_ids: Option<usize>,

    /// Output artifact path
    #[arg(long, default_value = "hexstack_tables.json")]
    pub output: PathBuf,

    /// Print the build summary as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run build command
///
/// 1. Resolve the configuration
/// 2. Build every table (all or nothing)
/// 3. Write the artifact and report
pub fn run(args: BuildArgs) -> Result<()> {
    let config = load_config(&args)?;

    tracing::info!(
        "Building tables: padded width {}, zobrist {}",
        config.padded_piece_ids,
        config.zobrist_seed.map_or("off".to_string(), |s| format!("seed {s}"))
    );

    let tables = build_tables(&config)?;
    write_artifact(&tables, &args)?;
    report(&tables, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_config(args: &BuildArgs) -> Result<TableConfig> {
    let mut config = match &args.config {
        Some(path) => TableConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => TableConfig::from_preset(args.preset),
    };

    if let Some(seed) = args.zobrist_seed {
        config.zobrist_seed = Some(seed);
    }
    if let Some(width) = args.padded_piece_ids {
        config.padded_piece_ids = width;
    }
    Ok(config)
}

fn build_tables(config: &TableConfig) -> Result<LookupTables> {
    LookupTables::build(config).context("Failed to build lookup tables")
}

fn write_artifact(tables: &LookupTables, args: &BuildArgs) -> Result<()> {
    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tables.save(&args.output)
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

fn report(tables: &LookupTables, args: &BuildArgs) -> Result<()> {
    let scores = tables.scores().as_slice();
    let min = scores.iter().copied().min().unwrap_or(0);
    let max = scores.iter().copied().max().unwrap_or(0);

    if args.json {
        let summary = serde_json::json!({
            "output": args.output.display().to_string(),
            "padded_piece_ids": tables.scores().padded_piece_ids(),
            "cells": NUM_CELLS,
            "score_entries": scores.len(),
            "min_score": min,
            "max_score": max,
            "zobrist": tables.zobrist().map(|z| z.seed()),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Wrote {}", args.output.display());
        println!("  score entries: {} ({} ids x {} cells)", scores.len(), tables.scores().padded_piece_ids(), NUM_CELLS);
        println!("  score range:   {min} .. {max}");
        if let Some(keys) = tables.zobrist() {
            println!("  zobrist seed:  {}", keys.seed());
        }
    }
    Ok(())
}
