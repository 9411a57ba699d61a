//! HEXSTACK CLI - Command-line interface
//!
//! Commands:
//! - build: Build the lookup tables and write them to a JSON artifact
//! - score: Print the score of one piece on one cell
//! - neighbours: Print the neighbour cells of one cell

mod build_cmd;
mod query_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexstack")]
#[command(about = "HEXSTACK evaluation and topology table builder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the lookup tables
    Build(build_cmd::BuildArgs),
    /// Score a piece on a cell
    Score(query_cmd::ScoreArgs),
    /// List the neighbours of a cell
    Neighbours(query_cmd::NeighboursArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => build_cmd::run(args),
        Commands::Score(args) => query_cmd::run_score(args),
        Commands::Neighbours(args) => query_cmd::run_neighbours(args),
    }
}
