//! HEXSTACK Core - Precomputed lookup tables for a stacking hex-board engine
//!
//! This crate builds the read-only artifacts a search engine loads at startup:
//! - Piece codec (rank/owner/stack descriptors to dense ids)
//! - Board topology (45-cell offset board, step and jump neighbours)
//! - Evaluation model (positional score for every piece id and cell)
//! - Table emitter (flat score matrix, neighbour lists, code index)
//! - Zobrist keys over the same piece id and cell space

pub mod pieces;
pub mod board;
pub mod eval;
pub mod tables;
pub mod zobrist;
pub mod config;

// Re-exports for convenient access
pub use pieces::{
    decode, encode, Owner, Piece, PieceCode, PieceDescriptor, PieceId, PieceSpace, Rank,
    NUM_PIECE_IDS,
};
pub use board::{Cell, Coords, Direction, Radius, Topology, NUM_CELLS, NUM_ROWS, ROW_WIDTHS};
pub use eval::{EvalWeights, Evaluator, StackRule, WeightTable, GOAL_BONUS};
pub use tables::{LookupTables, ScoreMatrix, DEFAULT_PADDED_PIECE_IDS};
pub use zobrist::ZobristKeys;
pub use config::{Preset, TableConfig};

/// Error types for table construction and lookup
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("Invalid piece descriptor: {0}")]
    InvalidPieceDescriptor(String),

    #[error("Coordinates out of bounds: row {row}, col {col}")]
    OutOfBounds { row: usize, col: usize },

    #[error("Invalid lookup: {0}")]
    InvalidLookup(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, TableError>;
