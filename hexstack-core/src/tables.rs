//! Table emitter: the flat read-only artifacts a search engine loads
//!
//! Everything here is built once from a [`TableConfig`] and never mutated
//! afterwards, so a built [`LookupTables`] can be shared between search
//! threads without synchronization.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::board::{Cell, Radius, NUM_CELLS};
use crate::config::TableConfig;
use crate::eval::Evaluator;
use crate::pieces::{PieceCode, PieceId};
use crate::zobrist::ZobristKeys;
use crate::{Result, TableError};

/// Table width in piece ids: the 34 legal ids plus one padding id
pub const DEFAULT_PADDED_PIECE_IDS: usize = 35;

/// Slots per cell in the packed neighbour layout (count + up to 6 cells)
pub const PACKED_NEIGHBOUR_STRIDE: usize = 7;

/// Dense `(piece id, cell)` score table in row-major order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreMatrix {
    padded_piece_ids: usize,
    scores: Vec<i64>,
}

impl ScoreMatrix {
    /// Score every id in the evaluator's padded width on every cell
    pub fn build(evaluator: &Evaluator) -> Result<Self> {
        let width = evaluator.padded_piece_ids();
        let mut scores = Vec::with_capacity(width * NUM_CELLS);
        for id in 0..width {
            for cell in 0..NUM_CELLS {
                scores.push(evaluator.score(id, cell)?);
            }
        }
        Ok(Self { padded_piece_ids: width, scores })
    }

    #[inline]
    pub fn get(&self, id: PieceId, cell: Cell) -> Result<i64> {
        if id >= self.padded_piece_ids || cell >= NUM_CELLS {
            return Err(TableError::InvalidLookup(format!(
                "({id}, {cell}) is outside the {}x{NUM_CELLS} score table",
                self.padded_piece_ids
            )));
        }
        Ok(self.scores[id * NUM_CELLS + cell])
    }

    pub fn padded_piece_ids(&self) -> usize {
        self.padded_piece_ids
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.scores
    }

    fn validate(&self) -> Result<()> {
        if self.scores.len() != self.padded_piece_ids * NUM_CELLS {
            return Err(TableError::InvalidConfig(format!(
                "score table holds {} entries, expected {}",
                self.scores.len(),
                self.padded_piece_ids * NUM_CELLS
            )));
        }
        Ok(())
    }
}

/// All artifacts for one weight configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTables {
    scores: ScoreMatrix,
    /// Raw piece code to dense id, 256 entries
    piece_index: Vec<PieceId>,
    step: Vec<Vec<Cell>>,
    jump: Vec<Vec<Cell>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zobrist: Option<ZobristKeys>,
}

impl LookupTables {
    /// Build every artifact described by `config`
    pub fn build(config: &TableConfig) -> Result<Self> {
        let evaluator = Evaluator::new(config.weights.clone(), config.padded_piece_ids)?;
        let tables = Self::from_evaluator(&evaluator)?;
        Ok(match config.zobrist_seed {
            Some(seed) => tables.with_zobrist(seed),
            None => tables,
        })
    }

    pub fn from_evaluator(evaluator: &Evaluator) -> Result<Self> {
        let scores = ScoreMatrix::build(evaluator)?;
        tracing::info!(
            "Built score table: {} piece ids x {} cells",
            scores.padded_piece_ids(),
            NUM_CELLS
        );

        let topology = evaluator.topology();
        Ok(Self {
            scores,
            piece_index: evaluator.pieces().code_index().to_vec(),
            step: topology.all_neighbours(Radius::Step).to_vec(),
            jump: topology.all_neighbours(Radius::Jump).to_vec(),
            zobrist: None,
        })
    }

    /// Attach Zobrist keys generated from `seed`
    pub fn with_zobrist(mut self, seed: u64) -> Self {
        self.zobrist = Some(ZobristKeys::generate(seed, self.scores.padded_piece_ids()));
        self
    }

    /// Score of a piece id on a cell
    #[inline]
    pub fn evaluate(&self, id: PieceId, cell: Cell) -> Result<i64> {
        self.scores.get(id, cell)
    }

    /// Score of a raw piece code on a cell; codes outside the piece space
    /// (including the empty cell) resolve through the padding id to 0
    #[inline]
    pub fn evaluate_code(&self, code: PieceCode, cell: Cell) -> Result<i64> {
        self.scores.get(self.piece_index[code as usize], cell)
    }

    /// Sorted neighbour cells at `radius`
    #[inline]
    pub fn neighbours(&self, cell: Cell, radius: Radius) -> Result<&[Cell]> {
        let lists = match radius {
            Radius::Step => &self.step,
            Radius::Jump => &self.jump,
        };
        lists
            .get(cell)
            .map(Vec::as_slice)
            .ok_or_else(|| TableError::InvalidLookup(format!("cell {cell} is off the board")))
    }

    pub fn scores(&self) -> &ScoreMatrix {
        &self.scores
    }

    pub fn piece_index(&self) -> &[PieceId] {
        &self.piece_index
    }

    pub fn zobrist(&self) -> Option<&ZobristKeys> {
        self.zobrist.as_ref()
    }

    /// Neighbours as one flat array: for each cell, the count followed by
    /// the cells, padded to [`PACKED_NEIGHBOUR_STRIDE`] slots
    pub fn packed_neighbours(&self, radius: Radius) -> Vec<u8> {
        let lists = match radius {
            Radius::Step => &self.step,
            Radius::Jump => &self.jump,
        };
        let mut packed = vec![0u8; NUM_CELLS * PACKED_NEIGHBOUR_STRIDE];
        for (cell, list) in lists.iter().enumerate() {
            let slot = &mut packed[cell * PACKED_NEIGHBOUR_STRIDE..][..PACKED_NEIGHBOUR_STRIDE];
            slot[0] = list.len() as u8;
            for (dst, &neighbour) in slot[1..].iter_mut().zip(list) {
                *dst = neighbour as u8;
            }
        }
        packed
    }

    /// Reject tables whose shape does not match the board and piece space
    pub fn validate(&self) -> Result<()> {
        self.scores.validate()?;
        if self.piece_index.len() != 256 {
            return Err(TableError::InvalidConfig(format!(
                "piece index holds {} entries, expected 256",
                self.piece_index.len()
            )));
        }
        if let Some(&id) = self.piece_index.iter().find(|&&id| id >= self.scores.padded_piece_ids()) {
            return Err(TableError::InvalidConfig(format!("piece index points past the table at id {id}")));
        }
        for lists in [&self.step, &self.jump] {
            let well_formed = lists.len() == NUM_CELLS
                && lists.iter().all(|l| l.len() <= 6 && l.iter().all(|&c| c < NUM_CELLS));
            if !well_formed {
                return Err(TableError::InvalidConfig("malformed neighbour lists".to_string()));
            }
        }
        if let Some(keys) = &self.zobrist {
            keys.validate()?;
        }
        Ok(())
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write tables to {}", path.display()))?;
        tracing::info!("Wrote lookup tables to {}", path.display());
        Ok(())
    }

    /// Load from JSON file, checking the table shapes
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tables from {}", path.display()))?;
        let tables: LookupTables = serde_json::from_str(&content)?;
        tables.validate()?;
        Ok(tables)
    }
}
