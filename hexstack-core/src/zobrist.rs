//! Zobrist hashing keys over the (piece id, cell) space.
//! Padding ids get key 0, so an empty cell leaves a hash unchanged.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Cell, NUM_CELLS};
use crate::pieces::{PieceId, NUM_PIECE_IDS};
use crate::{Result, TableError};

/// Number of search-depth keys
pub const NUM_DEPTH_KEYS: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZobristKeys {
    seed: u64,
    padded_piece_ids: usize,
    piece_keys: Vec<u64>,
    depth_keys: Vec<u64>,
}

impl ZobristKeys {
    /// Generate keys deterministically from `seed`
    pub fn generate(seed: u64, padded_piece_ids: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut piece_keys = Vec::with_capacity(padded_piece_ids * NUM_CELLS);
        for id in 0..padded_piece_ids {
            for _ in 0..NUM_CELLS {
                piece_keys.push(if id < NUM_PIECE_IDS { rng.gen() } else { 0 });
            }
        }
        let depth_keys = (0..NUM_DEPTH_KEYS).map(|_| rng.gen()).collect();

        Self { seed, padded_piece_ids, piece_keys, depth_keys }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn key(&self, id: PieceId, cell: Cell) -> Result<u64> {
        if id >= self.padded_piece_ids || cell >= NUM_CELLS {
            return Err(TableError::InvalidLookup(format!("no hash key for ({id}, {cell})")));
        }
        Ok(self.piece_keys[id * NUM_CELLS + cell])
    }

    pub fn depth_key(&self, depth: usize) -> Result<u64> {
        self.depth_keys
            .get(depth)
            .copied()
            .ok_or_else(|| TableError::InvalidLookup(format!("no hash key for depth {depth}")))
    }

    /// Hash a full board (one piece id per cell) at a search depth
    pub fn hash(&self, occupancy: &[PieceId], depth: usize) -> Result<u64> {
        if occupancy.len() != NUM_CELLS {
            return Err(TableError::InvalidLookup(format!(
                "occupancy has {} cells, expected {NUM_CELLS}",
                occupancy.len()
            )));
        }
        let mut hash = self.depth_key(depth)?;
        for (cell, &id) in occupancy.iter().enumerate() {
            hash ^= self.key(id, cell)?;
        }
        Ok(hash)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.piece_keys.len() != self.padded_piece_ids * NUM_CELLS
            || self.depth_keys.len() != NUM_DEPTH_KEYS
        {
            return Err(TableError::InvalidConfig("malformed zobrist keys".to_string()));
        }
        Ok(())
    }
}
