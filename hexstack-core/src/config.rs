//! TableConfig - build-time configuration for the lookup tables

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::eval::EvalWeights;
use crate::tables::DEFAULT_PADDED_PIECE_IDS;
use crate::TableError;

fn default_padded_piece_ids() -> usize {
    DEFAULT_PADDED_PIECE_IDS
}

/// Everything that varies between table builds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    pub weights: EvalWeights,
    /// Width of the score table in piece ids (legal ids plus padding)
    #[serde(default = "default_padded_piece_ids")]
    pub padded_piece_ids: usize,
    /// Seed for the Zobrist keys; no keys are built without one
    #[serde(default)]
    pub zobrist_seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            weights: EvalWeights::default(),
            padded_piece_ids: DEFAULT_PADDED_PIECE_IDS,
            zobrist_seed: None,
        }
    }
}

impl TableConfig {
    pub fn from_preset(preset: Preset) -> Self {
        Self { weights: preset.weights(), ..Self::default() }
    }

    /// Load from JSON file. Accepts either a full config or bare weights.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        if let Ok(config) = serde_json::from_str::<TableConfig>(&content) {
            return Ok(config);
        }

        let weights: EvalWeights = serde_json::from_str(&content)
            .with_context(|| format!("{} is neither a table config nor weights", path.display()))?;
        Ok(Self { weights, ..Self::default() })
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }
}

/// Named weight sets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Default,
    Linear,
    Tuned,
    CellTuned,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Default, Preset::Linear, Preset::Tuned, Preset::CellTuned];

    pub fn weights(self) -> EvalWeights {
        match self {
            Preset::Default => EvalWeights::default(),
            Preset::Linear => EvalWeights::linear(),
            Preset::Tuned => EvalWeights::tuned(),
            Preset::CellTuned => EvalWeights::cell_tuned(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Linear => "linear",
            Preset::Tuned => "tuned",
            Preset::CellTuned => "cell-tuned",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| TableError::InvalidConfig(format!("unknown preset \"{s}\"")))
    }
}
