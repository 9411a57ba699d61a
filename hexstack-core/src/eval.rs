//! Position evaluation: static score of every piece on every cell

use serde::{Deserialize, Serialize};

use crate::board::{Cell, Topology, NUM_CELLS, NUM_ROWS};
use crate::pieces::{Owner, Piece, PieceDescriptor, PieceId, PieceSpace, NUM_PIECE_IDS};
use crate::{Result, TableError};

/// Score of a non-Wise piece standing on its goal row (512 * 1024)
pub const GOAL_BONUS: f64 = 524_288.0;

/// Scale applied to the per-cell tuning, which was fitted in hundredths
const CELL_TUNED_SCALE: f64 = 100.0;

/// Per-cell tuning for the 39 cells a piece can occupy before its goal row,
/// ordered by advancement from the owner's home edge
const CELL_TUNED: [f64; 39] = [
    8.546530691405348, -2.4248153537871096, -9.603649901634746, 3.220673112897795,
    -2.3225240837845558, -1.6928949918623704, 9.044688821614217, 4.454803325548141,
    10.45759044645208, 0.37278336992654015, 9.67064653687067, 9.574487904389493,
    9.440166320426936, -3.213172789508703, 1.7713172374947987, -14.960192314514053,
    6.784432789129085, -2.249917703480553, -3.6114512177543534, 11.621915831563234,
    28.267194666875504, 21.447035977930767, 20.034368693287714, 7.038946708509679,
    21.348905754363972, 10.849632201222969, 16.97428194932498, 13.057519596010415,
    3.3606325590128003, -11.771492936858277, 22.07291268509233, 25.65994172899924,
    2.363771999141353, -15.212508453616453, 4.967321156754354, -5.295964478093077,
    1.3815592415913682, 2.164429079366725, 2.934300356828555,
];

/// Positional weights, indexed by how far a piece has advanced from its
/// owner's home edge
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightTable {
    /// One weight per row (7 entries)
    PerRow(Vec<f64>),
    /// One weight per cell (45 entries)
    PerCell(Vec<f64>),
}

impl WeightTable {
    pub fn validate(&self) -> Result<()> {
        let (values, expected, kind) = match self {
            WeightTable::PerRow(w) => (w, NUM_ROWS, "per-row"),
            WeightTable::PerCell(w) => (w, NUM_CELLS, "per-cell"),
        };
        if values.len() != expected {
            return Err(TableError::InvalidConfig(format!(
                "{kind} table needs {expected} entries, got {}",
                values.len()
            )));
        }
        if let Some(bad) = values.iter().position(|w| !w.is_finite()) {
            return Err(TableError::InvalidConfig(format!("{kind} entry {bad} is not finite")));
        }
        Ok(())
    }

    /// Weight for `owner` on `cell` (which lies on `row`). Assumes a
    /// validated table.
    fn weight(&self, owner: Owner, cell: Cell, row: usize) -> f64 {
        match self {
            WeightTable::PerRow(w) => match owner {
                Owner::First => w[NUM_ROWS - 1 - row],
                Owner::Second => w[row],
            },
            WeightTable::PerCell(w) => match owner {
                Owner::First => w[NUM_CELLS - 1 - cell],
                Owner::Second => w[cell],
            },
        }
    }
}

/// How a stack combines its layers before doubling
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackRule {
    /// Score both layers, sum, then double
    #[default]
    Combined,
    /// Score the bottom layer alone, then double (the layer the
    /// one-layer legacy tables read from the low nibble)
    BottomOnly,
}

fn default_goal_bonus() -> f64 {
    GOAL_BONUS
}

/// Weight configuration for the evaluation table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvalWeights {
    /// Positional table for Scout, Pawn and Rook
    pub positional: WeightTable,
    /// Flat value of a Wise, wherever it stands
    pub wise_value: f64,
    /// Added to stacks whose top belongs to First
    pub stack_bonus: f64,
    /// Subtracted from stacks whose top belongs to Second
    pub stack_malus: f64,
    /// Replaces the positional weight on the goal row
    #[serde(default = "default_goal_bonus")]
    pub goal_bonus: f64,
    #[serde(default)]
    pub stack_rule: StackRule,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            positional: WeightTable::PerRow(vec![63.0, 100.0, 110.0, 115.0, 130.0, 135.0, 150.0]),
            wise_value: 70.0,
            stack_bonus: 10.0,
            stack_malus: 10.0,
            goal_bonus: GOAL_BONUS,
            stack_rule: StackRule::Combined,
        }
    }
}

impl EvalWeights {
    /// Evenly spaced row weights
    pub fn linear() -> Self {
        Self {
            positional: WeightTable::PerRow(vec![90.0, 100.0, 110.0, 120.0, 130.0, 140.0, 150.0]),
            wise_value: 80.0,
            stack_bonus: 30.0,
            stack_malus: 30.0,
            goal_bonus: GOAL_BONUS,
            stack_rule: StackRule::BottomOnly,
        }
    }

    /// Row weights from the self-play tuning run
    pub fn tuned() -> Self {
        Self {
            positional: WeightTable::PerRow(vec![
                63.6369, 98.5258, 111.57, 112.084, 133.013, 132.617, 150.0,
            ]),
            wise_value: 68.3554,
            stack_bonus: -10.9016,
            stack_malus: -10.9016,
            goal_bonus: GOAL_BONUS,
            stack_rule: StackRule::BottomOnly,
        }
    }

    /// Per-cell weights from the cell-level tuning run. The goal row
    /// entries are never read and stay zero.
    pub fn cell_tuned() -> Self {
        let mut cells: Vec<f64> = CELL_TUNED.iter().map(|w| w * CELL_TUNED_SCALE).collect();
        cells.resize(NUM_CELLS, 0.0);
        let stack = 18.83345911883383 * CELL_TUNED_SCALE;
        Self {
            positional: WeightTable::PerCell(cells),
            wise_value: 4.265081603543751 * CELL_TUNED_SCALE,
            stack_bonus: stack,
            stack_malus: stack,
            goal_bonus: GOAL_BONUS,
            stack_rule: StackRule::BottomOnly,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.positional.validate()?;
        let scalars = [
            ("wise_value", self.wise_value),
            ("stack_bonus", self.stack_bonus),
            ("stack_malus", self.stack_malus),
            ("goal_bonus", self.goal_bonus),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(TableError::InvalidConfig(format!("{name} is not finite")));
            }
        }
        Ok(())
    }
}

/// Scores pieces on cells for one frozen weight configuration
#[derive(Clone, Debug)]
pub struct Evaluator {
    weights: EvalWeights,
    topology: Topology,
    pieces: PieceSpace,
    padded_piece_ids: usize,
}

impl Evaluator {
    /// Build an evaluator whose id space is padded to `padded_piece_ids`
    pub fn new(weights: EvalWeights, padded_piece_ids: usize) -> Result<Self> {
        weights.validate()?;
        // Empty and unknown codes resolve to id NUM_PIECE_IDS, which must
        // land on a zero padding row
        if padded_piece_ids <= NUM_PIECE_IDS {
            return Err(TableError::InvalidConfig(format!(
                "padded width {padded_piece_ids} leaves no padding id after the {NUM_PIECE_IDS} piece ids"
            )));
        }
        Ok(Self {
            weights,
            topology: Topology::new()?,
            pieces: PieceSpace::new()?,
            padded_piece_ids,
        })
    }

    pub fn weights(&self) -> &EvalWeights {
        &self.weights
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn pieces(&self) -> &PieceSpace {
        &self.pieces
    }

    pub fn padded_piece_ids(&self) -> usize {
        self.padded_piece_ids
    }

    /// Signed contribution of one layer
    fn layer_score(&self, piece: Piece, cell: Cell, row: usize) -> f64 {
        let sign = piece.owner.sign();
        if piece.rank.is_wise() {
            return sign * self.weights.wise_value;
        }
        if row == piece.owner.goal_row() {
            return sign * self.weights.goal_bonus;
        }
        sign * self.weights.positional.weight(piece.owner, cell, row)
    }

    /// Unrounded score of a descriptor on a cell
    pub fn raw_score(&self, descriptor: &PieceDescriptor, cell: Cell) -> Result<f64> {
        let row = self.topology.row_of(cell)?;
        let score = match *descriptor {
            PieceDescriptor::Single(piece) => self.layer_score(piece, cell, row),
            PieceDescriptor::Stack { bottom, top } => {
                let combined = match self.weights.stack_rule {
                    StackRule::Combined => {
                        self.layer_score(bottom, cell, row) + self.layer_score(top, cell, row)
                    }
                    StackRule::BottomOnly => self.layer_score(bottom, cell, row),
                };
                let adjustment = match top.owner {
                    Owner::First => self.weights.stack_bonus,
                    Owner::Second => -self.weights.stack_malus,
                };
                2.0 * combined + adjustment
            }
        };
        Ok(score)
    }

    /// Score of a descriptor on a cell, rounded half away from zero
    pub fn score_descriptor(&self, descriptor: &PieceDescriptor, cell: Cell) -> Result<i64> {
        Ok(self.raw_score(descriptor, cell)?.round() as i64)
    }

    /// Score of a piece id on a cell. Padding ids score 0.
    pub fn score(&self, id: PieceId, cell: Cell) -> Result<i64> {
        self.topology.row_of(cell)?;
        match self.pieces.descriptor(id) {
            Some(descriptor) => self.score_descriptor(descriptor, cell),
            None if id < self.padded_piece_ids => Ok(0),
            None => Err(TableError::InvalidLookup(format!(
                "piece id {id} is outside the table width {}",
                self.padded_piece_ids
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::cell_index;
    use crate::pieces::{enumerate, Rank};
    use crate::tables::DEFAULT_PADDED_PIECE_IDS;

    fn evaluator() -> Evaluator {
        Evaluator::new(EvalWeights::default(), DEFAULT_PADDED_PIECE_IDS).unwrap()
    }

    fn mirror(descriptor: &PieceDescriptor) -> PieceDescriptor {
        let flip = |p: Piece| Piece::new(p.rank, p.owner.opponent());
        match *descriptor {
            PieceDescriptor::Single(p) => PieceDescriptor::Single(flip(p)),
            PieceDescriptor::Stack { bottom, top } => {
                PieceDescriptor::Stack { bottom: flip(bottom), top: flip(top) }
            }
        }
    }

    #[test]
    fn test_row_weight_scenario() {
        let eval = evaluator();
        let scout = PieceDescriptor::single(Rank::Scout, Owner::First);
        for col in 0..7 {
            let cell = cell_index(3, col).unwrap();
            assert_eq!(eval.score_descriptor(&scout, cell).unwrap(), 115);
        }

        // Rook on Scout, both First, on row 3. Both layers read the row 3
        // weight, so this is 470 rather than the (115+150)*2+10 = 540
        // sometimes quoted, which would need a Rook weight of 150 on row 3.
        let stack: PieceDescriptor = "RS".parse().unwrap();
        assert_eq!(eval.score_descriptor(&stack, 19).unwrap(), (115 + 115) * 2 + 10);

        let enemy_stack: PieceDescriptor = "rs".parse().unwrap();
        assert_eq!(eval.score_descriptor(&enemy_stack, 19).unwrap(), -470);
    }

    #[test]
    fn test_weights_read_by_advancement() {
        let eval = evaluator();
        let first = PieceDescriptor::single(Rank::Pawn, Owner::First);
        let second = PieceDescriptor::single(Rank::Pawn, Owner::Second);
        // First starts on row 6, Second on row 0
        assert_eq!(eval.score_descriptor(&first, cell_index(6, 0).unwrap()).unwrap(), 63);
        assert_eq!(eval.score_descriptor(&first, cell_index(5, 0).unwrap()).unwrap(), 100);
        assert_eq!(eval.score_descriptor(&second, cell_index(0, 0).unwrap()).unwrap(), -63);
        assert_eq!(eval.score_descriptor(&second, cell_index(1, 0).unwrap()).unwrap(), -100);
    }

    #[test]
    fn test_wise_invariance() {
        let eval = evaluator();
        let white = PieceDescriptor::single(Rank::Wise, Owner::First);
        let black = PieceDescriptor::single(Rank::Wise, Owner::Second);
        for cell in 0..NUM_CELLS {
            assert_eq!(eval.score_descriptor(&white, cell).unwrap(), 70);
            assert_eq!(eval.score_descriptor(&black, cell).unwrap(), -70);
        }
    }

    #[test]
    fn test_goal_row_override() {
        let mut weights = EvalWeights::default();
        weights.positional = WeightTable::PerRow(vec![1.0; NUM_ROWS]);
        let eval = Evaluator::new(weights, DEFAULT_PADDED_PIECE_IDS).unwrap();

        for rank in Rank::RANKED {
            let first = PieceDescriptor::single(rank, Owner::First);
            let second = PieceDescriptor::single(rank, Owner::Second);
            for col in 0..6 {
                let top = cell_index(0, col).unwrap();
                let bottom = cell_index(6, col).unwrap();
                assert_eq!(eval.score_descriptor(&first, top).unwrap(), 524_288);
                assert_eq!(eval.score_descriptor(&second, bottom).unwrap(), -524_288);
                // A home row is not a goal row
                assert_eq!(eval.score_descriptor(&first, bottom).unwrap(), 1);
                assert_eq!(eval.score_descriptor(&second, top).unwrap(), -1);
            }
        }
    }

    #[test]
    fn test_stacking_law() {
        let eval = evaluator();
        for descriptor in enumerate() {
            let PieceDescriptor::Stack { bottom, top } = descriptor else {
                continue;
            };
            let adjustment = if top.owner == Owner::First { 10 } else { -10 };
            for cell in 0..NUM_CELLS {
                let layers = eval.score_descriptor(&PieceDescriptor::Single(bottom), cell).unwrap()
                    + eval.score_descriptor(&PieceDescriptor::Single(top), cell).unwrap();
                assert_eq!(
                    eval.score_descriptor(&descriptor, cell).unwrap(),
                    2 * layers + adjustment,
                    "{descriptor} on cell {cell}"
                );
            }
        }
    }

    #[test]
    fn test_bottom_only_rule() {
        let weights = EvalWeights { stack_rule: StackRule::BottomOnly, ..EvalWeights::default() };
        let eval = Evaluator::new(weights, DEFAULT_PADDED_PIECE_IDS).unwrap();
        // Wise on a Rook scores as a doubled Rook
        let stack: PieceDescriptor = "WR".parse().unwrap();
        assert_eq!(eval.score_descriptor(&stack, 19).unwrap(), 2 * 115 + 10);
        let goal: PieceDescriptor = "WS".parse().unwrap();
        assert_eq!(eval.score_descriptor(&goal, 0).unwrap(), 2 * 524_288 + 10);
        let wise_on_wise: PieceDescriptor = "ww".parse().unwrap();
        assert_eq!(eval.score_descriptor(&wise_on_wise, 19).unwrap(), -2 * 70 - 10);
    }

    #[test]
    fn test_owner_mirror_symmetry() {
        let eval = evaluator();
        for descriptor in enumerate() {
            let mirrored = mirror(&descriptor);
            for cell in 0..NUM_CELLS {
                assert_eq!(
                    eval.score_descriptor(&descriptor, cell).unwrap(),
                    -eval.score_descriptor(&mirrored, NUM_CELLS - 1 - cell).unwrap(),
                    "{descriptor} on cell {cell}"
                );
            }
        }
    }

    #[test]
    fn test_rounding() {
        let mut weights = EvalWeights::default();
        weights.positional = WeightTable::PerRow(vec![62.5, 99.4, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let eval = Evaluator::new(weights, DEFAULT_PADDED_PIECE_IDS).unwrap();
        let first = PieceDescriptor::single(Rank::Rook, Owner::First);
        let second = PieceDescriptor::single(Rank::Rook, Owner::Second);
        assert_eq!(eval.score_descriptor(&first, 39).unwrap(), 63);
        assert_eq!(eval.score_descriptor(&second, 0).unwrap(), -63);
        assert_eq!(eval.score_descriptor(&first, 32).unwrap(), 99);
    }

    #[test]
    fn test_per_cell_table() {
        let eval = Evaluator::new(EvalWeights::cell_tuned(), DEFAULT_PADDED_PIECE_IDS).unwrap();
        let first = PieceDescriptor::single(Rank::Scout, Owner::First);
        let second = PieceDescriptor::single(Rank::Scout, Owner::Second);
        // First on its home corner reads the first tuned entry
        assert_eq!(eval.score_descriptor(&first, 44).unwrap(), 855);
        assert_eq!(eval.score_descriptor(&second, 0).unwrap(), -855);
        assert_eq!(eval.score_descriptor(&second, 1).unwrap(), 242);
    }

    #[test]
    fn test_padding_and_lookup_errors() {
        let eval = evaluator();
        for cell in 0..NUM_CELLS {
            assert_eq!(eval.score(NUM_PIECE_IDS, cell).unwrap(), 0);
        }
        assert!(matches!(eval.score(DEFAULT_PADDED_PIECE_IDS, 0), Err(TableError::InvalidLookup(_))));
        assert!(matches!(eval.score(0, NUM_CELLS), Err(TableError::InvalidLookup(_))));
        assert!(eval.score(NUM_PIECE_IDS, NUM_CELLS).is_err());

        let wide = Evaluator::new(EvalWeights::default(), 64).unwrap();
        assert_eq!(wide.score(63, 10).unwrap(), 0);
    }

    #[test]
    fn test_invalid_config() {
        let short = EvalWeights {
            positional: WeightTable::PerRow(vec![1.0; 6]),
            ..EvalWeights::default()
        };
        assert!(matches!(Evaluator::new(short, 35), Err(TableError::InvalidConfig(_))));

        let nan = EvalWeights { wise_value: f64::NAN, ..EvalWeights::default() };
        assert!(Evaluator::new(nan, 35).is_err());

        assert!(Evaluator::new(EvalWeights::default(), NUM_PIECE_IDS - 1).is_err());
        // Without a padding id the empty cell has nowhere to land
        assert!(matches!(
            Evaluator::new(EvalWeights::default(), NUM_PIECE_IDS),
            Err(TableError::InvalidConfig(_))
        ));
        assert!(Evaluator::new(EvalWeights::default(), NUM_PIECE_IDS + 1).is_ok());

        for preset in [EvalWeights::linear(), EvalWeights::tuned(), EvalWeights::cell_tuned()] {
            assert!(preset.validate().is_ok());
        }
    }
}
