//! Piece codec: rank/owner descriptors, raw byte codes and dense ids
//!
//! A single piece packs into four bits: bit 0 marks presence, bit 1 the
//! owner, bits 2-3 the rank. A stack puts its bottom layer in the low
//! nibble and its top layer in the high nibble, so every legal piece fits
//! in one byte and the byte alone says whether a cell holds a stack.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::{Result, TableError};

/// Raw byte encoding of a piece (0 = empty cell)
pub type PieceCode = u8;

/// Dense identifier (position in the fixed piece enumeration)
pub type PieceId = usize;

/// Number of legal piece descriptors (17 per owner)
pub const NUM_PIECE_IDS: usize = 34;

/// Multiplier applied to the top layer of a stack
const STACK_MULTIPLIER: u8 = 16;

const PRESENCE_BIT: u8 = 0b0001;
const OWNER_BIT: u8 = 0b0010;
const RANK_SHIFT: u8 = 2;
const LAYER_MASK: u8 = 0x0F;

/// Piece rank, in capture order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Scout = 0,
    Pawn = 1,
    Rook = 2,
    Wise = 3,
}

impl Rank {
    pub const ALL: [Rank; 4] = [Rank::Scout, Rank::Pawn, Rank::Rook, Rank::Wise];

    /// Ranks that score by row (everything but Wise)
    pub const RANKED: [Rank; 3] = [Rank::Scout, Rank::Pawn, Rank::Rook];

    pub fn is_wise(self) -> bool {
        self == Rank::Wise
    }

    fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            0 => Ok(Rank::Scout),
            1 => Ok(Rank::Pawn),
            2 => Ok(Rank::Rook),
            3 => Ok(Rank::Wise),
            _ => Err(TableError::InvalidPieceDescriptor(format!("unknown rank bits {bits}"))),
        }
    }
}

/// Player owning a piece. First scores positive, Second negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Owner {
    First = 0,
    Second = 1,
}

impl Owner {
    pub const ALL: [Owner; 2] = [Owner::First, Owner::Second];

    pub fn opponent(self) -> Self {
        match self {
            Owner::First => Owner::Second,
            Owner::Second => Owner::First,
        }
    }

    /// Sign of this owner's contribution to a score
    pub fn sign(self) -> f64 {
        match self {
            Owner::First => 1.0,
            Owner::Second => -1.0,
        }
    }

    /// Row this owner starts on
    pub fn home_row(self) -> usize {
        match self {
            Owner::First => 6,
            Owner::Second => 0,
        }
    }

    /// Row this owner wins by reaching (the opponent's home row)
    pub fn goal_row(self) -> usize {
        self.opponent().home_row()
    }
}

/// A single piece
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub rank: Rank,
    pub owner: Owner,
}

impl Piece {
    pub const fn new(rank: Rank, owner: Owner) -> Self {
        Self { rank, owner }
    }

    /// Four-bit base value: presence, owner and rank bits
    pub fn base(&self) -> PieceCode {
        PRESENCE_BIT | ((self.owner as u8) << 1) | ((self.rank as u8) << RANK_SHIFT)
    }

    /// Inverse of [`Piece::base`]
    pub fn from_base(base: PieceCode) -> Result<Self> {
        if base & PRESENCE_BIT == 0 || base > LAYER_MASK {
            return Err(TableError::InvalidPieceDescriptor(format!(
                "{base:#04x} is not a single-piece code"
            )));
        }
        let owner = if base & OWNER_BIT == 0 { Owner::First } else { Owner::Second };
        let rank = Rank::from_bits(base >> RANK_SHIFT)?;
        Ok(Self { rank, owner })
    }

    /// Notation character: upper case for First, lower case for Second
    pub fn to_char(&self) -> char {
        let c = match self.rank {
            Rank::Scout => 'S',
            Rank::Pawn => 'P',
            Rank::Rook => 'R',
            Rank::Wise => 'W',
        };
        match self.owner {
            Owner::First => c,
            Owner::Second => c.to_ascii_lowercase(),
        }
    }

    pub fn from_char(c: char) -> Result<Self> {
        let rank = match c.to_ascii_uppercase() {
            'S' => Rank::Scout,
            'P' => Rank::Pawn,
            'R' => Rank::Rook,
            'W' => Rank::Wise,
            _ => {
                return Err(TableError::InvalidPieceDescriptor(format!(
                    "unknown piece character '{c}'"
                )))
            }
        };
        let owner = if c.is_ascii_uppercase() { Owner::First } else { Owner::Second };
        Ok(Self { rank, owner })
    }
}

/// Contents of an occupied cell: one piece or a two-layer stack
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceDescriptor {
    Single(Piece),
    Stack { bottom: Piece, top: Piece },
}

impl PieceDescriptor {
    pub const fn single(rank: Rank, owner: Owner) -> Self {
        PieceDescriptor::Single(Piece::new(rank, owner))
    }

    /// Build a stack, rejecting compositions outside the legal space
    pub fn stack(bottom: Piece, top: Piece) -> Result<Self> {
        if !is_legal_stack(bottom, top) {
            return Err(TableError::InvalidPieceDescriptor(format!(
                "illegal stack {}{}",
                top.to_char(),
                bottom.to_char()
            )));
        }
        Ok(PieceDescriptor::Stack { bottom, top })
    }

    /// The visible piece (the top layer of a stack)
    pub fn top(&self) -> Piece {
        match *self {
            PieceDescriptor::Single(piece) => piece,
            PieceDescriptor::Stack { top, .. } => top,
        }
    }

    pub fn bottom(&self) -> Option<Piece> {
        match *self {
            PieceDescriptor::Single(_) => None,
            PieceDescriptor::Stack { bottom, .. } => Some(bottom),
        }
    }

    pub fn owner(&self) -> Owner {
        self.top().owner
    }

    pub fn is_stack(&self) -> bool {
        matches!(self, PieceDescriptor::Stack { .. })
    }
}

impl fmt::Display for PieceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceDescriptor::Single(piece) => write!(f, "{}", piece.to_char()),
            PieceDescriptor::Stack { bottom, top } => {
                write!(f, "{}{}", top.to_char(), bottom.to_char())
            }
        }
    }
}

impl FromStr for PieceDescriptor {
    type Err = TableError;

    /// Parse notation: one character, or two with the top layer first
    fn from_str(s: &str) -> Result<Self> {
        let chars: Vec<char> = s.chars().collect();
        match chars.as_slice() {
            [c] => Ok(PieceDescriptor::Single(Piece::from_char(*c)?)),
            [top, bottom] => {
                PieceDescriptor::stack(Piece::from_char(*bottom)?, Piece::from_char(*top)?)
            }
            _ => Err(TableError::InvalidPieceDescriptor(format!(
                "expected one or two piece characters, got \"{s}\""
            ))),
        }
    }
}

/// Whether `top` may sit on `bottom`.
///
/// Both layers must share an owner. A Wise top sits on any bottom; a Wise
/// bottom only carries another Wise.
pub fn is_legal_stack(bottom: Piece, top: Piece) -> bool {
    bottom.owner == top.owner && (top.rank.is_wise() || !bottom.rank.is_wise())
}

/// Encode a descriptor into its raw byte code
pub fn encode(descriptor: &PieceDescriptor) -> Result<PieceCode> {
    match *descriptor {
        PieceDescriptor::Single(piece) => Ok(piece.base()),
        PieceDescriptor::Stack { bottom, top } => {
            if !is_legal_stack(bottom, top) {
                return Err(TableError::InvalidPieceDescriptor(format!(
                    "illegal stack {descriptor}"
                )));
            }
            Ok(bottom.base() + top.base() * STACK_MULTIPLIER)
        }
    }
}

/// Decode a raw byte code back into a descriptor
pub fn decode(code: PieceCode) -> Result<PieceDescriptor> {
    let low = code & LAYER_MASK;
    let high = code >> 4;
    if high == 0 {
        return Ok(PieceDescriptor::Single(Piece::from_base(low)?));
    }
    PieceDescriptor::stack(Piece::from_base(low)?, Piece::from_base(high)?)
}

/// Every legal descriptor in id order.
///
/// Per owner (First, then Second): the nine ranked-on-ranked stacks
/// top-major, the four stacks with a Wise on top, then the four singles.
/// Codes therefore ascend within each group.
pub fn enumerate() -> Vec<PieceDescriptor> {
    let mut pieces = Vec::with_capacity(NUM_PIECE_IDS);
    for owner in Owner::ALL {
        for top in Rank::RANKED {
            for bottom in Rank::RANKED {
                pieces.push(PieceDescriptor::Stack {
                    bottom: Piece::new(bottom, owner),
                    top: Piece::new(top, owner),
                });
            }
        }
        for bottom in Rank::ALL {
            pieces.push(PieceDescriptor::Stack {
                bottom: Piece::new(bottom, owner),
                top: Piece::new(Rank::Wise, owner),
            });
        }
        for rank in Rank::ALL {
            pieces.push(PieceDescriptor::single(rank, owner));
        }
    }
    pieces
}

/// The enumerated piece space with forward lookups by descriptor and code
#[derive(Clone, Debug)]
pub struct PieceSpace {
    descriptors: Vec<PieceDescriptor>,
    /// Raw code to dense id; codes outside the space map to `NUM_PIECE_IDS`
    code_index: Vec<PieceId>,
}

impl PieceSpace {
    pub fn new() -> Result<Self> {
        let descriptors = enumerate();
        let mut code_index = vec![NUM_PIECE_IDS; 256];
        let mut seen = FxHashSet::default();

        for (id, descriptor) in descriptors.iter().enumerate() {
            let code = encode(descriptor)?;
            if !seen.insert(code) {
                return Err(TableError::InvalidPieceDescriptor(format!(
                    "code {code} assigned twice (at {descriptor})"
                )));
            }
            code_index[code as usize] = id;
        }

        tracing::debug!("Enumerated {} piece descriptors", descriptors.len());
        Ok(Self { descriptors, code_index })
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceId, &PieceDescriptor)> {
        self.descriptors.iter().enumerate()
    }

    /// Descriptor for an id, `None` for padding ids
    pub fn descriptor(&self, id: PieceId) -> Option<&PieceDescriptor> {
        self.descriptors.get(id)
    }

    pub fn id_of(&self, descriptor: &PieceDescriptor) -> Result<PieceId> {
        let code = encode(descriptor)?;
        self.id_of_code(code).ok_or_else(|| {
            TableError::InvalidPieceDescriptor(format!("{descriptor} is outside the piece space"))
        })
    }

    pub fn id_of_code(&self, code: PieceCode) -> Option<PieceId> {
        let id = self.code_index[code as usize];
        (id < NUM_PIECE_IDS).then_some(id)
    }

    /// Dense code-to-id table; unknown codes (including empty) map to the
    /// first padding id
    pub fn code_index(&self) -> &[PieceId] {
        &self.code_index
    }
}
