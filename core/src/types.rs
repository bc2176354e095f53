use serde::{Deserialize, Serialize};

/// Flat index into the fixed grid, `0..GRID_CELLS`.
pub type CellIndex = u8;

/// 1-indexed round number.
pub type RoundNumber = u32;

pub const GRID_COLS: u8 = 10;
pub const GRID_ROWS: u8 = 10;
pub const GRID_CELLS: usize = GRID_COLS as usize * GRID_ROWS as usize;

/// Which player a box belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// One revealed box on the grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxCell {
    pub index: CellIndex,
    pub side: Side,
}

/// Live player counts. Owned by the host; the engine only ever sees these as
/// a read snapshot taken at the instant a transition fires.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tallies {
    pub left: u32,
    pub right: u32,
}

/// Ground-truth box counts generated for the current round.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCounts {
    pub left: u32,
    pub right: u32,
}

impl TargetCounts {
    pub const fn total(self) -> u32 {
        self.left + self.right
    }
}

/// Cumulative per-player scores, at most one point per side per round.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub left: u32,
    pub right: u32,
}

/// Per-side correctness marks for the most recently scored round.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundVerdict {
    pub left_correct: bool,
    pub right_correct: bool,
}
