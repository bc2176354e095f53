use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod types;

/// Per-round counting time in seconds for the standard 7-round game.
pub const STANDARD_ROUND_SECS: [u32; 7] = [5, 9, 9, 10, 10, 9, 8];

/// Per-round box budget for the standard 7-round game. Each side draws a
/// count in `[floor(0.6*M), M]`, so both sides together stay within the grid.
pub const STANDARD_BOX_BUDGETS: [u32; 7] = [12, 16, 22, 25, 30, 38, 47];

/// Static per-round tables: how long each counting window lasts and how many
/// boxes each side may get. Rounds are 1-indexed everywhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSchedule {
    durations: Vec<u32>,
    box_budgets: Vec<u32>,
}

impl RoundSchedule {
    /// Builds a schedule, rejecting tables the engine could not run to
    /// completion. A budget `M` must satisfy `2*M <= GRID_CELLS`, otherwise
    /// the unique-cell draw has no termination guarantee.
    pub fn new(durations: Vec<u32>, box_budgets: Vec<u32>) -> Result<Self> {
        if durations.len() != box_budgets.len() {
            return Err(ConfigError::TableLengthMismatch {
                durations: durations.len(),
                budgets: box_budgets.len(),
            });
        }
        if durations.is_empty() {
            return Err(ConfigError::NoRounds);
        }
        for (index, (&secs, &budget)) in durations.iter().zip(&box_budgets).enumerate() {
            let round = index as RoundNumber + 1;
            if secs == 0 {
                return Err(ConfigError::ZeroDuration { round });
            }
            if budget == 0 {
                return Err(ConfigError::ZeroBudget { round });
            }
            if 2 * budget as usize > GRID_CELLS {
                return Err(ConfigError::BudgetExceedsGrid { round, budget });
            }
        }
        Ok(Self {
            durations,
            box_budgets,
        })
    }

    /// The fixed tables of the standard game.
    pub fn standard() -> Self {
        Self::new(STANDARD_ROUND_SECS.to_vec(), STANDARD_BOX_BUDGETS.to_vec())
            .expect("standard tables are valid")
    }

    pub fn round_count(&self) -> RoundNumber {
        self.durations.len() as RoundNumber
    }

    /// Counting window for `round`, in seconds. Rounds are 1-indexed.
    pub fn duration_secs(&self, round: RoundNumber) -> u32 {
        self.durations[round as usize - 1]
    }

    /// Maximum per-side box count for `round`. Rounds are 1-indexed.
    pub fn box_budget(&self, round: RoundNumber) -> u32 {
        self.box_budgets[round as usize - 1]
    }
}

impl Default for RoundSchedule {
    fn default() -> Self {
        Self::standard()
    }
}
