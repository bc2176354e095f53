use crate::types::RoundNumber;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("round tables are empty")]
    NoRounds,
    #[error("duration table has {durations} entries, budget table has {budgets}")]
    TableLengthMismatch { durations: usize, budgets: usize },
    #[error("round {round} has a zero-second counting window")]
    ZeroDuration { round: RoundNumber },
    #[error("round {round} has a zero box budget")]
    ZeroBudget { round: RoundNumber },
    #[error("round {round} budget {budget} cannot fit two sides in the grid")]
    BudgetExceedsGrid { round: RoundNumber, budget: u32 },
}

pub type Result<T> = core::result::Result<T, ConfigError>;
