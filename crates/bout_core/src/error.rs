use std::fmt;

use crate::models::Side;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    InvalidZone(i64),
    ScoreRegression { touch_id: u64 },
    ScoreMismatch { touch_id: u64, expected: (u32, u32), found: (u32, u32) },
    FinalScoreMismatch { expected: (u32, u32), found: (u32, u32) },
    UnpairedDoubleTouch { touch_id: u64 },
    MissingSide { touch_id: u64 },
    NothingToUndo,
    EmptyName(Side),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelError::InvalidZone(zone) => write!(f, "Invalid zone: {} (expected 1-6)", zone),
            ModelError::ScoreRegression { touch_id } => {
                write!(f, "Score went backwards at touch {}", touch_id)
            }
            ModelError::ScoreMismatch { touch_id, expected, found } => write!(
                f,
                "Score after touch {} is {}-{}, expected {}-{}",
                touch_id, found.0, found.1, expected.0, expected.1
            ),
            ModelError::FinalScoreMismatch { expected, found } => write!(
                f,
                "Final score {}-{} does not match touch history {}-{}",
                found.0, found.1, expected.0, expected.1
            ),
            ModelError::UnpairedDoubleTouch { touch_id } => {
                write!(f, "Double touch {} has no partner record", touch_id)
            }
            ModelError::MissingSide { touch_id } => {
                write!(f, "Touch {} has no scoring side", touch_id)
            }
            ModelError::NothingToUndo => write!(f, "No touch to undo"),
            ModelError::EmptyName(side) => write!(f, "Empty name for {} fencer", side),
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
