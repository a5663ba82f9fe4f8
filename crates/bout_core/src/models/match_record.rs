use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fencer::{FencerSelector, Participant};
use super::touch::{ScoreLine, Side, Touch, TouchKind};
use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Red,
    Green,
    Draw,
}

impl Winner {
    pub fn from_scores(red: u32, green: u32) -> Self {
        match red.cmp(&green) {
            std::cmp::Ordering::Greater => Winner::Red,
            std::cmp::Ordering::Less => Winner::Green,
            std::cmp::Ordering::Equal => Winner::Draw,
        }
    }

    pub fn side(self) -> Option<Side> {
        match self {
            Winner::Red => Some(Side::Red),
            Winner::Green => Some(Side::Green),
            Winner::Draw => None,
        }
    }
}

/// A finalized bout.
///
/// `winner` is fixed when the bout is finalized and is never recomputed from
/// the stored scores.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub id: u64,
    pub date: DateTime<Utc>,
    pub red: Participant,
    pub green: Participant,
    pub red_score: u32,
    pub green_score: u32,
    pub winner: Winner,
    pub touches: Vec<Touch>,
}

impl Match {
    pub fn participant(&self, side: Side) -> &Participant {
        match side {
            Side::Red => &self.red,
            Side::Green => &self.green,
        }
    }

    pub fn score_of(&self, side: Side) -> u32 {
        match side {
            Side::Red => self.red_score,
            Side::Green => self.green_score,
        }
    }

    pub fn score(&self) -> ScoreLine {
        ScoreLine::new(self.red_score, self.green_score)
    }

    /// Side the selected fencer fenced on. Red wins when both sides match.
    pub fn side_of(&self, selector: &FencerSelector) -> Option<Side> {
        if self.red.matches(selector) {
            Some(Side::Red)
        } else if self.green.matches(selector) {
            Some(Side::Green)
        } else {
            None
        }
    }

    pub fn involves(&self, selector: &FencerSelector) -> bool {
        self.side_of(selector).is_some()
    }

    /// Checks the score bookkeeping of the touch history.
    ///
    /// Every single touch adds one point to its side, every double-touch
    /// pair adds one point to both, and `score_after` snapshots the result.
    pub fn validate(&self) -> Result<()> {
        let mut running = ScoreLine::default();
        let mut previous = ScoreLine::default();
        let mut idx = 0;

        while idx < self.touches.len() {
            let touch = &self.touches[idx];
            let side = touch.side.ok_or(ModelError::MissingSide { touch_id: touch.id })?;

            match touch.kind {
                TouchKind::Single => {
                    running.bump(side);
                    check_snapshot(touch, previous, running)?;
                    idx += 1;
                }
                TouchKind::Double { partner } => {
                    let sibling = self
                        .touches
                        .get(idx + 1)
                        .filter(|next| {
                            next.side == Some(partner)
                                && next.kind == TouchKind::Double { partner: side }
                                && next.id == touch.id + 1
                        })
                        .ok_or(ModelError::UnpairedDoubleTouch { touch_id: touch.id })?;
                    running.bump(Side::Red);
                    running.bump(Side::Green);
                    check_snapshot(touch, previous, running)?;
                    check_snapshot(sibling, previous, running)?;
                    idx += 2;
                }
            }
            previous = running;
        }

        if !self.touches.is_empty() && running != self.score() {
            return Err(ModelError::FinalScoreMismatch {
                expected: running.as_pair(),
                found: self.score().as_pair(),
            });
        }
        Ok(())
    }
}

fn check_snapshot(touch: &Touch, previous: ScoreLine, expected: ScoreLine) -> Result<()> {
    if touch.score_after.red < previous.red || touch.score_after.green < previous.green {
        return Err(ModelError::ScoreRegression { touch_id: touch.id });
    }
    if touch.score_after != expected {
        return Err(ModelError::ScoreMismatch {
            touch_id: touch.id,
            expected: expected.as_pair(),
            found: touch.score_after.as_pair(),
        });
    }
    Ok(())
}
