pub mod action;
pub mod fencer;
pub mod match_record;
pub mod touch;

pub use action::{
    Action, ActionCategory, ActionCode, AttackDetail, CounterAttackDetail, DefenseDetail,
    RecordedAction,
};
pub use fencer::{Fencer, FencerId, FencerSelector, Participant, Roster};
pub use match_record::{Match, Winner};
pub use touch::{Attribution, ScoreLine, Side, Touch, TouchKind, Zone};
