//! # bout_core - Fencing bout recording and statistics
//!
//! Records touches of a fencing bout, persists finished matches and
//! aggregates per-fencer statistics from the stored history.
//!
//! ## Features
//! - Live scoring with double touches and undo
//! - Action / zone taxonomy with the short codes used on the statistics pages
//! - Locked JSON match store with optimistic revisions, a fencer roster and legacy import
//! - Compressed, checksummed backups

pub mod bout;
pub mod config;
pub mod error;
pub mod models;
pub mod stats;
pub mod store;

pub use bout::{BoutRecorder, TouchCall};
pub use config::{BoutConfig, ConfigError};
pub use error::{ModelError, Result};
pub use models::{
    Action, ActionCategory, ActionCode, Fencer, FencerId, FencerSelector, Match, Participant,
    RecordedAction, Roster, Side, Touch, Winner, Zone,
};
pub use stats::{
    fencer_names, find_match, history, match_list, touch_log, DrawPolicy, FencerStats,
    MatchListing, MatchSummary, StatsAggregator, TouchLine,
};
pub use store::{JsonFileStore, MatchStore, MemoryStore, StoreError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
