pub mod aggregator;
pub mod history;

#[cfg(test)]
mod proptests;

pub use aggregator::{percent, DrawPolicy, FencerStats, StatsAggregator};
pub use history::{
    fencer_names, find_match, history, match_list, touch_log, MatchListing, MatchSummary, Outcome,
    TouchLine,
};
