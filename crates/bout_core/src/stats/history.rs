use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::{
    ActionCode, Attribution, FencerSelector, Match, ScoreLine, Side, Winner, Zone,
};

/// Every fencer name appearing on either side, sorted and deduplicated.
pub fn fencer_names(matches: &[Match]) -> Vec<String> {
    let names: BTreeSet<&str> = matches
        .iter()
        .flat_map(|m| [m.red.name.as_str(), m.green.name.as_str()])
        .filter(|name| !name.is_empty())
        .collect();
    names.into_iter().map(str::to_string).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Victory,
    Defeat,
    Draw,
}

/// One bout seen from the selected fencer's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub match_id: u64,
    pub date: DateTime<Utc>,
    pub opponent: String,
    pub own_score: u32,
    pub opponent_score: u32,
    pub outcome: Outcome,
    pub touches: usize,
}

/// The fencer's bouts, newest first.
pub fn history(matches: &[Match], fencer: &FencerSelector) -> Vec<MatchSummary> {
    let mut summaries: Vec<MatchSummary> = matches
        .iter()
        .filter_map(|m| {
            let side = m.side_of(fencer)?;
            let own_score = m.score_of(side);
            let opponent_score = m.score_of(side.opponent());
            let outcome = match own_score.cmp(&opponent_score) {
                std::cmp::Ordering::Greater => Outcome::Victory,
                std::cmp::Ordering::Less => Outcome::Defeat,
                std::cmp::Ordering::Equal => Outcome::Draw,
            };
            Some(MatchSummary {
                match_id: m.id,
                date: m.date,
                opponent: m.participant(side.opponent()).name.clone(),
                own_score,
                opponent_score,
                outcome,
                touches: m.touches.len(),
            })
        })
        .collect();
    summaries.sort_by(|a, b| b.date.cmp(&a.date).then(b.match_id.cmp(&a.match_id)));
    summaries
}

/// One row of the full match list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchListing {
    pub match_id: u64,
    pub date: DateTime<Utc>,
    pub red: String,
    pub green: String,
    pub red_score: u32,
    pub green_score: u32,
    pub winner: Winner,
    /// `None` on a draw.
    pub winner_name: Option<String>,
    pub touches: usize,
}

/// Every stored bout, newest first.
pub fn match_list(matches: &[Match]) -> Vec<MatchListing> {
    let mut rows: Vec<MatchListing> = matches
        .iter()
        .map(|m| MatchListing {
            match_id: m.id,
            date: m.date,
            red: m.red.name.clone(),
            green: m.green.name.clone(),
            red_score: m.red_score,
            green_score: m.green_score,
            winner: m.winner,
            winner_name: m.winner.side().map(|side| m.participant(side).name.clone()),
            touches: m.touches.len(),
        })
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.match_id.cmp(&a.match_id)));
    rows
}

pub fn find_match(matches: &[Match], id: u64) -> Option<&Match> {
    matches.iter().find(|m| m.id == id)
}

/// A touch as shown in a match's detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchLine {
    pub touch_id: u64,
    pub timestamp: DateTime<Utc>,
    /// Scoring side, resolved from the scorer name on older records.
    pub side: Option<Side>,
    pub fencer: Option<String>,
    pub zone: Zone,
    pub category: Option<&'static str>,
    pub action: String,
    pub code: ActionCode,
    pub score_after: ScoreLine,
    pub double: bool,
}

/// Touch-by-touch log of one match, in recording order.
pub fn touch_log(m: &Match) -> Vec<TouchLine> {
    m.touches
        .iter()
        .map(|t| {
            let (side, fencer) = match t.attribution(&m.red.name, &m.green.name) {
                Attribution::Side(side) => (
                    Some(side),
                    t.fencer_name.clone().or_else(|| Some(m.participant(side).name.clone())),
                ),
                Attribution::Foreign(name) => (None, Some(name)),
                Attribution::Unattributed => (None, None),
            };
            TouchLine {
                touch_id: t.id,
                timestamp: t.timestamp,
                side,
                fencer,
                zone: t.zone,
                category: t.action.category().map(|c| c.label()),
                action: t.action.label().to_string(),
                code: t.action.code(),
                score_after: t.score_after,
                double: t.kind.is_double(),
            }
        })
        .collect()
}
