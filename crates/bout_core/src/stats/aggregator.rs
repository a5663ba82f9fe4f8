//! Per-fencer statistics over the persisted match list.
//!
//! Single pass, no I/O: the caller hands in the already loaded matches and
//! gets a freshly built [`FencerStats`] back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{ActionCode, Attribution, FencerSelector, Match, Side, Zone};

/// How a bout that ended level counts for the fencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawPolicy {
    /// A draw is a defeat. Historical behavior of the statistics page.
    #[default]
    CountAsDefeat,
    /// Draws only go to `draws`; the victory ratio is taken over decided bouts.
    Separate,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FencerStats {
    pub total_matches: u32,
    pub victories: u32,
    pub defeats: u32,
    /// Level bouts, whatever the draw policy.
    pub draws: u32,
    pub victory_ratio: u32,
    pub touches_given: BTreeMap<ActionCode, u32>,
    pub touches_received: BTreeMap<ActionCode, u32>,
    pub zone_distribution: BTreeMap<Zone, u32>,
    pub zone_distribution_received: BTreeMap<Zone, u32>,
    pub total_touches_given: u32,
    pub total_touches_received: u32,
    pub action_efficiency: BTreeMap<ActionCode, u32>,
    /// Touches with neither a side nor a scorer name.
    pub unattributed_touches: u32,
}

impl FencerStats {
    pub fn given(&self, code: &ActionCode) -> u32 {
        self.touches_given.get(code).copied().unwrap_or(0)
    }

    pub fn received(&self, code: &ActionCode) -> u32 {
        self.touches_received.get(code).copied().unwrap_or(0)
    }

    /// Given touches landed in the fencer's own half (zones 1-3).
    pub fn own_half_given(&self) -> u32 {
        self.zone_distribution.iter().filter(|(z, _)| z.is_own_half()).map(|(_, n)| n).sum()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatsAggregator {
    pub draw_policy: DrawPolicy,
}

impl StatsAggregator {
    pub fn new(draw_policy: DrawPolicy) -> Self {
        Self { draw_policy }
    }

    pub fn aggregate_by_name(&self, matches: &[Match], fencer: &str) -> FencerStats {
        self.aggregate(matches, &FencerSelector::name(fencer))
    }

    pub fn aggregate(&self, matches: &[Match], fencer: &FencerSelector) -> FencerStats {
        let mut stats = FencerStats::default();

        for m in matches {
            let Some(side) = m.side_of(fencer) else {
                continue;
            };
            stats.total_matches += 1;
            self.tally_result(&mut stats, m, side);

            for touch in &m.touches {
                let scored_by = match touch.attribution(&m.red.name, &m.green.name) {
                    Attribution::Side(s) => Some(s == side),
                    // Neither participant's name, so not the selected fencer.
                    Attribution::Foreign(_) => Some(false),
                    Attribution::Unattributed => None,
                };

                let code = touch.action.code();
                match scored_by {
                    Some(true) => {
                        *stats.touches_given.entry(code).or_default() += 1;
                        *stats.zone_distribution.entry(touch.zone).or_default() += 1;
                        stats.total_touches_given += 1;
                    }
                    Some(false) => {
                        *stats.touches_received.entry(code).or_default() += 1;
                        *stats.zone_distribution_received.entry(touch.zone).or_default() += 1;
                        stats.total_touches_received += 1;
                    }
                    None => {
                        tracing::debug!(match_id = m.id, touch_id = touch.id, "unattributed touch");
                        stats.unattributed_touches += 1;
                    }
                }
            }
        }

        let decided = match self.draw_policy {
            DrawPolicy::CountAsDefeat => stats.total_matches,
            DrawPolicy::Separate => stats.victories + stats.defeats,
        };
        stats.victory_ratio = percent(stats.victories, decided);

        let codes: Vec<ActionCode> = stats
            .touches_given
            .keys()
            .chain(stats.touches_received.keys())
            .cloned()
            .collect();
        for code in codes {
            let given = stats.given(&code);
            let efficiency = percent(given, given + stats.received(&code));
            stats.action_efficiency.insert(code, efficiency);
        }

        tracing::debug!(
            fencer = %fencer,
            matches = stats.total_matches,
            given = stats.total_touches_given,
            received = stats.total_touches_received,
            "fencer stats"
        );
        stats
    }

    fn tally_result(&self, stats: &mut FencerStats, m: &Match, side: Side) {
        let own = m.score_of(side);
        let opponent = m.score_of(side.opponent());

        if own > opponent {
            stats.victories += 1;
        } else if own < opponent {
            stats.defeats += 1;
        } else {
            stats.draws += 1;
            if self.draw_policy == DrawPolicy::CountAsDefeat {
                stats.defeats += 1;
            }
        }
    }
}

/// `round(part / whole * 100)`, half rounded up, 0 for an empty whole.
pub fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (part as u64, whole as u64);
    ((200 * part + whole) / (2 * whole)) as u32
}
