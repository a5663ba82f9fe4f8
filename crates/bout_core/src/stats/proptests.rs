use chrono::{DateTime, Utc};
use proptest::prelude::*;

use super::{DrawPolicy, StatsAggregator};
use crate::models::{
    FencerSelector, Match, Participant, RecordedAction, ScoreLine, Side, Touch, TouchKind, Winner,
    Zone,
};

const NAMES: [&str; 4] = ["Alice", "Bob", "Carol", "Dan"];
const LABELS: [&str; 6] = ["SIMPLE", "COMPOUND", "REMISE CA", "PARRY RIPOSTE", "Counter Time", "FLECHE"];

fn arb_touch() -> impl Strategy<Value = Touch> {
    (any::<bool>(), 1u8..=6, 0..LABELS.len()).prop_map(|(red, zone, label)| Touch {
        id: 0,
        timestamp: DateTime::<Utc>::UNIX_EPOCH,
        side: Some(if red { Side::Red } else { Side::Green }),
        fencer_name: None,
        zone: Zone::new(zone).unwrap_or_default(),
        action: RecordedAction::from_label(LABELS[label]),
        score_after: ScoreLine::default(),
        kind: TouchKind::Single,
    })
}

fn arb_match() -> impl Strategy<Value = Match> {
    (0..NAMES.len(), 1..NAMES.len(), 0u32..16, 0u32..16, prop::collection::vec(arb_touch(), 0..20))
        .prop_map(|(red, offset, red_score, green_score, touches)| Match {
            id: 1,
            date: DateTime::<Utc>::UNIX_EPOCH,
            red: Participant::named(NAMES[red]),
            green: Participant::named(NAMES[(red + offset) % NAMES.len()]),
            red_score,
            green_score,
            winner: Winner::from_scores(red_score, green_score),
            touches,
        })
}

fn arb_policy() -> impl Strategy<Value = DrawPolicy> {
    prop_oneof![Just(DrawPolicy::CountAsDefeat), Just(DrawPolicy::Separate)]
}

proptest! {
    /// Every touch of a fencer's bouts is either given or received.
    #[test]
    fn prop_touches_are_conserved(
        matches in prop::collection::vec(arb_match(), 0..8),
        fencer in 0..NAMES.len(),
    ) {
        let name = NAMES[fencer];
        let stats = StatsAggregator::default().aggregate_by_name(&matches, name);
        let expected: usize = matches
            .iter()
            .filter(|m| m.red.name == name || m.green.name == name)
            .map(|m| m.touches.len())
            .sum();
        prop_assert_eq!((stats.total_touches_given + stats.total_touches_received) as usize, expected);
        prop_assert_eq!(stats.touches_given.values().sum::<u32>(), stats.total_touches_given);
        prop_assert_eq!(stats.zone_distribution_received.values().sum::<u32>(), stats.total_touches_received);
    }

    /// Given and received never share a touch: the two fencers of a single
    /// bout see mirrored ledgers.
    #[test]
    fn prop_given_and_received_are_exclusive(m in arb_match()) {
        let aggregator = StatsAggregator::default();
        let red = aggregator.aggregate_by_name(std::slice::from_ref(&m), &m.red.name);
        let green = aggregator.aggregate_by_name(std::slice::from_ref(&m), &m.green.name);
        prop_assert_eq!(&red.touches_given, &green.touches_received);
        prop_assert_eq!(&red.touches_received, &green.touches_given);
    }

    #[test]
    fn prop_ratios_are_bounded(
        matches in prop::collection::vec(arb_match(), 0..8),
        fencer in 0..NAMES.len(),
        policy in arb_policy(),
    ) {
        let stats = StatsAggregator::new(policy).aggregate_by_name(&matches, NAMES[fencer]);
        prop_assert!(stats.victory_ratio <= 100);
        if stats.total_matches == 0 {
            prop_assert_eq!(stats.victory_ratio, 0);
        }
        for efficiency in stats.action_efficiency.values() {
            prop_assert!(*efficiency <= 100);
        }
    }

    #[test]
    fn prop_aggregation_is_idempotent(
        matches in prop::collection::vec(arb_match(), 0..8),
        fencer in 0..NAMES.len(),
    ) {
        let aggregator = StatsAggregator::default();
        let selector = FencerSelector::name(NAMES[fencer]);
        prop_assert_eq!(aggregator.aggregate(&matches, &selector), aggregator.aggregate(&matches, &selector));
    }

    /// Bouts the fencer did not fence leave their statistics untouched.
    #[test]
    fn prop_unrelated_match_changes_nothing(
        mut matches in prop::collection::vec(arb_match(), 0..8),
        extra in arb_match(),
        fencer in 0..NAMES.len(),
    ) {
        let name = NAMES[fencer];
        prop_assume!(extra.red.name != name && extra.green.name != name);
        let aggregator = StatsAggregator::default();
        let before = aggregator.aggregate_by_name(&matches, name);
        matches.push(extra);
        prop_assert_eq!(before, aggregator.aggregate_by_name(&matches, name));
    }
}
