use chrono::{DateTime, Utc};

use crate::error::{ModelError, Result};
use crate::models::{
    Action, Match, Participant, RecordedAction, ScoreLine, Side, Touch, TouchKind, Winner, Zone,
};

pub const DEFAULT_RED_NAME: &str = "Rouge";
pub const DEFAULT_GREEN_NAME: &str = "Vert";

/// Zone and action entered for one fencer of a scoring event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchCall {
    pub zone: Zone,
    pub action: Action,
}

impl TouchCall {
    pub fn new(zone: Zone, action: Action) -> Self {
        Self { zone, action }
    }
}

/// In-progress bout.
///
/// The recorder is the only place a match is mutable. `finalize` consumes it
/// and hands back the immutable [`Match`] that gets persisted.
#[derive(Debug, Clone)]
pub struct BoutRecorder {
    red: Participant,
    green: Participant,
    score: ScoreLine,
    touches: Vec<Touch>,
    last_id: u64,
}

impl BoutRecorder {
    pub fn new(red: Participant, green: Participant) -> Self {
        Self::with_default_names(red, green, DEFAULT_RED_NAME, DEFAULT_GREEN_NAME)
    }

    /// Like [`BoutRecorder::new`], with the names used for blank participants.
    pub fn with_default_names(
        mut red: Participant,
        mut green: Participant,
        red_default: &str,
        green_default: &str,
    ) -> Self {
        if red.name.trim().is_empty() {
            red.name = red_default.to_string();
        }
        if green.name.trim().is_empty() {
            green.name = green_default.to_string();
        }
        Self { red, green, score: ScoreLine::default(), touches: Vec::new(), last_id: 0 }
    }

    pub fn score(&self) -> ScoreLine {
        self.score
    }

    pub fn touches(&self) -> &[Touch] {
        &self.touches
    }

    pub fn participant(&self, side: Side) -> &Participant {
        match side {
            Side::Red => &self.red,
            Side::Green => &self.green,
        }
    }

    /// Changes the display name used for touches recorded from now on.
    pub fn rename(&mut self, side: Side, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(ModelError::EmptyName(side));
        }
        match side {
            Side::Red => self.red.name = name.to_string(),
            Side::Green => self.green.name = name.to_string(),
        }
        Ok(())
    }

    pub fn record_touch(&mut self, side: Side, call: TouchCall) -> &Touch {
        self.record_touch_at(side, call, Utc::now())
    }

    pub fn record_touch_at(&mut self, side: Side, call: TouchCall, at: DateTime<Utc>) -> &Touch {
        self.score.bump(side);
        let id = self.next_id(at);
        let touch = Touch {
            id,
            timestamp: at,
            side: Some(side),
            fencer_name: Some(self.participant(side).name.clone()),
            zone: call.zone,
            action: RecordedAction::Classified(call.action),
            score_after: self.score,
            kind: TouchKind::Single,
        };
        tracing::debug!(id, %side, zone = %call.zone, action = %call.action, score = %self.score, "touch");
        self.touches.push(touch);
        &self.touches[self.touches.len() - 1]
    }

    /// Records simultaneous touches: both scores move, two sibling records
    /// share the timestamp and the base id.
    pub fn record_double(&mut self, red: TouchCall, green: TouchCall) -> (&Touch, &Touch) {
        self.record_double_at(red, green, Utc::now())
    }

    pub fn record_double_at(
        &mut self,
        red: TouchCall,
        green: TouchCall,
        at: DateTime<Utc>,
    ) -> (&Touch, &Touch) {
        self.score.bump(Side::Red);
        self.score.bump(Side::Green);
        let base = self.next_id(at);
        self.last_id = base + 1;

        for (offset, side, call) in [(0, Side::Red, red), (1, Side::Green, green)] {
            let touch = Touch {
                id: base + offset,
                timestamp: at,
                side: Some(side),
                fencer_name: Some(self.participant(side).name.clone()),
                zone: call.zone,
                action: RecordedAction::Classified(call.action),
                score_after: self.score,
                kind: TouchKind::Double { partner: side.opponent() },
            };
            self.touches.push(touch);
        }
        tracing::debug!(base, score = %self.score, "double touch");

        let len = self.touches.len();
        (&self.touches[len - 2], &self.touches[len - 1])
    }

    /// Removes the last scoring event. A double touch is undone as a whole.
    pub fn undo_last(&mut self) -> Result<Vec<Touch>> {
        let last = self.touches.pop().ok_or(ModelError::NothingToUndo)?;
        let mut removed = vec![last];
        if removed[0].kind.is_double() {
            if let Some(partner) = self.touches.pop() {
                removed.insert(0, partner);
            }
        }
        self.score = self.touches.last().map(|t| t.score_after).unwrap_or_default();
        tracing::debug!(removed = removed.len(), score = %self.score, "undo");
        Ok(removed)
    }

    pub fn finalize(self) -> Match {
        self.finalize_at(Utc::now())
    }

    /// Closes the bout. The winner is derived here, once.
    pub fn finalize_at(self, at: DateTime<Utc>) -> Match {
        let id = (at.timestamp_millis().max(0) as u64).max(self.last_id + 1);
        let winner = Winner::from_scores(self.score.red, self.score.green);
        tracing::info!(
            id,
            red = %self.red.name,
            green = %self.green.name,
            score = %self.score,
            touches = self.touches.len(),
            "bout finalized"
        );
        Match {
            id,
            date: at,
            red: self.red,
            green: self.green,
            red_score: self.score.red,
            green_score: self.score.green,
            winner,
            touches: self.touches,
        }
    }

    fn next_id(&mut self, at: DateTime<Utc>) -> u64 {
        let millis = at.timestamp_millis().max(0) as u64;
        let id = millis.max(self.last_id + 1);
        self.last_id = id;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttackDetail, CounterAttackDetail, DefenseDetail};
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn call(zone: u8, action: Action) -> TouchCall {
        TouchCall::new(Zone::new(zone).unwrap(), action)
    }

    #[test]
    fn test_blank_names_get_defaults() {
        let rec = BoutRecorder::new(Participant::named(""), Participant::named("  "));
        assert_eq!(rec.participant(Side::Red).name, DEFAULT_RED_NAME);
        assert_eq!(rec.participant(Side::Green).name, DEFAULT_GREEN_NAME);
    }

    #[test]
    fn test_single_touch_increments_one_side() {
        let mut rec = BoutRecorder::new(Participant::named("Alice"), Participant::named("Bob"));
        let touch = rec.record_touch_at(Side::Red, call(2, Action::SIMPLE), at(0)).clone();

        assert_eq!(touch.score_after, ScoreLine::new(1, 0));
        assert_eq!(touch.fencer_name.as_deref(), Some("Alice"));
        assert_eq!(touch.kind, TouchKind::Single);
        assert_eq!(rec.score(), ScoreLine::new(1, 0));
    }

    #[test]
    fn test_double_touch_pairs_records() {
        let mut rec = BoutRecorder::new(Participant::named("Alice"), Participant::named("Bob"));
        let (red, green) = rec.record_double_at(
            call(5, Action::Attack(AttackDetail::Compound)),
            call(1, Action::CounterAttack(CounterAttackDetail::CounterAttack)),
            at(3),
        );
        let (red, green) = (red.clone(), green.clone());

        assert_eq!(green.id, red.id + 1);
        assert_eq!(red.timestamp, green.timestamp);
        assert_eq!(red.score_after, ScoreLine::new(1, 1));
        assert_eq!(green.score_after, ScoreLine::new(1, 1));
        assert_eq!(red.kind, TouchKind::Double { partner: Side::Green });
        assert_eq!(green.kind, TouchKind::Double { partner: Side::Red });
    }

    #[test]
    fn test_ids_strictly_increase_within_same_millisecond() {
        let mut rec = BoutRecorder::new(Participant::named("Alice"), Participant::named("Bob"));
        let first = rec.record_touch_at(Side::Red, call(1, Action::SIMPLE), at(0)).id;
        let (a, b) = rec.record_double_at(call(1, Action::SIMPLE), call(1, Action::SIMPLE), at(0));
        let (a, b) = (a.id, b.id);
        let last = rec.record_touch_at(Side::Green, call(1, Action::SIMPLE), at(0)).id;
        assert!(first < a && a < b && b < last);
    }

    #[test]
    fn test_undo_double_removes_both_records() {
        let mut rec = BoutRecorder::new(Participant::named("Alice"), Participant::named("Bob"));
        rec.record_touch_at(Side::Green, call(4, Action::SIMPLE), at(0));
        rec.record_double_at(call(1, Action::SIMPLE), call(2, Action::SIMPLE), at(1));

        let removed = rec.undo_last().unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(rec.score(), ScoreLine::new(0, 1));
        assert_eq!(rec.touches().len(), 1);

        rec.undo_last().unwrap();
        assert_eq!(rec.score(), ScoreLine::default());
        assert_eq!(rec.undo_last(), Err(ModelError::NothingToUndo));
    }

    #[test]
    fn test_rename_applies_to_later_touches() {
        let mut rec = BoutRecorder::new(Participant::named("Al"), Participant::named("Bob"));
        rec.record_touch_at(Side::Red, call(1, Action::SIMPLE), at(0));
        rec.rename(Side::Red, "Alice").unwrap();
        rec.record_touch_at(Side::Red, call(1, Action::SIMPLE), at(1));
        assert!(rec.rename(Side::Green, "").is_err());

        let names: Vec<_> = rec.touches().iter().map(|t| t.fencer_name.clone().unwrap()).collect();
        assert_eq!(names, vec!["Al", "Alice"]);
    }

    #[test]
    fn test_finalize_derives_winner_and_validates() {
        let mut rec = BoutRecorder::new(Participant::named("Alice"), Participant::named("Bob"));
        rec.record_touch_at(Side::Red, call(1, Action::SIMPLE), at(0));
        rec.record_touch_at(
            Side::Green,
            call(6, Action::Defense(DefenseDetail::ParryRiposte)),
            at(1),
        );
        rec.record_double_at(call(2, Action::SIMPLE), call(3, Action::SIMPLE), at(2));
        rec.record_touch_at(Side::Red, call(1, Action::SIMPLE), at(3));

        let m = rec.finalize_at(at(10));
        assert_eq!((m.red_score, m.green_score), (3, 2));
        assert_eq!(m.winner, Winner::Red);
        assert!(m.id > m.touches.last().unwrap().id);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_finalize_draw() {
        let rec = BoutRecorder::new(Participant::named("Alice"), Participant::named("Bob"));
        let m = rec.finalize_at(at(0));
        assert_eq!(m.winner, Winner::Draw);
        assert!(m.touches.is_empty());
    }
}
