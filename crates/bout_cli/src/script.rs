//! Bout scripts: a recorded bout as a JSON list of scoring events.
//!
//! ```json
//! {
//!   "red": "Alice",
//!   "green": "Bob",
//!   "events": [
//!     { "type": "single", "side": "red", "zone": 2, "action": "SIMPLE" },
//!     { "type": "double", "red": { "zone": 1 }, "green": { "zone": 5, "action": "PARRY RIPOSTE" } },
//!     { "type": "undo" }
//!   ]
//! }
//! ```

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;

use bout_core::store::{MatchStore, Revision};
use bout_core::{Action, BoutConfig, BoutRecorder, Match, Participant, Side, TouchCall, Zone};

#[derive(Debug, Clone, Deserialize)]
pub struct BoutScript {
    #[serde(default)]
    pub red: String,
    #[serde(default)]
    pub green: String,
    /// Timestamp of the bout; now when absent.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScriptEvent {
    Single {
        side: Side,
        #[serde(default)]
        zone: Zone,
        #[serde(default)]
        action: Option<String>,
    },
    Double {
        #[serde(default)]
        red: ScriptCall,
        #[serde(default)]
        green: ScriptCall,
    },
    Undo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptCall {
    #[serde(default)]
    pub zone: Zone,
    #[serde(default)]
    pub action: Option<String>,
}

fn touch_call(zone: Zone, action: Option<&str>) -> Result<TouchCall> {
    let action = match action {
        Some(label) => Action::from_label(label).ok_or_else(|| anyhow!("unknown action '{label}'"))?,
        None => Action::SIMPLE,
    };
    Ok(TouchCall::new(zone, action))
}

impl BoutScript {
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse bout script")
    }

    /// Plays the events through a recorder and closes the bout.
    pub fn replay(&self, config: &BoutConfig) -> Result<Match> {
        let mut recorder = BoutRecorder::with_default_names(
            Participant::named(self.red.clone()),
            Participant::named(self.green.clone()),
            &config.default_red_name,
            &config.default_green_name,
        );
        let at = self.date.unwrap_or_else(Utc::now);

        for (index, event) in self.events.iter().enumerate() {
            match event {
                ScriptEvent::Single { side, zone, action } => {
                    let call = touch_call(*zone, action.as_deref())
                        .with_context(|| format!("event {index}"))?;
                    recorder.record_touch_at(*side, call, at);
                }
                ScriptEvent::Double { red, green } => {
                    let red = touch_call(red.zone, red.action.as_deref())
                        .with_context(|| format!("event {index}, red"))?;
                    let green = touch_call(green.zone, green.action.as_deref())
                        .with_context(|| format!("event {index}, green"))?;
                    recorder.record_double_at(red, green, at);
                }
                ScriptEvent::Undo => {
                    recorder.undo_last().with_context(|| format!("event {index}"))?;
                }
            }
        }

        let m = recorder.finalize_at(at);
        m.validate().context("Recorded bout is inconsistent")?;
        Ok(m)
    }
}

/// Replays the script at `path` and appends the bout to `store`.
pub fn record_file<S: MatchStore + ?Sized>(
    path: &Path,
    config: &BoutConfig,
    store: &mut S,
) -> Result<(Match, Revision)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read bout script {}", path.display()))?;
    let m = BoutScript::parse(&content)?.replay(config)?;
    let revision = store.append_match(m.clone()).context("Failed to store match")?;
    tracing::info!(match_id = m.id, %revision, script = ?path, "bout recorded");
    Ok((m, revision))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bout_core::store::JsonFileStore;
    use bout_core::{ActionCode, FencerSelector, Winner};
    use tempfile::TempDir;

    const SCRIPT: &str = r#"{
        "red": "Alice",
        "green": "",
        "date": "2024-03-01T10:00:00Z",
        "events": [
            { "type": "single", "side": "red", "zone": 2, "action": "SIMPLE" },
            { "type": "single", "side": "green", "zone": 4, "action": "COUNTER ATTACK" },
            { "type": "double", "red": { "zone": 1 }, "green": { "zone": 5, "action": "PARRY RIPOSTE" } },
            { "type": "single", "side": "red", "zone": 3, "action": "REMISE CA" },
            { "type": "undo" },
            { "type": "single", "side": "red", "zone": 6, "action": "COMPOUND" }
        ]
    }"#;

    #[test]
    fn test_replay() {
        let script = BoutScript::parse(SCRIPT).unwrap();
        let m = script.replay(&BoutConfig::default()).unwrap();

        assert_eq!(m.red.name, "Alice");
        assert_eq!(m.green.name, "Vert");
        assert_eq!((m.red_score, m.green_score), (3, 2));
        assert_eq!(m.winner, Winner::Red);
        assert_eq!(m.touches.len(), 5);
        assert_eq!(m.touches[4].action.code(), ActionCode::AC);
        assert_eq!(m.touches[3].action.code(), ActionCode::PR);
    }

    #[test]
    fn test_unknown_action_fails() {
        let script = BoutScript::parse(
            r#"{ "events": [{ "type": "single", "side": "red", "action": "FLICK" }] }"#,
        )
        .unwrap();
        let err = script.replay(&BoutConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("unknown action 'FLICK'"));
    }

    #[test]
    fn test_undo_on_empty_bout_fails() {
        let script = BoutScript::parse(r#"{ "events": [{ "type": "undo" }] }"#).unwrap();
        assert!(script.replay(&BoutConfig::default()).is_err());
    }

    #[test]
    fn test_out_of_range_zone_rejected() {
        assert!(BoutScript::parse(
            r#"{ "events": [{ "type": "single", "side": "red", "zone": 7 }] }"#
        )
        .is_err());
    }

    #[test]
    fn test_record_file_into_json_store() {
        let dir = TempDir::new().unwrap();
        let script_path = dir.path().join("bout.json");
        std::fs::write(&script_path, SCRIPT).unwrap();
        let mut store = JsonFileStore::new(dir.path().join("store").join("matches.json"));

        let (m, revision) = record_file(&script_path, &BoutConfig::default(), &mut store).unwrap();
        assert_eq!(revision, Revision(1));
        assert_eq!((m.red_score, m.green_score), (3, 2));

        let stored = store.list_matches().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, m.id);
        assert_eq!(stored[0].touches, m.touches);

        let fencers = store.fencers().unwrap();
        let alice = fencers.iter().find(|f| f.name == "Alice").unwrap();
        assert!(fencers.iter().any(|f| f.name == "Vert"));
        assert!(stored[0].involves(&FencerSelector::Id(alice.id)));

        // Replaying the same bout gives the same id, which the store refuses.
        assert!(record_file(&script_path, &BoutConfig::default(), &mut store).is_err());
        assert_eq!(store.list_matches().unwrap().len(), 1);
    }

    #[test]
    fn test_record_file_missing_script() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("matches.json"));
        let err = record_file(&dir.path().join("absent.json"), &BoutConfig::default(), &mut store)
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read bout script"));
        assert!(!dir.path().join("matches.json").exists());
    }
}
