//! Persisted record shape.
//!
//! Matches are stored as the flat JSON objects the scoring pages have always
//! written (`redFencer`, `touchHistory`, ...). Nothing ever enforced a schema
//! on that data, so decoding into the typed model fills gaps with defaults
//! instead of rejecting a record. Fields this crate does not know are kept in
//! `extra` and written back unchanged.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{
    ActionCategory, FencerId, Match, Participant, RecordedAction, ScoreLine, Side, Touch,
    TouchKind, Winner, Zone,
};

const DEFAULT_ACTION_LABEL: &str = "SIMPLE";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red_fencer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green_fencer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red_fencer_id: Option<FencerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green_fencer_id: Option<FencerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red_score: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green_score: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    #[serde(default)]
    pub touch_history: Option<Vec<StoredTouch>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredTouch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Colour tag on double touches, scorer name on single touches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fencer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fencer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_after: Option<StoredScore>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_partner: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StoredScore {
    #[serde(default)]
    pub red: Option<Value>,
    #[serde(default)]
    pub green: Option<Value>,
}

impl StoredMatch {
    /// The record's own id, if it carries a usable one.
    pub fn stored_id(&self) -> Option<u64> {
        self.id.as_ref().and_then(int_value).filter(|n| *n >= 0).map(|n| n as u64)
    }

    /// Id used for the decoded match; 0 when the record has none.
    pub fn id(&self) -> u64 {
        self.stored_id().unwrap_or(0)
    }

    pub fn decode(&self) -> Match {
        let id = self.id();
        let red_score = score_value(self.red_score.as_ref());
        let green_score = score_value(self.green_score.as_ref());

        let winner = match self.winner.as_deref() {
            Some("red") => Winner::Red,
            Some("green") => Winner::Green,
            Some("draw") => Winner::Draw,
            other => {
                tracing::debug!(match_id = id, winner = ?other, "winner missing, derived from scores");
                Winner::from_scores(red_score, green_score)
            }
        };

        let touches = self
            .touch_history
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|t| t.decode(id))
            .collect();

        Match {
            id,
            date: parse_timestamp(self.date.as_deref()),
            red: Participant { id: self.red_fencer_id, name: self.red_fencer.clone().unwrap_or_default() },
            green: Participant {
                id: self.green_fencer_id,
                name: self.green_fencer.clone().unwrap_or_default(),
            },
            red_score,
            green_score,
            winner,
            touches,
        }
    }

    pub fn encode(m: &Match) -> Self {
        Self {
            id: Some(Value::from(m.id)),
            date: Some(format_timestamp(m.date)),
            red_fencer: Some(m.red.name.clone()),
            green_fencer: Some(m.green.name.clone()),
            red_fencer_id: m.red.id,
            green_fencer_id: m.green.id,
            red_score: Some(Value::from(m.red_score)),
            green_score: Some(Value::from(m.green_score)),
            winner: Some(
                match m.winner {
                    Winner::Red => "red",
                    Winner::Green => "green",
                    Winner::Draw => "draw",
                }
                .to_string(),
            ),
            touch_history: Some(m.touches.iter().map(StoredTouch::encode).collect()),
            extra: Map::new(),
        }
    }
}

impl StoredTouch {
    pub fn decode(&self, match_id: u64) -> Touch {
        let id = self.id.as_ref().and_then(int_value).map(|n| n.max(0) as u64).unwrap_or(0);

        let fencer = self.fencer.as_deref().filter(|s| !s.is_empty());
        let side = fencer
            .and_then(Side::from_tag)
            .or_else(|| self.color.as_deref().and_then(Side::from_tag));
        let fencer_name = self
            .fencer_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(fencer.filter(|f| Side::from_tag(f).is_none()))
            .map(str::to_string);

        let label = [self.action_detail.as_deref(), self.action.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ACTION_LABEL);
        let action = RecordedAction::from_label(label);
        if let (Some(category), RecordedAction::Classified(detail)) =
            (self.action_type.as_deref().and_then(ActionCategory::from_label), &action)
        {
            if !category.admits(*detail) {
                tracing::warn!(
                    match_id,
                    touch_id = id,
                    category = category.label(),
                    detail = detail.label(),
                    "action detail outside its category"
                );
            }
        }

        let zone = match self.zone.as_ref().and_then(int_value) {
            Some(n) if (1..=6).contains(&n) => Zone::new(n as u8).unwrap_or_default(),
            raw => {
                tracing::debug!(match_id, touch_id = id, zone = ?raw, "zone missing or out of range, using 1");
                Zone::default()
            }
        };

        let score_after = self
            .score_after
            .as_ref()
            .map(|s| ScoreLine::new(score_value(s.red.as_ref()), score_value(s.green.as_ref())))
            .unwrap_or_default();

        let kind = match self.kind.as_deref() {
            Some("double") => self
                .double_partner
                .as_deref()
                .and_then(Side::from_tag)
                .or(side.map(Side::opponent))
                .map(|partner| TouchKind::Double { partner })
                .unwrap_or(TouchKind::Single),
            _ => TouchKind::Single,
        };

        Touch {
            id,
            timestamp: parse_timestamp(self.timestamp.as_deref()),
            side,
            fencer_name,
            zone,
            action,
            score_after,
            kind,
        }
    }

    pub fn encode(t: &Touch) -> Self {
        let tag = t.side.map(|s| s.as_str().to_string());
        let label = t.action.label().to_string();
        let fencer = match t.kind {
            TouchKind::Double { .. } => tag.clone().or_else(|| t.fencer_name.clone()),
            TouchKind::Single => t.fencer_name.clone().or_else(|| tag.clone()),
        };
        Self {
            id: Some(Value::from(t.id)),
            timestamp: Some(format_timestamp(t.timestamp)),
            fencer,
            color: tag,
            fencer_name: t.fencer_name.clone(),
            zone: Some(Value::from(t.zone.get())),
            action: Some(label.clone()),
            action_type: t.action.category().map(|c| c.label().to_string()),
            action_detail: Some(label),
            score_after: Some(StoredScore {
                red: Some(Value::from(t.score_after.red)),
                green: Some(Value::from(t.score_after.green)),
            }),
            kind: Some(if t.kind.is_double() { "double" } else { "single" }.to_string()),
            double_partner: match t.kind {
                TouchKind::Double { partner } => Some(partner.as_str().to_string()),
                TouchKind::Single => None,
            },
            extra: Map::new(),
        }
    }
}

/// Integer reading of a loosely typed JSON field: numbers are truncated,
/// strings are read up to the first non-digit.
fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn score_value(value: Option<&Value>) -> u32 {
    value.and_then(int_value).map(|n| n.clamp(0, u32::MAX as i64) as u32).unwrap_or(0)
}

fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
