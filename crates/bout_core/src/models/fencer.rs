//! Fencer identity.
//!
//! Display names are free text and can be retyped between bouts, so matches
//! may carry a stable [`FencerId`] next to the name. Records written before
//! ids existed only have the name.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FencerId(Uuid);

impl FencerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for FencerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FencerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for FencerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// One side of a match as it was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: Option<FencerId>,
    pub name: String,
}

impl Participant {
    pub fn named(name: impl Into<String>) -> Self {
        Self { id: None, name: name.into() }
    }

    pub fn with_id(id: FencerId, name: impl Into<String>) -> Self {
        Self { id: Some(id), name: name.into() }
    }

    pub fn matches(&self, selector: &FencerSelector) -> bool {
        match selector {
            FencerSelector::Name(name) => self.name == *name,
            FencerSelector::Id(id) => self.id == Some(*id),
        }
    }
}

/// Which fencer a statistics query is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FencerSelector {
    /// Exact display-name equality, the only key older records support.
    Name(String),
    Id(FencerId),
}

impl FencerSelector {
    pub fn name(name: impl Into<String>) -> Self {
        FencerSelector::Name(name.into())
    }
}

impl fmt::Display for FencerSelector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FencerSelector::Name(name) => write!(f, "{}", name),
            FencerSelector::Id(id) => write!(f, "#{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fencer {
    pub id: FencerId,
    pub name: String,
}

/// Arena of known fencers.
///
/// Ids never change once handed out; renaming only moves the name index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    fencers: Vec<Fencer>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fencers(fencers: Vec<Fencer>) -> Self {
        let mut roster = Self { fencers, by_name: HashMap::new() };
        roster.reindex();
        roster
    }

    /// Rebuilds the name index after deserialization.
    pub fn reindex(&mut self) {
        self.by_name.clear();
        for (idx, fencer) in self.fencers.iter().enumerate() {
            self.by_name.entry(fencer.name.clone()).or_insert(idx);
        }
    }

    /// Returns the id for `name`, registering a new fencer if the name is unknown.
    pub fn register(&mut self, name: &str) -> FencerId {
        if let Some(&idx) = self.by_name.get(name) {
            return self.fencers[idx].id;
        }
        let fencer = Fencer { id: FencerId::new(), name: name.to_string() };
        let id = fencer.id;
        self.by_name.insert(fencer.name.clone(), self.fencers.len());
        self.fencers.push(fencer);
        tracing::debug!(%id, name, "registered fencer");
        id
    }

    /// Gives `participant` its roster id, registering the name when it is new.
    ///
    /// A participant that already carries an id keeps it; an id the roster
    /// has never seen is added under the participant's name. Blank names
    /// stay anonymous.
    pub fn identify(&mut self, participant: &mut Participant) -> Option<FencerId> {
        if let Some(id) = participant.id {
            if self.get(id).is_none() {
                self.by_name.entry(participant.name.clone()).or_insert(self.fencers.len());
                self.fencers.push(Fencer { id, name: participant.name.clone() });
            }
            return Some(id);
        }
        if participant.name.is_empty() {
            return None;
        }
        let id = self.register(&participant.name);
        participant.id = Some(id);
        Some(id)
    }

    /// Renames a fencer. Returns false when the id is unknown or the new
    /// name already belongs to someone else.
    pub fn rename(&mut self, id: FencerId, new_name: &str) -> bool {
        let Some(idx) = self.fencers.iter().position(|f| f.id == id) else {
            return false;
        };
        if let Some(&owner) = self.by_name.get(new_name) {
            return owner == idx;
        }
        let old = std::mem::replace(&mut self.fencers[idx].name, new_name.to_string());
        self.by_name.remove(&old);
        self.by_name.insert(new_name.to_string(), idx);
        true
    }

    pub fn get(&self, id: FencerId) -> Option<&Fencer> {
        self.fencers.iter().find(|f| f.id == id)
    }

    pub fn lookup(&self, name: &str) -> Option<FencerId> {
        self.by_name.get(name).map(|&idx| self.fencers[idx].id)
    }

    pub fn participant(&self, id: FencerId) -> Option<Participant> {
        self.get(id).map(|f| Participant::with_id(f.id, f.name.clone()))
    }

    pub fn fencers(&self) -> &[Fencer] {
        &self.fencers
    }

    pub fn into_fencers(self) -> Vec<Fencer> {
        self.fencers
    }

    pub fn len(&self) -> usize {
        self.fencers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fencers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_stable_per_name() {
        let mut roster = Roster::new();
        let alice = roster.register("Alice");
        let bob = roster.register("Bob");
        assert_ne!(alice, bob);
        assert_eq!(roster.register("Alice"), alice);
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_rename_keeps_id() {
        let mut roster = Roster::new();
        let alice = roster.register("Alice");
        assert!(roster.rename(alice, "Alice Martin"));
        assert_eq!(roster.lookup("Alice Martin"), Some(alice));
        assert_eq!(roster.lookup("Alice"), None);
        assert_eq!(roster.get(alice).unwrap().name, "Alice Martin");
    }

    #[test]
    fn test_rename_refuses_taken_name() {
        let mut roster = Roster::new();
        let alice = roster.register("Alice");
        roster.register("Bob");
        assert!(!roster.rename(alice, "Bob"));
        assert!(!roster.rename(FencerId::new(), "Carol"));
    }

    #[test]
    fn test_reindex_after_deserialize() {
        let mut roster = Roster::new();
        let alice = roster.register("Alice");
        let json = serde_json::to_string(&roster).unwrap();

        let mut back: Roster = serde_json::from_str(&json).unwrap();
        assert_eq!(back.lookup("Alice"), None);
        back.reindex();
        assert_eq!(back.lookup("Alice"), Some(alice));
    }

    #[test]
    fn test_identify_assigns_and_keeps_ids() {
        let mut roster = Roster::new();
        let mut alice = Participant::named("Alice");
        let id = roster.identify(&mut alice).unwrap();
        assert_eq!(alice.id, Some(id));
        assert_eq!(roster.identify(&mut Participant::named("Alice")), Some(id));

        let carried = FencerId::new();
        let mut known = Participant::with_id(carried, "Bob");
        assert_eq!(roster.identify(&mut known), Some(carried));
        assert_eq!(roster.lookup("Bob"), Some(carried));

        let mut blank = Participant::named("");
        assert_eq!(roster.identify(&mut blank), None);
        assert_eq!(blank.id, None);
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_fencer_id_parses_from_display() {
        let id = FencerId::new();
        assert_eq!(id.to_string().parse::<FencerId>().unwrap(), id);
        assert!("not-a-uuid".parse::<FencerId>().is_err());
    }

    #[test]
    fn test_selector_matching() {
        let mut roster = Roster::new();
        let id = roster.register("Alice");
        let with_id = roster.participant(id).unwrap();
        let legacy = Participant::named("Alice");

        assert!(with_id.matches(&FencerSelector::name("Alice")));
        assert!(legacy.matches(&FencerSelector::name("Alice")));
        assert!(with_id.matches(&FencerSelector::Id(id)));
        assert!(!legacy.matches(&FencerSelector::Id(id)));
    }
}
