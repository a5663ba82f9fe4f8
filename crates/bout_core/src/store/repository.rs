use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::StoreError;
use crate::models::{Fencer, FencerId, Match, Roster};

/// Monotonic version of a store's content, bumped by every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(pub u64);

impl Revision {
    pub fn next(self) -> Revision {
        Revision(self.0 + 1)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreSnapshot {
    pub revision: Revision,
    pub matches: Vec<Match>,
    /// Fencers the store has handed ids to.
    pub fencers: Vec<Fencer>,
}

/// Owner of the persisted match list and of the fencer roster.
///
/// Writers that read a snapshot and later append should go through
/// [`MatchStore::append_match_at`] so a concurrent writer is detected
/// instead of silently overwritten. [`MatchStore::append_match`] assumes a
/// single writer.
///
/// Appending registers both participants in the roster, so stored matches
/// carry fencer ids even when the caller only knew the names.
pub trait MatchStore {
    fn snapshot(&self) -> Result<StoreSnapshot, StoreError>;

    fn list_matches(&self) -> Result<Vec<Match>, StoreError> {
        Ok(self.snapshot()?.matches)
    }

    fn revision(&self) -> Result<Revision, StoreError> {
        Ok(self.snapshot()?.revision)
    }

    fn fencers(&self) -> Result<Vec<Fencer>, StoreError> {
        Ok(self.snapshot()?.fencers)
    }

    fn append_match_at(&mut self, expected: Revision, m: Match) -> Result<Revision, StoreError>;

    fn append_match(&mut self, m: Match) -> Result<Revision, StoreError> {
        let current = self.revision()?;
        self.append_match_at(current, m)
    }

    /// Keeps only matches for which `keep` returns true; returns how many were removed.
    fn retain_matches(&mut self, keep: &dyn Fn(&Match) -> bool) -> Result<usize, StoreError>;

    fn clear_all(&mut self) -> Result<usize, StoreError> {
        self.retain_matches(&|_| false)
    }

    /// Changes a roster name. Stored matches keep the name they were
    /// recorded under; queries by id still find them.
    fn rename_fencer(&mut self, id: FencerId, name: &str) -> Result<bool, StoreError>;
}

/// Removes matches where either fencer's name, lower-cased, is one of `test_names`.
pub fn purge_test_matches<S: MatchStore + ?Sized>(
    store: &mut S,
    test_names: &[String],
) -> Result<usize, StoreError> {
    let names: Vec<String> = test_names.iter().map(|n| n.to_lowercase()).collect();
    let is_test = |name: &str| names.contains(&name.to_lowercase());
    let removed = store.retain_matches(&|m| !is_test(&m.red.name) && !is_test(&m.green.name))?;
    tracing::info!(removed, "purged test matches");
    Ok(removed)
}

/// Gives both participants of `m` a roster id.
pub(crate) fn identify_participants(roster: &mut Roster, m: &mut Match) {
    roster.identify(&mut m.red);
    roster.identify(&mut m.green);
}

/// Shared append check: revision must match and the id must be new.
pub(crate) fn check_append(
    current: Revision,
    expected: Revision,
    existing: &[Match],
    m: &Match,
) -> Result<(), StoreError> {
    if current != expected {
        return Err(StoreError::Conflict { expected, found: current });
    }
    if existing.iter().any(|e| e.id == m.id) {
        return Err(StoreError::DuplicateMatch { id: m.id });
    }
    Ok(())
}
