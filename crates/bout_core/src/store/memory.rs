use super::error::StoreError;
use super::repository::{check_append, identify_participants, MatchStore, Revision, StoreSnapshot};
use crate::models::{FencerId, Match, Roster};

/// Match store held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    revision: Revision,
    matches: Vec<Match>,
    roster: Roster,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_matches(matches: Vec<Match>) -> Self {
        Self { revision: Revision::default(), matches, roster: Roster::new() }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }
}

impl MatchStore for MemoryStore {
    fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        Ok(StoreSnapshot {
            revision: self.revision,
            matches: self.matches.clone(),
            fencers: self.roster.fencers().to_vec(),
        })
    }

    fn revision(&self) -> Result<Revision, StoreError> {
        Ok(self.revision)
    }

    fn append_match_at(&mut self, expected: Revision, mut m: Match) -> Result<Revision, StoreError> {
        check_append(self.revision, expected, &self.matches, &m)?;
        identify_participants(&mut self.roster, &mut m);
        self.matches.push(m);
        self.revision = self.revision.next();
        Ok(self.revision)
    }

    fn retain_matches(&mut self, keep: &dyn Fn(&Match) -> bool) -> Result<usize, StoreError> {
        let before = self.matches.len();
        self.matches.retain(|m| keep(m));
        let removed = before - self.matches.len();
        if removed > 0 {
            self.revision = self.revision.next();
        }
        Ok(removed)
    }

    fn rename_fencer(&mut self, id: FencerId, name: &str) -> Result<bool, StoreError> {
        let renamed = self.roster.rename(id, name);
        if renamed {
            self.revision = self.revision.next();
        }
        Ok(renamed)
    }
}
