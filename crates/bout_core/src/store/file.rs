use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{rename, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

use super::archive::BackupArchive;
use super::error::StoreError;
use super::lock::StoreLock;
use super::record::StoredMatch;
use super::repository::{check_append, identify_participants, MatchStore, Revision, StoreSnapshot};
use super::STORE_VERSION;
use crate::models::{Fencer, FencerId, Match, Roster};

/// How long a writer waits for another one to release the store.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// On-disk document. Older files are a bare array of matches.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct StoreDocument {
    pub version: u32,
    pub revision: Revision,
    pub matches: Vec<StoredMatch>,
    #[serde(default)]
    pub fencers: Vec<Fencer>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OnDisk {
    Document(StoreDocument),
    Legacy(Vec<StoredMatch>),
}

/// Match store backed by a single JSON file.
///
/// Every call re-reads the file. Mutations hold a [`StoreLock`] from the
/// read to the rename of the new content, so two processes sharing the file
/// never lose each other's writes; an append made against an older revision
/// fails with [`StoreError::Conflict`].
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_timeout: Duration,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock_timeout: DEFAULT_LOCK_TIMEOUT }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_document(&self) -> Result<StoreDocument, StoreError> {
        if !self.path.exists() {
            return Ok(StoreDocument { version: STORE_VERSION, ..Default::default() });
        }
        let bytes = std::fs::read(&self.path)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(StoreDocument { version: STORE_VERSION, ..Default::default() });
        }

        let document = match serde_json::from_slice::<OnDisk>(&bytes)? {
            OnDisk::Document(doc) => doc,
            OnDisk::Legacy(matches) => {
                tracing::info!(count = matches.len(), path = ?self.path, "read legacy match array");
                StoreDocument { version: STORE_VERSION, matches, ..Default::default() }
            }
        };
        if document.version > STORE_VERSION {
            return Err(StoreError::VersionMismatch {
                found: document.version,
                expected: STORE_VERSION,
            });
        }
        Ok(document)
    }

    fn lock(&self) -> Result<StoreLock, StoreError> {
        StoreLock::acquire(&self.path, self.lock_timeout)
    }

    /// Caller must hold the store lock.
    fn write_document(&self, document: &StoreDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_vec_pretty(document)?;

        // Atomic save: write to a temp file of our own, then rename
        let temp_path = self.temp_path();
        let written = (|| -> Result<(), StoreError> {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.flush()?;
            file.sync_all()?;
            rename(&temp_path, &self.path)?;
            Ok(())
        })();
        if written.is_err() {
            let _ = std::fs::remove_file(&temp_path);
        }
        written?;

        tracing::debug!(bytes = data.len(), revision = %document.revision, path = ?self.path, "store written");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self.path.file_name().and_then(|n| n.to_str()).unwrap_or("store");
        self.path.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
    }

    fn replace_content(
        &mut self,
        revision: Revision,
        matches: Vec<StoredMatch>,
        fencers: Vec<Fencer>,
    ) -> Result<Revision, StoreError> {
        let _lock = self.lock()?;
        let current = self.load_document()?.revision;
        let document = StoreDocument {
            version: STORE_VERSION,
            revision: current.max(revision).next(),
            matches,
            fencers,
        };
        self.write_document(&document)?;
        tracing::info!(matches = document.matches.len(), revision = %document.revision, "store restored");
        Ok(document.revision)
    }

    /// Replaces the file content with `snapshot`.
    ///
    /// The new revision is past both the current one and the snapshot's, so
    /// writers holding an older revision still conflict.
    pub fn restore(&mut self, snapshot: &StoreSnapshot) -> Result<Revision, StoreError> {
        let matches = snapshot.matches.iter().map(StoredMatch::encode).collect();
        self.replace_content(snapshot.revision, matches, snapshot.fencers.clone())
    }

    /// Backup of the records exactly as stored, unknown fields included.
    pub fn archive(&self) -> Result<BackupArchive, StoreError> {
        let document = self.load_document()?;
        Ok(BackupArchive {
            version: super::BACKUP_VERSION,
            created_at: Utc::now(),
            revision: document.revision,
            matches: document.matches,
            fencers: document.fencers,
        })
    }

    /// Like [`JsonFileStore::restore`], keeping the archived records as they are.
    pub fn restore_archive(&mut self, archive: BackupArchive) -> Result<Revision, StoreError> {
        self.replace_content(archive.revision, archive.matches, archive.fencers)
    }
}

impl MatchStore for JsonFileStore {
    fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        let document = self.load_document()?;
        Ok(StoreSnapshot {
            revision: document.revision,
            matches: document.matches.iter().map(StoredMatch::decode).collect(),
            fencers: document.fencers,
        })
    }

    fn revision(&self) -> Result<Revision, StoreError> {
        Ok(self.load_document()?.revision)
    }

    fn append_match_at(&mut self, expected: Revision, mut m: Match) -> Result<Revision, StoreError> {
        let _lock = self.lock()?;
        let mut document = self.load_document()?;
        let existing: Vec<Match> = document.matches.iter().map(StoredMatch::decode).collect();
        check_append(document.revision, expected, &existing, &m)?;

        let mut roster = Roster::from_fencers(std::mem::take(&mut document.fencers));
        identify_participants(&mut roster, &mut m);
        document.fencers = roster.into_fencers();

        document.matches.push(StoredMatch::encode(&m));
        document.revision = document.revision.next();
        document.version = STORE_VERSION;
        self.write_document(&document)?;

        tracing::info!(match_id = m.id, revision = %document.revision, "match appended");
        Ok(document.revision)
    }

    fn retain_matches(&mut self, keep: &dyn Fn(&Match) -> bool) -> Result<usize, StoreError> {
        let _lock = self.lock()?;
        let mut document = self.load_document()?;
        let before = document.matches.len();
        document.matches.retain(|stored| keep(&stored.decode()));
        let removed = before - document.matches.len();
        if removed > 0 {
            document.revision = document.revision.next();
            document.version = STORE_VERSION;
            self.write_document(&document)?;
            tracing::info!(removed, revision = %document.revision, "matches removed");
        }
        Ok(removed)
    }

    fn rename_fencer(&mut self, id: FencerId, name: &str) -> Result<bool, StoreError> {
        let _lock = self.lock()?;
        let mut document = self.load_document()?;
        let mut roster = Roster::from_fencers(std::mem::take(&mut document.fencers));
        if !roster.rename(id, name) {
            return Ok(false);
        }
        document.fencers = roster.into_fencers();
        document.revision = document.revision.next();
        document.version = STORE_VERSION;
        self.write_document(&document)?;
        tracing::info!(%id, name, revision = %document.revision, "fencer renamed");
        Ok(true)
    }
}
