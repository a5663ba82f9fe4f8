use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};

use super::error::StoreError;
use super::record::StoredMatch;
use super::repository::{Revision, StoreSnapshot};
use super::BACKUP_VERSION;
use crate::models::Fencer;

const CHECKSUM_LEN: usize = 32;

/// Backup of a whole store
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BackupArchive {
    /// Archive format version
    pub version: u32,

    pub created_at: DateTime<Utc>,

    /// Store revision at the time of the backup
    pub revision: Revision,

    /// Records exactly as the store held them
    pub matches: Vec<StoredMatch>,

    #[serde(default)]
    pub fencers: Vec<Fencer>,
}

impl BackupArchive {
    pub fn from_snapshot(snapshot: &StoreSnapshot, created_at: DateTime<Utc>) -> Self {
        Self {
            version: BACKUP_VERSION,
            created_at,
            revision: snapshot.revision,
            matches: snapshot.matches.iter().map(StoredMatch::encode).collect(),
            fencers: snapshot.fencers.clone(),
        }
    }

    pub fn into_snapshot(self) -> StoreSnapshot {
        StoreSnapshot {
            revision: self.revision,
            matches: self.matches.iter().map(StoredMatch::decode).collect(),
            fencers: self.fencers,
        }
    }
}

/// Serialize and compress a backup
pub fn encode_backup(archive: &BackupArchive) -> Result<Vec<u8>, StoreError> {
    // 1. MessagePack with field names
    let msgpack = to_vec_named(archive)?;

    // 2. LZ4, size prepended
    let compressed = compress_prepend_size(&msgpack);

    // 3. SHA256 trailer
    let checksum = Sha256::digest(&compressed);

    let mut result = compressed;
    result.extend_from_slice(&checksum);
    Ok(result)
}

/// Verify, decompress and deserialize a backup
pub fn decode_backup(bytes: &[u8]) -> Result<BackupArchive, StoreError> {
    // Size header + checksum
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(StoreError::Corrupted);
    }

    let (payload, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    if Sha256::digest(payload).as_slice() != checksum {
        return Err(StoreError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| StoreError::Decompression)?;
    let archive: BackupArchive = from_slice(&msgpack)?;

    if archive.version > BACKUP_VERSION {
        return Err(StoreError::VersionMismatch { found: archive.version, expected: BACKUP_VERSION });
    }
    Ok(archive)
}

pub fn write_archive(path: &Path, archive: &BackupArchive) -> Result<usize, StoreError> {
    let bytes = encode_backup(archive)?;
    std::fs::write(path, &bytes)?;
    tracing::info!(
        path = ?path,
        bytes = bytes.len(),
        matches = archive.matches.len(),
        revision = %archive.revision,
        "backup written"
    );
    Ok(bytes.len())
}

pub fn read_archive(path: &Path) -> Result<BackupArchive, StoreError> {
    let bytes = std::fs::read(path)?;
    let archive = decode_backup(&bytes)?;
    tracing::info!(path = ?path, matches = archive.matches.len(), created_at = %archive.created_at, "backup read");
    Ok(archive)
}

pub fn write_backup(path: &Path, snapshot: &StoreSnapshot) -> Result<usize, StoreError> {
    write_archive(path, &BackupArchive::from_snapshot(snapshot, Utc::now()))
}

pub fn read_backup(path: &Path) -> Result<StoreSnapshot, StoreError> {
    Ok(read_archive(path)?.into_snapshot())
}
