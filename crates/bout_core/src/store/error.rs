use std::path::PathBuf;
use thiserror::Error;

use super::Revision;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialization error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("Deserialization error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("Decompression error")]
    Decompression,

    #[error("Corrupted data")]
    Corrupted,

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("Version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Store changed concurrently: expected revision {expected}, found {found}")]
    Conflict { expected: Revision, found: Revision },

    #[error("Match {id} is already stored")]
    DuplicateMatch { id: u64 },

    #[error("Store is locked by another writer: {}", path.display())]
    Locked { path: PathBuf },
}

impl StoreError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            StoreError::Io(_) => true,
            StoreError::Conflict { .. } => true, // Reload and retry
            StoreError::Locked { .. } => true,
            StoreError::VersionMismatch { .. } => false,
            StoreError::Corrupted => false,
            StoreError::ChecksumMismatch => false,
            StoreError::DuplicateMatch { .. } => false,
            _ => false,
        }
    }
}
