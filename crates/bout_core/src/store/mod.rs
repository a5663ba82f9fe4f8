// Match persistence
// Locked JSON file store with optimistic revisions, legacy import and compressed backups

pub mod archive;
pub mod error;
pub mod file;
pub mod lock;
pub mod memory;
pub mod migration;
pub mod record;
pub mod repository;

pub use archive::{
    decode_backup, encode_backup, read_archive, read_backup, write_archive, write_backup,
    BackupArchive,
};
pub use error::StoreError;
pub use file::{JsonFileStore, StoreDocument, DEFAULT_LOCK_TIMEOUT};
pub use lock::StoreLock;
pub use memory::MemoryStore;
pub use migration::{
    import_into, import_legacy, legacy_sources, merge_legacy, ImportReport, LegacyMerge,
    LEGACY_LIST_KEYS,
};
pub use record::{StoredMatch, StoredScore, StoredTouch};
pub use repository::{purge_test_matches, MatchStore, Revision, StoreSnapshot};

pub const STORE_VERSION: u32 = 1;
pub const BACKUP_VERSION: u32 = 1;
