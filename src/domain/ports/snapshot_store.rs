//! Driven port for full-state database snapshots.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::Error;

/// Reason tag embedded in snapshot file names, distinguishing operator
/// backups from pre-deletion safety copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotTag {
    /// Operator-requested backup.
    Manual,
    /// Safety copy taken immediately before a delete-all.
    BeforeDelete,
}

impl SnapshotTag {
    /// File-name-safe form of the tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::BeforeDelete => "before-delete",
        }
    }
}

impl std::fmt::Display for SnapshotTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Port for taking durable full copies of the persisted state.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Copy the entire current persisted state to a fresh location whose
    /// name embeds a timestamp and `tag`.
    ///
    /// The copy must be complete and durable before this returns. Callers
    /// performing destructive work must abort when this fails rather than
    /// proceed without a backup.
    async fn snapshot(&self, tag: SnapshotTag) -> Result<PathBuf, Error>;
}
