use crate::{
    domain::{Board, BoardFilter, BoardId, Card, Stack},
    error::Result,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod file_snapshot;

pub use file_snapshot::FileSnapshotStore;

/// Serializable copy of the local cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub boards: Vec<Board>,
    pub stacks: Vec<Stack>,
    pub cards: Vec<Card>,
    #[serde(default)]
    pub current_board: Option<BoardId>,
    #[serde(default)]
    pub filter: BoardFilter,
}

/// Persistence for cache snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Prepares the backing location
    async fn initialize(&self) -> Result<()>;

    /// Overwrites the stored snapshot
    async fn save(&self, snapshot: &CacheSnapshot) -> Result<()>;

    /// Loads the stored snapshot
    async fn load(&self) -> Result<CacheSnapshot>;

    /// Deletes the stored snapshot, if any
    async fn clear(&self) -> Result<()>;

    /// Checks whether a snapshot has been saved
    async fn is_initialized(&self) -> bool;
}
