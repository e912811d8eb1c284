use crate::{
    config::StoreConfig,
    error::{DeckError, Result},
    snapshot::{CacheSnapshot, SnapshotStore},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Snapshot store writing JSON into a directory
pub struct FileSnapshotStore {
    root_path: PathBuf,
}

impl FileSnapshotStore {
    const SNAPSHOT_FILE: &'static str = "cache.json";

    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root_path: root.as_ref().to_path_buf(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.snapshot_dir)
    }

    fn snapshot_file(&self) -> PathBuf {
        self.root_path.join(Self::SNAPSHOT_FILE)
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await
    }

    async fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(snapshot)?;
        // Write-then-rename so a crash never leaves a truncated cache
        let tmp = self.root_path.join(format!("{}.tmp", Self::SNAPSHOT_FILE));
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, self.snapshot_file()).await?;

        debug!(
            boards = snapshot.boards.len(),
            stacks = snapshot.stacks.len(),
            cards = snapshot.cards.len(),
            "saved cache snapshot"
        );
        Ok(())
    }

    async fn load(&self) -> Result<CacheSnapshot> {
        let file_path = self.snapshot_file();

        if !file_path.exists() {
            return Err(DeckError::SnapshotNotFound);
        }

        let contents = fs::read_to_string(&file_path).await?;
        let snapshot: CacheSnapshot = serde_json::from_str(&contents)?;

        Ok(snapshot)
    }

    async fn clear(&self) -> Result<()> {
        let file_path = self.snapshot_file();
        if file_path.exists() {
            fs::remove_file(file_path).await?;
        }
        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.snapshot_file().exists()
    }
}
