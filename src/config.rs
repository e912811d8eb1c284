use crate::{
    domain::BoardFilter,
    error::{DeckError, Result},
    reconcile::NoticeQueue,
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Client-side settings for the deck store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Where cache snapshots are written
    pub snapshot_dir: PathBuf,
    /// Maximum number of undismissed notices kept
    pub notice_capacity: usize,
    /// Board filter applied when the store is created
    pub default_filter: BoardFilter,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from(".deck"),
            notice_capacity: NoticeQueue::DEFAULT_CAPACITY,
            default_filter: BoardFilter::All,
        }
    }
}

impl StoreConfig {
    const ENV_SNAPSHOT_DIR: &'static str = "DECK_SNAPSHOT_DIR";
    const ENV_NOTICE_CAPACITY: &'static str = "DECK_NOTICE_CAPACITY";
    const ENV_DEFAULT_FILTER: &'static str = "DECK_DEFAULT_FILTER";

    /// Reads a TOML file, then applies `DECK_*` environment overrides
    ///
    /// A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = match fs::read_to_string(path.as_ref()) {
            Ok(raw) => Self::from_toml(&raw)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(err.into()),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|err| DeckError::ConfigError(err.to_string()))
    }

    /// Overrides fields from a key lookup (the process environment in [`load`](Self::load))
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(Self::ENV_SNAPSHOT_DIR) {
            self.snapshot_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(Self::ENV_NOTICE_CAPACITY) {
            self.notice_capacity = raw.trim().parse().map_err(|_| {
                DeckError::ConfigError(format!(
                    "{} must be a non-negative integer, got '{}'",
                    Self::ENV_NOTICE_CAPACITY,
                    raw
                ))
            })?;
        }
        if let Some(raw) = lookup(Self::ENV_DEFAULT_FILTER) {
            self.default_filter = BoardFilter::from_str(&raw).map_err(DeckError::ConfigError)?;
        }
        Ok(())
    }
}
