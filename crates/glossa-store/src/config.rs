use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Each copied key binds two parameters; SQLite allows 32766 per statement.
const MAX_COPY_BATCH: usize = 10_000;

/// Configuration for [`crate::SqliteStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    /// How long a connection waits on a locked database before failing.
    pub busy_timeout_ms: u64,
    /// Number of keys copied per chunk when a branch is forked. Chunks share
    /// the fork's single transaction.
    pub copy_batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
            copy_batch_size: 500,
        }
    }
}

impl StoreConfig {
    /// An in-memory configuration with default tuning.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A file-backed configuration with default tuning.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Batch size clamped to `1..=10_000` keys.
    pub fn effective_batch_size(&self) -> usize {
        self.copy_batch_size.clamp(1, MAX_COPY_BATCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = StoreConfig::default();
        assert!(c.path.is_none());
        assert_eq!(c.busy_timeout(), Duration::from_secs(5));
        assert_eq!(c.copy_batch_size, 500);
    }

    #[test]
    fn zero_batch_is_clamped() {
        let c = StoreConfig {
            copy_batch_size: 0,
            ..StoreConfig::default()
        };
        assert_eq!(c.effective_batch_size(), 1);

        let huge = StoreConfig {
            copy_batch_size: 1_000_000,
            ..StoreConfig::default()
        };
        assert_eq!(huge.effective_batch_size(), MAX_COPY_BATCH);
    }
}
