//! File-based ledger snapshots
//!
//! State lives in memory while the process runs; a snapshot is written on
//! the persistence schedule and reloaded on startup. Written twice per
//! save: JSON for operator inspection, bincode for fast load.

use std::fs;
use std::path::{Path, PathBuf};

use vault_core::{EngineError, Result};

use crate::memory::LedgerState;

const SNAPSHOT_NAME: &str = "ledger";

pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data_dir = path.as_ref().to_path_buf();
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)
                .map_err(|e| EngineError::StoreUnavailable(format!("create data dir: {}", e)))?;
        }
        Ok(Self { data_dir })
    }

    fn json_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", SNAPSHOT_NAME))
    }

    fn bin_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.bin", SNAPSHOT_NAME))
    }

    pub fn save(&self, state: &LedgerState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| EngineError::StoreUnavailable(format!("encode snapshot: {}", e)))?;
        fs::write(self.json_path(), json)
            .map_err(|e| EngineError::StoreUnavailable(format!("write snapshot: {}", e)))?;

        let bin = bincode::serialize(state)
            .map_err(|e| EngineError::StoreUnavailable(format!("encode snapshot: {}", e)))?;
        fs::write(self.bin_path(), bin)
            .map_err(|e| EngineError::StoreUnavailable(format!("write snapshot: {}", e)))?;
        Ok(())
    }

    /// Load the latest snapshot; bincode first, JSON as fallback
    pub fn load(&self) -> Result<LedgerState> {
        let bin_path = self.bin_path();
        if bin_path.exists() {
            let data = fs::read(&bin_path)
                .map_err(|e| EngineError::StoreUnavailable(format!("read snapshot: {}", e)))?;
            return bincode::deserialize(&data)
                .map_err(|e| EngineError::StoreUnavailable(format!("decode snapshot: {}", e)));
        }

        let json_path = self.json_path();
        if json_path.exists() {
            let data = fs::read_to_string(&json_path)
                .map_err(|e| EngineError::StoreUnavailable(format!("read snapshot: {}", e)))?;
            return serde_json::from_str(&data)
                .map_err(|e| EngineError::StoreUnavailable(format!("decode snapshot: {}", e)));
        }

        Err(EngineError::StoreUnavailable(format!(
            "no snapshot in {}",
            self.data_dir.display()
        )))
    }

    pub fn exists(&self) -> bool {
        self.bin_path().exists() || self.json_path().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InvestmentStore, MemoryStore};
    use chrono::Utc;
    use tempfile::tempdir;
    use vault_core::{Investment, VaultTier};

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let snapshots = SnapshotStore::open(dir.path()).unwrap();

        let store = MemoryStore::new();
        let inv = Investment::new(
            "user1".to_string(),
            VaultTier::Starter,
            2_500.0,
            6.0,
            400.0,
            125.0,
            Utc::now(),
            365,
        );
        let id = inv.id.clone();
        store.insert_investment(inv).unwrap();

        snapshots.save(&store.state()).unwrap();
        assert!(snapshots.exists());

        let restored = MemoryStore::from_state(snapshots.load().unwrap());
        let loaded = restored.investment(&id).unwrap();
        assert_eq!(loaded.principal_usd, 2_500.0);
        assert_eq!(loaded.duration_days, 365);
    }

    #[test]
    fn test_load_without_snapshot_fails_closed() {
        let dir = tempdir().unwrap();
        let snapshots = SnapshotStore::open(dir.path()).unwrap();
        assert!(!snapshots.exists());
        assert!(snapshots.load().is_err());
    }
}
