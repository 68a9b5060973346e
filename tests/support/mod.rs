use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use chrono::Utc;
use prio::store::Store;
use prio::task::TaskId;
use tempfile::TempDir;

/// A throwaway home for one test: its own database and config file.
///
/// Every command built by [`prio_cmd`] is pinned to both, so tests never
/// touch the developer's real config or data directories.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        let home = Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        };
        home.write_config("");
        home
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("prio.db")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("prio.toml")
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.config_path();
        fs::write(&path, contents).expect("failed to write config");
        path
    }

    pub fn open_store(&self) -> Store {
        Store::open(&self.db_path()).expect("failed to open store")
    }

    /// Seed active tasks in the given priority order.
    pub fn seed_active(&self, summaries: &[&str]) -> Vec<TaskId> {
        let mut store = self.open_store();
        let now = Utc::now();
        let owned: Vec<String> = summaries.iter().map(|s| s.to_string()).collect();
        store
            .insert_batch(&owned, now, false)
            .expect("failed to seed tasks")
    }
}

pub fn prio_cmd(home: &TestHome) -> Command {
    let mut cmd = Command::cargo_bin("prio").expect("binary");
    cmd.arg("--db-path").arg(home.db_path());
    cmd.arg("--config").arg(home.config_path());
    cmd
}
