use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use super::LocalStore;

/// Storage file name in cache directory
const STORE_FILE: &str = "local_storage.json";

/// Local store persisted as a single pretty-printed JSON object.
///
/// Every write rewrites the whole file. The mutex serializes writers inside
/// one process only.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        Self::with_file_name(cache_dir, STORE_FILE)
    }

    /// Store in `file_name` under `cache_dir` instead of `local_storage.json`
    pub fn with_file_name(cache_dir: PathBuf, file_name: &str) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir).with_context(|| {
            format!("Failed to create cache directory {}", cache_dir.display())
        })?;
        Ok(Self {
            path: cache_dir.join(file_name),
            lock: Mutex::new(()),
        })
    }

    fn store_path(&self) -> PathBuf {
        self.path.clone()
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let path = self.store_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents =
            std::fs::read_to_string(&path).context("Failed to read local storage file")?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).context("Failed to parse local storage file")
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(self.store_path(), contents)
            .context("Failed to write local storage file")?;
        Ok(())
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("Local storage lock poisoned"))?;
        let mut entries = self.load()?;
        f(&mut entries);
        self.save(&entries)
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("Local storage lock poisoned"))?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!(key, "Writing local storage entry");
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        debug!(key, "Removing local storage entry");
        self.modify(|entries| {
            entries.remove(key);
        })
    }
}
