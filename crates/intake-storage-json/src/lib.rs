//! Filesystem-backed JSON persistence: the address-component cache and
//! saved intake drafts.

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use intake_core::{AddressCache, CoreError};
use intake_domain::TransactionFormData;
use tracing::debug;

const CACHE_FILE: &str = "address_cache.json";
const TMP_SUFFIX: &str = "tmp";

/// Address cache persisted as one JSON object of `key -> JSON text`.
pub struct JsonAddressCache {
    path: PathBuf,
    // Serializes read-modify-write cycles within the process.
    guard: Mutex<()>,
}

impl JsonAddressCache {
    pub fn new(path: PathBuf) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            guard: Mutex::new(()),
        })
    }

    /// Cache file inside `base_dir`.
    pub fn in_dir(base_dir: &Path) -> Result<Self, CoreError> {
        Self::new(base_dir.join(CACHE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, CoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&data)?)
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(entries)?;
        write_atomic(&self.path, &json)
    }

    fn modify<F>(&self, change: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _lock = self
            .guard
            .lock()
            .map_err(|_| CoreError::Storage("address cache lock poisoned".into()))?;
        let mut entries = self.read_entries()?;
        if change(&mut entries) {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

impl AddressCache for JsonAddressCache {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let _lock = self
            .guard
            .lock()
            .map_err(|_| CoreError::Storage("address cache lock poisoned".into()))?;
        Ok(self.read_entries()?.remove(key))
    }

    fn put(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })?;
        debug!("address cache {} updated ({})", self.path.display(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.modify(|entries| entries.remove(key).is_some())
    }
}

/// Reads a saved intake draft.
pub fn load_draft(path: &Path) -> Result<TransactionFormData, CoreError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Saves an intake draft as pretty JSON, atomically.
pub fn save_draft(path: &Path, data: &TransactionFormData) -> Result<(), CoreError> {
    let json = serde_json::to_string_pretty(data)?;
    write_atomic(path, &json)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}
