//! Metadata store — persisted reconstruction hints per dataset name.
//!
//! Layout: `{cache_dir}/metadata.json`, a single JSON object mapping dataset
//! name to `{parse_dates: [...], index: [...]}`. The file is created empty on
//! first open and rewritten wholesale on every update — no write-behind
//! buffering, every update is flushed before the call returns.
//!
//! No locking: the store assumes a single process. Concurrent writers from
//! multiple processes can race and corrupt the file.

use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reconstruction hints for one dataset: which columns must be reinterpreted
/// as datetimes on load, and which columns form the composite index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRecord {
    #[serde(default)]
    pub parse_dates: Vec<String>,
    #[serde(default)]
    pub index: Vec<String>,
}

impl MetaRecord {
    pub fn is_empty(&self) -> bool {
        self.parse_dates.is_empty() && self.index.is_empty()
    }
}

/// The persisted name → [`MetaRecord`] mapping.
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    /// Open the store at `path`, creating an empty mapping file (and parent
    /// directories) if none exists yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DataError> {
        let path = path.into();
        if !path.is_file() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| DataError::Metadata(format!("create metadata dir: {e}")))?;
            }
            fs::write(&path, "{}")
                .map_err(|e| DataError::Metadata(format!("create metadata file: {e}")))?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored record for `name`, or an empty record if none exists.
    /// Never fails: a missing or unreadable store yields the empty record.
    pub fn get(&self, name: &str) -> MetaRecord {
        self.read_all()
            .ok()
            .and_then(|mut all| all.remove(name))
            .unwrap_or_default()
    }

    /// Overwrite the record for `name` and flush the whole mapping to disk.
    pub fn update(&self, name: &str, record: MetaRecord) -> Result<(), DataError> {
        let mut all = self.read_all()?;
        all.insert(name.to_string(), record);

        let json = serde_json::to_string_pretty(&all)
            .map_err(|e| DataError::Metadata(format!("serialize metadata: {e}")))?;
        let mut file = fs::File::create(&self.path)
            .map_err(|e| DataError::Metadata(format!("write metadata file: {e}")))?;
        file.write_all(json.as_bytes())
            .map_err(|e| DataError::Metadata(format!("write metadata file: {e}")))?;
        file.sync_all()
            .map_err(|e| DataError::Metadata(format!("flush metadata file: {e}")))?;
        Ok(())
    }

    /// Remove the record for `name`, if any.
    pub fn remove(&self, name: &str) -> Result<(), DataError> {
        let mut all = self.read_all()?;
        if all.remove(name).is_some() {
            let json = serde_json::to_string_pretty(&all)
                .map_err(|e| DataError::Metadata(format!("serialize metadata: {e}")))?;
            fs::write(&self.path, json)
                .map_err(|e| DataError::Metadata(format!("write metadata file: {e}")))?;
        }
        Ok(())
    }

    fn read_all(&self) -> Result<BTreeMap<String, MetaRecord>, DataError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| DataError::Metadata(format!("read metadata file: {e}")))?;
        serde_json::from_str(&content)
            .map_err(|e| DataError::Metadata(format!("parse metadata file: {e}")))
    }
}
