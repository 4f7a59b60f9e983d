//! Cache resolver — the load/retrieve/available contract.
//!
//! `load` serves a dataset from its persisted artifact when one exists,
//! otherwise falls through to `retrieve`, which invokes the registered
//! retrieval function, persists the result, and records any reconstruction
//! hints. At most one source of truth per name: the artifact at
//! `{cache_dir}/{name}.{ext}` is overwritten wholesale on every retrieval.
//!
//! Failure semantics: retrieval errors propagate unmodified, no retry here.
//! A failure while persisting the artifact can leave the metadata record
//! already written with the artifact missing — a known inconsistency window
//! for single-process use, not guarded against.

use crate::codec;
use crate::config::{CacheConfig, FileFormat};
use crate::dataset::Dataset;
use crate::error::DataError;
use crate::metadata::{MetaRecord, MetadataStore};
use crate::registry::Registry;
use polars::prelude::*;
use std::fs;
use std::path::PathBuf;

/// A local dataset cache over one root directory and one storage format.
pub struct DataCache {
    config: CacheConfig,
    store: MetadataStore,
    registry: Registry,
}

impl DataCache {
    /// Open a cache with the given configuration and retrieval registry.
    ///
    /// Creates the cache root and an empty metadata file on first use.
    pub fn new(config: CacheConfig, registry: Registry) -> Result<Self, DataError> {
        let store = MetadataStore::open(config.cache_dir.join("metadata.json"))?;
        Ok(Self {
            config,
            store,
            registry,
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Artifact path for `name`: `{cache_dir}/{name}.{ext}`.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.config
            .cache_dir
            .join(format!("{name}.{}", self.config.format.extension()))
    }

    /// Load `name` from its persisted artifact, retrieving it first if no
    /// artifact exists yet.
    ///
    /// On a cache hit the stored metadata record is applied: columns listed
    /// under `parse_dates` are reinterpreted as datetimes, the index
    /// designation is restored for formats that cannot carry it, and any
    /// stray unnamed positional column left by a foreign writer is dropped.
    pub fn load(&self, name: &str) -> Result<Dataset, DataError> {
        let path = self.artifact_path(name);
        if !path.exists() {
            return self.retrieve(name);
        }

        let dataset = codec::read(&path, self.config.format)?;
        let record = self.store.get(name);
        let mut dataset = apply_record(dataset, &record, self.config.format)?;
        dataset.strip_positional_column();
        Ok(dataset)
    }

    /// Fetch `name` via its registered retrieval function and persist the
    /// result, overwriting any previous artifact.
    ///
    /// Fails with [`DataError::UnknownDataset`] before any I/O when no
    /// retrieval function is registered for `name`.
    pub fn retrieve(&self, name: &str) -> Result<Dataset, DataError> {
        let func = self
            .registry
            .resolve(name)
            .ok_or_else(|| DataError::UnknownDataset {
                name: name.to_string(),
            })?;

        let retrieved = func()?;

        if let Some(record) = &retrieved.metadata {
            self.store.update(name, record.clone())?;
        }

        fs::create_dir_all(&self.config.cache_dir)
            .map_err(|e| DataError::Cache(format!("create cache dir: {e}")))?;
        codec::write(&retrieved.dataset, &self.artifact_path(name), self.config.format)?;

        Ok(retrieved.dataset)
    }

    /// Registered dataset names, optionally filtered by substring.
    pub fn available(&self, filter: Option<&str>) -> Vec<String> {
        self.registry.list_available(filter)
    }
}

/// Apply a metadata record to a freshly read dataset.
fn apply_record(
    dataset: Dataset,
    record: &MetaRecord,
    format: FileFormat,
) -> Result<Dataset, DataError> {
    let native_index = dataset.index().to_vec();
    let frame = reinterpret_dates(dataset.into_frame(), &record.parse_dates)?;

    let mut dataset = Dataset::new(frame);
    if !record.index.is_empty() && format.restores_index() {
        dataset.set_index(record.index.clone())?;
    } else if !native_index.is_empty() {
        // pkl artifacts carry the designation themselves
        dataset.set_index(native_index)?;
    }
    Ok(dataset)
}

/// Reinterpret the listed columns as datetimes.
///
/// String columns are parsed strictly (an unparsable value fails the load),
/// other non-temporal columns are cast; columns that are already dates or
/// datetimes pass through unchanged.
fn reinterpret_dates(frame: DataFrame, parse_dates: &[String]) -> Result<DataFrame, DataError> {
    let mut frame = frame;
    for name in parse_dates {
        let dtype = frame
            .column(name)
            .map_err(|_| DataError::MissingColumn {
                column: name.clone(),
            })?
            .dtype()
            .clone();

        if matches!(dtype, DataType::Date | DataType::Datetime(_, _)) {
            continue;
        }

        let expr = if dtype == DataType::String {
            col(name.as_str()).str().to_datetime(
                Some(TimeUnit::Microseconds),
                None,
                StrptimeOptions::default(),
                lit("raise"),
            )
        } else {
            col(name.as_str()).cast(DataType::Datetime(TimeUnit::Microseconds, None))
        };

        frame = frame
            .lazy()
            .with_column(expr)
            .collect()
            .map_err(|e| DataError::Codec(format!("reinterpret '{name}' as datetime: {e}")))?;
    }
    Ok(frame)
}
