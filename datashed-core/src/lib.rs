//! Datashed Core — a local cache for named tabular datasets.
//!
//! Given a dataset name, [`DataCache::load`] returns a table: on first use it
//! invokes the retrieval function registered for that name, persists the
//! result under the cache root, and records reconstruction hints (date
//! columns, index columns) in a metadata sidecar; every later call reads the
//! persisted artifact and reapplies the hints.
//!
//! The crate is organized leaf-first:
//! - [`config`] — explicit cache configuration (root directory, file format)
//! - [`dataset`] — DataFrame wrapper carrying an index-column designation
//! - [`metadata`] — persisted name → reconstruction-hint mapping
//! - [`registry`] — explicit name → retrieval-function mapping
//! - [`codec`] — format-specific read/write (csv, pkl, feather)
//! - [`cache`] — the load/retrieve/available resolver tying it together
//! - [`retrievers`] — built-in retrieval functions (embedded and remote CSVs)
//!
//! Single-process, single-writer by design: the metadata file and cache root
//! are read and written without locking.

pub mod cache;
pub mod codec;
pub mod config;
pub mod dataset;
pub mod error;
pub mod metadata;
pub mod registry;
pub mod retrievers;

pub use cache::DataCache;
pub use config::{CacheConfig, FileFormat};
pub use dataset::Dataset;
pub use error::DataError;
pub use metadata::{MetaRecord, MetadataStore};
pub use registry::{Registry, Retrieved};
