//! Retrieval registry — an explicit name → retrieval-function mapping.
//!
//! The mapping is built at startup with [`Registry::register`] (or seeded
//! with the built-in datasets via [`Registry::builtin`]) and is immutable for
//! the lifetime of the cache that owns it. Lookup is a pure name match — no
//! fuzzy matching, no aliasing.

use crate::dataset::Dataset;
use crate::error::DataError;
use crate::metadata::MetaRecord;
use crate::retrievers;
use std::collections::BTreeMap;

/// The result of one retrieval: the table, plus the reconstruction hints the
/// retriever wants persisted alongside it (if any).
pub struct Retrieved {
    pub dataset: Dataset,
    pub metadata: Option<MetaRecord>,
}

impl Retrieved {
    /// A bare table with no accompanying metadata record.
    pub fn plain(dataset: Dataset) -> Self {
        Self {
            dataset,
            metadata: None,
        }
    }
}

/// A zero-argument retrieval function. Free to perform network I/O; must
/// fail with an error rather than return partial data.
pub type RetrieveFn = Box<dyn Fn() -> Result<Retrieved, DataError> + Send + Sync>;

/// The static set of retrieval functions keyed by dataset name.
pub struct Registry {
    entries: BTreeMap<String, RetrieveFn>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// A registry pre-populated with the built-in datasets.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("test", retrievers::test);
        registry.register("state_fips", retrievers::state_fips);
        registry.register("goodreads_books", retrievers::goodreads_books);
        registry.register("goodreads_ratings", retrievers::goodreads_ratings);
        registry.register("goodreads_tags", retrievers::goodreads_tags);
        registry.register("goodreads_book_tags", retrievers::goodreads_book_tags);
        registry.register("airline_carrier_codes", retrievers::airline_carrier_codes);
        registry.register("chipotle_raw", retrievers::chipotle_raw);
        registry
    }

    /// Register a retrieval function under `name`, replacing any previous
    /// entry for that name.
    pub fn register<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn() -> Result<Retrieved, DataError> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Box::new(func));
    }

    /// Look up the retrieval function for `name`.
    pub fn resolve(&self, name: &str) -> Option<&RetrieveFn> {
        self.entries.get(name)
    }

    /// All registered names in sorted order, optionally restricted to names
    /// containing `filter` (case-sensitive substring containment).
    pub fn list_available(&self, filter: Option<&str>) -> Vec<String> {
        self.entries
            .keys()
            .filter(|name| filter.map_or(true, |f| name.contains(f)))
            .cloned()
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
