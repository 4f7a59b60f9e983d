//! End-to-end checks over the public API: every offline built-in dataset
//! loads twice with equal content, under each storage format.

use datashed_core::{CacheConfig, DataCache, FileFormat, Registry};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

// Built-ins that need no network access.
const OFFLINE_DATASETS: &[&str] = &["test", "state_fips"];

fn temp_cache_dir() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("datashed_loader_{}_{id}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn load_twice_roundtrips(format: FileFormat) {
    let dir = temp_cache_dir();
    let cache = DataCache::new(CacheConfig::new(&dir, format), Registry::builtin()).unwrap();

    for name in OFFLINE_DATASETS {
        let fresh = cache.load(name).unwrap();
        assert!(fresh.height() > 0, "{name} came back empty");

        let cached = cache.load(name).unwrap();
        assert!(
            cached.content_eq(&fresh),
            "{name} changed across a cached reload ({format:?})"
        );
        assert!(cache.artifact_path(name).is_file());
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn offline_datasets_roundtrip_as_csv() {
    load_twice_roundtrips(FileFormat::Csv);
}

#[test]
fn offline_datasets_roundtrip_as_pkl() {
    load_twice_roundtrips(FileFormat::Pkl);
}

#[test]
fn offline_datasets_roundtrip_as_feather() {
    load_twice_roundtrips(FileFormat::Feather);
}

#[test]
fn every_builtin_is_listed() {
    let dir = temp_cache_dir();
    let cache =
        DataCache::new(CacheConfig::new(&dir, FileFormat::Csv), Registry::builtin()).unwrap();

    let names = cache.available(None);
    for name in OFFLINE_DATASETS {
        assert!(names.contains(&name.to_string()));
    }
    assert!(names.contains(&"goodreads_books".to_string()));

    let _ = fs::remove_dir_all(&dir);
}
