//! Reloadable alias store
//!
//! Single writer, many readers. A reload builds a complete new snapshot
//! first and then replaces the shared pointer in one step. Readers that
//! already hold a snapshot keep it for as long as they need it.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use super::errors::AliasResult;
use super::index::AliasIndex;
use super::loader::AliasTableLoader;
use crate::catalog::CatalogSet;
use crate::observability::{Event, Logger};

#[derive(Debug)]
pub struct AliasStore {
    current: RwLock<Arc<AliasIndex>>,
    generation: AtomicU64,
}

impl AliasStore {
    /// Creates a store publishing `index` as generation 1.
    pub fn new(index: AliasIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(index.with_generation(1))),
            generation: AtomicU64::new(1),
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<AliasIndex> {
        // The guarded value is a single pointer; a poisoned lock still holds
        // a complete snapshot.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Publishes a fully built index and returns its generation.
    pub fn swap(&self, index: AliasIndex) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let next = Arc::new(index.with_generation(generation));
        let fingerprint = next.fingerprint().to_string();
        {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            *guard = next;
        }
        Logger::info(
            Event::AliasIndexSwapped.as_str(),
            &[
                ("fingerprint", fingerprint.as_str()),
                ("generation", generation.to_string().as_str()),
            ],
        );
        generation
    }

    /// Reloads from disk. On failure the current snapshot stays in place.
    pub fn reload(&self, path: &Path, catalog: &CatalogSet) -> AliasResult<u64> {
        let index = AliasTableLoader::load(path, catalog)?;
        Ok(self.swap(index))
    }

    /// Generation of the current snapshot.
    pub fn generation(&self) -> u64 {
        self.snapshot().generation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasEntry;
    use std::fs;
    use std::thread;
    use tempfile::TempDir;

    fn index_of(entries: Vec<AliasEntry>) -> AliasIndex {
        AliasIndex::build(entries).unwrap()
    }

    #[test]
    fn test_swap_replaces_snapshot() {
        let store = AliasStore::new(index_of(vec![AliasEntry::new("암진단비", "GENERAL")]));
        assert_eq!(store.generation(), 1);

        let generation = store.swap(index_of(vec![AliasEntry::new("유사암진단비", "SIMILAR")]));
        assert_eq!(generation, 2);
        assert!(store.snapshot().recall("암진단비").is_empty());
        assert!(!store.snapshot().recall("유사암진단비").is_empty());
    }

    #[test]
    fn test_held_snapshot_is_unaffected_by_swap() {
        let store = AliasStore::new(index_of(vec![AliasEntry::new("암진단비", "GENERAL")]));
        let held = store.snapshot();

        store.swap(index_of(Vec::new()));

        assert_eq!(held.generation(), 1);
        assert!(!held.recall("암진단비").is_empty());
        assert!(store.snapshot().recall("암진단비").is_empty());
    }

    #[test]
    fn test_failed_reload_keeps_current() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("aliases.json");
        fs::write(&path, "not json").unwrap();

        let store = AliasStore::new(index_of(vec![AliasEntry::new("암진단비", "GENERAL")]));
        assert!(store.reload(&path, &CatalogSet::builtin()).is_err());
        assert_eq!(store.generation(), 1);
        assert!(!store.snapshot().recall("암진단비").is_empty());
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        let full = vec![
            AliasEntry::new("암진단비", "GENERAL"),
            AliasEntry::new("유사암진단비", "SIMILAR"),
        ];
        let store = Arc::new(AliasStore::new(index_of(full.clone())));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let snap = store.snapshot();
                        let a = snap.recall("암진단비").is_empty();
                        let b = snap.recall("유사암진단비").is_empty();
                        // Either both present (full table) or both absent (empty table)
                        assert_eq!(a, b);
                    }
                })
            })
            .collect();

        for i in 0..50 {
            if i % 2 == 0 {
                store.swap(index_of(Vec::new()));
            } else {
                store.swap(index_of(full.clone()));
            }
        }

        for r in readers {
            r.join().unwrap();
        }
    }
}
