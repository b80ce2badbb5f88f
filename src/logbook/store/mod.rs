//! # Storage Layer
//!
//! A [`Store`] owns one collection: the in-memory records, the codec that
//! turns them into text, and the [`StorageBackend`] that holds that text.
//! It is the only thing allowed to touch a collection's contents.
//!
//! ## Guarantees
//!
//! - **Identity**: keys are unique after every completed mutation. Inserts of
//!   an existing key fail with `DuplicateIdentity`; updates that would move a
//!   record onto another record's key fail the same way.
//! - **All or nothing**: every operation either succeeds or leaves the
//!   collection exactly as it was. Updates run the mutator on a copy.
//! - **Absent is empty, corrupt is an error**: a missing file loads as an
//!   empty (or seeded) collection. A file that fails to decode is reported and
//!   the in-memory collection is left untouched.
//! - **Atomic saves**: backends replace files atomically, so a crash mid-save
//!   leaves the previous good file in place.
//!
//! The store never retries, never prompts and never exits; I/O failures are
//! returned for the session to act on.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: one file per collection in the data directory.
//! - [`mem_backend::MemBackend`]: for testing logic without filesystem I/O.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! ├── config.json        # Optional settings
//! ├── books.json         # One JSON array per collection
//! └── tasks.json
//! ```

use crate::codec::{Codec, JsonCodec};
use crate::error::{LogbookError, Result};
use crate::model::Record;
use std::cmp::Ordering;
use std::path::PathBuf;
use tracing::{debug, warn};

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;

pub use backend::StorageBackend;

/// Highest id a generated sequence may reach. Ids are shown through signed
/// integer fields, so anything above `i64::MAX` is refused.
pub const MAX_SEQ: u64 = i64::MAX as u64;

/// What [`Store::load_or_seed`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file existed and held this many records.
    Loaded(usize),
    /// No file; started with this many seed records.
    Seeded(usize),
}

pub struct Store<R: Record, B: StorageBackend, C: Codec<R> = JsonCodec> {
    records: Vec<R>,
    backend: B,
    codec: C,
    dirty: bool,
}

impl<R: Record, B: StorageBackend> Store<R, B, JsonCodec> {
    pub fn new(backend: B) -> Self {
        Self::with_codec(backend, JsonCodec)
    }
}

impl<R: Record, B: StorageBackend, C: Codec<R>> Store<R, B, C> {
    pub fn with_codec(backend: B, codec: C) -> Self {
        Self {
            records: Vec::new(),
            backend,
            codec,
            dirty: false,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", R::COLLECTION, self.codec.extension())
    }

    pub fn location(&self) -> PathBuf {
        self.backend.location(&self.file_name())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load the collection from its file. A missing file is an empty collection.
    pub fn load(&mut self) -> Result<LoadOutcome> {
        self.load_or_seed(Vec::new)
    }

    /// Load the collection, or start from `seed` when there is no file yet.
    ///
    /// Seeded collections are marked dirty so the next save writes them out.
    /// Seed records with duplicate keys are skipped.
    pub fn load_or_seed<F>(&mut self, seed: F) -> Result<LoadOutcome>
    where
        F: FnOnce() -> Vec<R>,
    {
        let name = self.file_name();
        match self.backend.read(&name)? {
            Some(bytes) => {
                let records = self.codec.decode(&bytes)?;
                check_records(&records)?;
                debug!(collection = R::COLLECTION, count = records.len(), "loaded");
                self.records = records;
                self.dirty = false;
                Ok(LoadOutcome::Loaded(self.records.len()))
            }
            None => {
                self.records.clear();
                for record in seed() {
                    if let Err(e) = self.insert(record) {
                        warn!(collection = R::COLLECTION, "skipping seed record: {}", e);
                    }
                }
                self.dirty = !self.records.is_empty();
                debug!(
                    collection = R::COLLECTION,
                    count = self.records.len(),
                    "no file, starting from seed"
                );
                Ok(LoadOutcome::Seeded(self.records.len()))
            }
        }
    }

    /// Encode the collection and atomically replace its file.
    pub fn save(&mut self) -> Result<()> {
        let bytes = self.codec.encode(&self.records)?;
        self.backend.write(&self.file_name(), &bytes)?;
        self.dirty = false;
        debug!(collection = R::COLLECTION, count = self.records.len(), "saved");
        Ok(())
    }

    /// Move an unreadable file aside and start over with an empty collection.
    pub fn start_fresh(&mut self, suffix: &str) -> Result<Option<PathBuf>> {
        let moved = self.backend.quarantine(&self.file_name(), suffix)?;
        self.records.clear();
        self.dirty = false;
        Ok(moved)
    }

    pub fn insert(&mut self, record: R) -> Result<R::Key> {
        let key = record.key();
        if self.position(&key).is_some() {
            return Err(LogbookError::DuplicateIdentity {
                collection: R::COLLECTION,
                key: key.to_string(),
            });
        }
        self.records.push(record);
        self.dirty = true;
        Ok(key)
    }

    /// Apply `mutator` to the record with `key`.
    ///
    /// The mutator works on a copy; the copy replaces the original only if the
    /// mutator succeeds and the (possibly changed) key is still unique.
    pub fn update<F>(&mut self, key: &R::Key, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut R) -> Result<()>,
    {
        let idx = self.position(key).ok_or_else(|| not_found::<R>(key))?;

        let mut candidate = self.records[idx].clone();
        mutator(&mut candidate)?;

        let new_key = candidate.key();
        if &new_key != key && self.position(&new_key).is_some() {
            return Err(LogbookError::DuplicateIdentity {
                collection: R::COLLECTION,
                key: new_key.to_string(),
            });
        }

        self.records[idx] = candidate;
        self.dirty = true;
        Ok(())
    }

    /// Remove a record, keeping the relative order of the rest.
    pub fn delete(&mut self, key: &R::Key) -> Result<R> {
        let idx = self.position(key).ok_or_else(|| not_found::<R>(key))?;
        let removed = self.records.remove(idx);
        self.dirty = true;
        Ok(removed)
    }

    pub fn find(&self, key: &R::Key) -> Result<&R> {
        self.records
            .iter()
            .find(|r| &r.key() == key)
            .ok_or_else(|| not_found::<R>(key))
    }

    pub fn contains(&self, key: &R::Key) -> bool {
        self.position(key).is_some()
    }

    /// All records in insertion order.
    pub fn list(&self) -> &[R] {
        &self.records
    }

    /// All records ordered by `compare`. Ties keep insertion order.
    pub fn list_sorted_by<F>(&self, mut compare: F) -> Vec<&R>
    where
        F: FnMut(&R, &R) -> Ordering,
    {
        let mut sorted: Vec<&R> = self.records.iter().collect();
        sorted.sort_by(|a, b| compare(*a, *b));
        sorted
    }

    /// Records matching `predicate`, as a fresh pass over the collection.
    pub fn query<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a R> + Clone + 'a
    where
        P: Fn(&R) -> bool + Clone + 'a,
    {
        self.records.iter().filter(move |r| predicate(*r))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when there are changes not yet written by [`Store::save`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Next free number for collections with generated sequential ids.
    pub fn next_seq(&self) -> Result<u64> {
        match self.records.iter().filter_map(R::sequence).max() {
            None => Ok(1),
            Some(max) if max < MAX_SEQ => Ok(max + 1),
            Some(max) => Err(LogbookError::validation(
                "id",
                format!("no ids left after {} in {}", max, R::COLLECTION),
            )),
        }
    }

    fn position(&self, key: &R::Key) -> Option<usize> {
        self.records.iter().position(|r| &r.key() == key)
    }
}

fn not_found<R: Record>(key: &R::Key) -> LogbookError {
    LogbookError::NotFound {
        collection: R::COLLECTION,
        key: key.to_string(),
    }
}

/// Keys must be unique and sequence numbers in range. Records are numbered
/// from 1 in file order.
fn check_records<R: Record>(records: &[R]) -> Result<()> {
    for (i, record) in records.iter().enumerate() {
        let invalid = |reason: String| LogbookError::InvalidFile {
            collection: R::COLLECTION,
            record: i + 1,
            reason,
        };
        if let Some(seq) = record.sequence().filter(|seq| *seq > MAX_SEQ) {
            return Err(invalid(format!("id {} is above {}", seq, MAX_SEQ)));
        }
        let key = record.key();
        if let Some(first) = records[..i].iter().position(|r| r.key() == key) {
            return Err(invalid(format!(
                "duplicate key {}, first used by record {}",
                key,
                first + 1
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::mem_backend::MemBackend;
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: u64,
        name: String,
    }

    impl Item {
        fn new(id: u64, name: &str) -> Self {
            Self {
                id,
                name: name.to_string(),
            }
        }
    }

    impl Record for Item {
        type Key = u64;
        const COLLECTION: &'static str = "items";

        fn key(&self) -> u64 {
            self.id
        }

        fn sequence(&self) -> Option<u64> {
            Some(self.id)
        }
    }

    fn store() -> Store<Item, MemBackend> {
        Store::new(MemBackend::new())
    }

    fn names(store: &Store<Item, MemBackend>) -> Vec<&str> {
        store.list().iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut store = store();
        store.insert(Item::new(1, "A")).unwrap();
        let err = store.insert(Item::new(1, "B")).unwrap_err();

        assert!(matches!(err, LogbookError::DuplicateIdentity { .. }));
        assert_eq!(store.list(), &[Item::new(1, "A")]);
    }

    #[test]
    fn update_missing_key_is_not_found_and_writes_nothing() {
        let mut store = store();
        let err = store
            .update(&99, |item| {
                item.name = "x".into();
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, LogbookError::NotFound { .. }));
        assert!(!store.is_dirty());
        assert_eq!(store.backend().write_count(), 0);
    }

    #[test]
    fn delete_preserves_relative_order() {
        let mut store = store();
        store.insert(Item::new(1, "A")).unwrap();
        store.insert(Item::new(2, "B")).unwrap();
        store.insert(Item::new(3, "C")).unwrap();

        let removed = store.delete(&2).unwrap();
        assert_eq!(removed.name, "B");
        assert_eq!(names(&store), vec!["A", "C"]);
        assert!(matches!(store.delete(&2), Err(LogbookError::NotFound { .. })));
    }

    #[test]
    fn failed_mutator_leaves_record_untouched() {
        let mut store = store();
        store.insert(Item::new(1, "A")).unwrap();
        store.save().unwrap();

        let result = store.update(&1, |item| {
            item.name = "half-done".into();
            Err(LogbookError::validation("name", "nope"))
        });

        assert!(result.is_err());
        assert_eq!(store.find(&1).unwrap().name, "A");
        assert!(!store.is_dirty());
    }

    #[test]
    fn update_cannot_steal_another_key() {
        let mut store = store();
        store.insert(Item::new(1, "A")).unwrap();
        store.insert(Item::new(2, "B")).unwrap();

        let err = store
            .update(&1, |item| {
                item.id = 2;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, LogbookError::DuplicateIdentity { .. }));
        assert_eq!(names(&store), vec!["A", "B"]);

        store
            .update(&1, |item| {
                item.id = 5;
                Ok(())
            })
            .unwrap();
        assert!(store.contains(&5));
        assert!(!store.contains(&1));
    }

    #[test]
    fn identity_stays_unique_across_mixed_operations() {
        let mut store = store();
        for round in 0..5u64 {
            for id in 1..=4 {
                let _ = store.insert(Item::new(id, "x"));
            }
            let _ = store.delete(&(round % 4 + 1));
            let _ = store.update(&((round + 1) % 4 + 1), |item| {
                item.id = round % 3 + 1;
                Ok(())
            });

            let mut keys: Vec<u64> = store.list().iter().map(|i| i.id).collect();
            let before = keys.len();
            keys.sort();
            keys.dedup();
            assert_eq!(keys.len(), before, "duplicate key after round {}", round);
        }
    }

    #[test]
    fn load_absent_file_is_empty() {
        let mut store = store();
        assert_eq!(store.load().unwrap(), LoadOutcome::Seeded(0));
        assert!(store.is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn load_absent_file_uses_seed() {
        let mut store = store();
        let outcome = store
            .load_or_seed(|| vec![Item::new(1, "A"), Item::new(1, "dup"), Item::new(2, "B")])
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Seeded(2));
        assert_eq!(names(&store), vec!["A", "B"]);
        assert!(store.is_dirty());
    }

    #[test]
    fn load_corrupt_file_keeps_previous_collection() {
        let backend = MemBackend::new().with_file("items.json", "[{\"id\": 1,");
        let mut store: Store<Item, MemBackend> = Store::new(backend);
        store.insert(Item::new(7, "kept")).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, LogbookError::Decode { .. }));
        assert_eq!(names(&store), vec!["kept"]);
    }

    #[test]
    fn load_rejects_duplicate_keys_in_file() {
        let backend = MemBackend::new().with_file(
            "items.json",
            r#"[{"id": 1, "name": "A"}, {"id": 1, "name": "B"}]"#,
        );
        let mut store: Store<Item, MemBackend> = Store::new(backend);
        let err = store.load().unwrap_err();
        assert!(matches!(err, LogbookError::InvalidFile { record: 2, .. }));
        assert!(err.to_string().contains("first used by record 1"));
        assert!(!err.to_string().contains("line 0"));
        assert!(store.is_empty());
    }

    #[test]
    fn load_rejects_ids_out_of_range() {
        let backend = MemBackend::new().with_file(
            "items.json",
            r#"[{"id": 18446744073709551615, "name": "huge"}]"#,
        );
        let mut store: Store<Item, MemBackend> = Store::new(backend);
        let err = store.load().unwrap_err();
        assert!(matches!(err, LogbookError::InvalidFile { record: 1, .. }));
        assert!(err.is_corrupt_file());
    }

    #[test]
    fn next_seq_refuses_to_overflow() {
        let mut store = store();
        store.insert(Item::new(MAX_SEQ, "last")).unwrap();
        assert!(matches!(store.next_seq(), Err(LogbookError::Validation { .. })));
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = store();
        store.insert(Item::new(1, "A")).unwrap();
        store.insert(Item::new(2, "B")).unwrap();
        store.save().unwrap();
        assert!(!store.is_dirty());

        let bytes = store.backend().contents("items.json").unwrap();
        let backend = MemBackend::new().with_file("items.json", bytes);
        let mut reloaded: Store<Item, MemBackend> = Store::new(backend);
        assert_eq!(reloaded.load().unwrap(), LoadOutcome::Loaded(2));
        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn save_is_idempotent() {
        let mut store = store();
        store.insert(Item::new(1, "A")).unwrap();
        store.save().unwrap();
        let first = store.backend().contents("items.json").unwrap();
        store.save().unwrap();
        let second = store.backend().contents("items.json").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn failed_save_keeps_store_dirty() {
        let mut store = store();
        store.insert(Item::new(1, "A")).unwrap();
        store.backend().set_simulate_write_error(true);

        let err = store.save().unwrap_err();
        assert!(err.is_write_failure());
        assert!(store.is_dirty());
    }

    #[test]
    fn query_is_restartable() {
        let mut store = store();
        for (id, name) in [(1, "apple"), (2, "banana"), (3, "avocado")] {
            store.insert(Item::new(id, name)).unwrap();
        }

        let matches = store.query(|i| i.name.starts_with('a'));
        let first: Vec<u64> = matches.clone().map(|i| i.id).collect();
        let second: Vec<u64> = matches.map(|i| i.id).collect();
        assert_eq!(first, vec![1, 3]);
        assert_eq!(first, second);
    }

    #[test]
    fn list_sorted_by_is_stable() {
        let mut store = store();
        store.insert(Item::new(3, "b")).unwrap();
        store.insert(Item::new(1, "a")).unwrap();
        store.insert(Item::new(2, "b")).unwrap();

        let sorted: Vec<u64> = store
            .list_sorted_by(|x, y| x.name.cmp(&y.name))
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(sorted, vec![1, 3, 2]);
        assert_eq!(store.list()[0].id, 3);
    }

    #[test]
    fn next_seq_follows_max_id() {
        let mut store = store();
        assert_eq!(store.next_seq().unwrap(), 1);
        store.insert(Item::new(4, "x")).unwrap();
        store.insert(Item::new(2, "y")).unwrap();
        assert_eq!(store.next_seq().unwrap(), 5);
    }

    #[test]
    fn start_fresh_moves_file_aside() {
        let backend = MemBackend::new().with_file("items.json", "garbage");
        let mut store: Store<Item, MemBackend> = Store::new(backend);
        assert!(store.load().is_err());

        let moved = store.start_fresh("corrupt-1").unwrap();
        assert_eq!(moved, Some(PathBuf::from("memory://items.json.corrupt-1")));
        assert!(store.backend().contents("items.json").is_none());
        assert_eq!(store.load().unwrap(), LoadOutcome::Seeded(0));
    }
}
