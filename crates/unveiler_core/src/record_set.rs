use std::collections::HashSet;

use crate::{Record, RecordId};

/// Growable, duplicate-free collection of records.
///
/// The seen-identity set is the only source of truth for membership: a record
/// whose id is already in `seen` is rejected, even if the record itself was
/// never stored (for example because the set was restored from a cache entry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet<T> {
    records: Vec<T>,
    seen: HashSet<RecordId>,
}

impl<T> Default for RecordSet<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
        }
    }
}

impl<T: Record> RecordSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a set from persisted parts. Records repeating an id are dropped
    /// and every kept record's id is added to `seen`.
    pub fn from_parts(records: Vec<T>, seen: impl IntoIterator<Item = RecordId>) -> Self {
        let mut set = Self {
            records: Vec::with_capacity(records.len()),
            seen: HashSet::new(),
        };
        set.extend(records);
        set.seen.extend(seen);
        set
    }

    /// Insert a record unless its id has been seen. Returns whether it was added.
    pub fn insert(&mut self, record: T) -> bool {
        if self.seen.contains(record.id()) {
            return false;
        }
        self.seen.insert(record.id().to_string());
        self.records.push(record);
        true
    }

    /// Insert every unseen record in order. Returns how many were added.
    pub fn extend(&mut self, records: impl IntoIterator<Item = T>) -> usize {
        records
            .into_iter()
            .map(|record| self.insert(record))
            .filter(|added| *added)
            .count()
    }

    /// Union with another set: its records are appended after ours, in its order.
    pub fn merge(&mut self, other: RecordSet<T>) -> usize {
        let (records, seen) = other.into_parts();
        let added = self.extend(records);
        self.seen.extend(seen);
        added
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion (page arrival) order.
    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn seen_ids(&self) -> &HashSet<RecordId> {
        &self.seen
    }

    pub fn into_parts(self) -> (Vec<T>, HashSet<RecordId>) {
        (self.records, self.seen)
    }
}
