// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-entity dependency tables.

use alloc::vec::Vec;

use super::id::EntityId;
use crate::clock::Version;

/// One dependency together with the version this entity last observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Observation {
    /// The entity depended upon.
    pub dependency: EntityId,
    /// Its version as of the last time the dependent looked.
    pub observed: Version,
}

/// Dependencies of one entity, in insertion order.
///
/// Tables are small in practice, so lookups are linear scans over a vector.
#[derive(Clone, Debug, Default)]
pub struct DependencyTable {
    entries: Vec<Observation>,
}

impl DependencyTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the number of dependencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the observations in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[Observation] {
        &self.entries
    }

    /// Returns the observed version of `dependency`, if present.
    #[must_use]
    pub fn observed(&self, dependency: EntityId) -> Option<Version> {
        self.entries
            .iter()
            .find(|o| o.dependency == dependency)
            .map(|o| o.observed)
    }

    /// Returns whether `dependency` is present.
    #[must_use]
    pub fn contains(&self, dependency: EntityId) -> bool {
        self.entries.iter().any(|o| o.dependency == dependency)
    }

    /// Records `dependency` at `version`, overwriting any earlier observation.
    ///
    /// Returns `true` if the dependency was not present before.
    pub(crate) fn insert(&mut self, dependency: EntityId, version: Version) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|o| o.dependency == dependency) {
            entry.observed = version;
            false
        } else {
            self.entries.push(Observation {
                dependency,
                observed: version,
            });
            true
        }
    }

    /// Removes `dependency`. Returns `true` if it was present.
    pub(crate) fn remove(&mut self, dependency: EntityId) -> bool {
        match self.entries.iter().position(|o| o.dependency == dependency) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Returns the observation at `pos`.
    pub(crate) fn get(&self, pos: usize) -> Option<Observation> {
        self.entries.get(pos).copied()
    }

    /// Overwrites the observed version at `pos`.
    pub(crate) fn observe_at(&mut self, pos: usize, version: Version) {
        self.entries[pos].observed = version;
    }

    /// Removes every entry.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(idx: u32) -> EntityId {
        EntityId { idx, generation: 0 }
    }

    #[test]
    fn insert_overwrites_observation() {
        let mut table = DependencyTable::new();
        assert!(table.insert(id(1), Version(3)));
        assert!(!table.insert(id(1), Version(7)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.observed(id(1)), Some(Version(7)));
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut table = DependencyTable::new();
        table.insert(id(1), Version(1));
        assert!(!table.remove(id(2)));
        assert_eq!(table.len(), 1);
        assert!(table.remove(id(1)));
        assert!(table.is_empty());
    }

    #[test]
    fn generation_distinguishes_entries() {
        let mut table = DependencyTable::new();
        table.insert(id(4), Version(1));
        let reused = EntityId {
            idx: 4,
            generation: 1,
        };
        assert!(!table.contains(reused));
        assert!(table.contains(id(4)));
    }

    #[test]
    fn preserves_insertion_order() {
        let mut table = DependencyTable::new();
        table.insert(id(3), Version(1));
        table.insert(id(1), Version(2));
        table.insert(id(2), Version(3));
        let order: Vec<u32> = table.as_slice().iter().map(|o| o.dependency.idx).collect();
        assert_eq!(order, [3, 1, 2]);
    }
}
