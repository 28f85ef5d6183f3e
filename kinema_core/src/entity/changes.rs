// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame change reports.
//!
//! The version protocol answers "is this entity fresh?" on demand. Renderers
//! usually want the opposite question answered in bulk: "what should I look
//! at again since last frame?" [`Scene::drain_changes`] answers it by
//! draining the change log kept alongside the version stamps.

use alloc::vec::Vec;

use super::store::Scene;
use crate::dirty;

/// The set of changes recorded since the previous drain.
///
/// Entities are reported by slot index. Pair with
/// [`EntityId::index`](super::EntityId::index) to correlate.
#[derive(Clone, Debug, Default)]
pub struct SceneChanges {
    /// Entities marked dirty, plus everything whose derived state depends on
    /// them (dependents and enclosing composites).
    pub invalidated: Vec<u32>,
    /// Entities that received a new version stamp.
    pub refreshed: Vec<u32>,
    /// Entities created since the last drain.
    pub added: Vec<u32>,
    /// Entities destroyed since the last drain.
    pub removed: Vec<u32>,
    /// Whether membership or dependency edges changed.
    pub topology_changed: bool,
}

impl SceneChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.invalidated.clear();
        self.refreshed.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.invalidated.is_empty()
            && self.refreshed.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl<C> Scene<C> {
    /// Drains the change log.
    pub fn drain_changes(&mut self) -> SceneChanges {
        let mut changes = SceneChanges::default();
        self.drain_changes_into(&mut changes);
        changes
    }

    /// Like [`drain_changes`](Self::drain_changes), but reuses a
    /// caller-provided buffer to avoid allocation.
    pub fn drain_changes_into(&mut self, changes: &mut SceneChanges) {
        changes.clear();

        changes.invalidated = self
            .log
            .drain(dirty::INVALIDATED)
            .affected()
            .deterministic()
            .run()
            .collect();

        changes.refreshed = self
            .log
            .drain(dirty::REFRESHED)
            .deterministic()
            .run()
            .collect();

        let topology: Vec<u32> = self
            .log
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();
        changes.topology_changed = !topology.is_empty();

        // Move lifecycle lists.
        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PointContent;

    #[test]
    fn added_and_removed_lifecycle() {
        let mut scene = Scene::<()>::new();
        let id = scene.create_leaf(PointContent::new(0.0, 0.0));

        // First drain: entity should appear in `added`.
        let changes = scene.drain_changes();
        assert!(changes.added.contains(&id.index()));
        assert!(changes.removed.is_empty());
        assert!(changes.topology_changed);

        // Second drain: nothing happened.
        let changes = scene.drain_changes();
        assert!(changes.is_empty());

        scene.destroy_entity(id);
        let changes = scene.drain_changes();
        assert!(changes.removed.contains(&id.index()));
        assert!(changes.added.is_empty());
    }

    #[test]
    fn invalidation_reaches_dependents_and_groups() {
        let mut scene = Scene::<()>::new();
        let a = scene.create_leaf(PointContent::new(0.0, 0.0));
        let b = scene.create_leaf(PointContent::new(0.0, 0.0));
        let g = scene.create_group();
        let other = scene.create_leaf(PointContent::new(0.0, 0.0));
        scene.add_dependency(b, a).unwrap();
        scene.add_child(g, b).unwrap();
        let _ = scene.drain_changes();

        scene.set_dirty(a);
        let changes = scene.drain_changes();
        assert!(changes.invalidated.contains(&a.index()));
        assert!(changes.invalidated.contains(&b.index()));
        assert!(changes.invalidated.contains(&g.index()));
        assert!(!changes.invalidated.contains(&other.index()));
    }

    #[test]
    fn refreshed_lists_stamped_entities() {
        let mut scene = Scene::<()>::new();
        let a = scene.create_leaf(PointContent::new(0.0, 0.0));
        let b = scene.create_leaf(PointContent::new(0.0, 0.0));
        scene.update(a, &mut ());
        let _ = scene.drain_changes();

        scene.set_dirty(b);
        scene.update(b, &mut ());
        let changes = scene.drain_changes();
        assert_eq!(changes.refreshed, [b.index()]);
        assert!(!changes.topology_changed);
    }

    #[test]
    fn drain_into_reuses_buffer() {
        let mut scene = Scene::<()>::new();
        let a = scene.create_leaf(PointContent::new(0.0, 0.0));
        let b = scene.create_leaf(PointContent::new(0.0, 0.0));

        let mut changes = SceneChanges::default();
        scene.drain_changes_into(&mut changes);
        assert_eq!(changes.added.len(), 2);

        scene.set_dirty(a);
        scene.drain_changes_into(&mut changes);
        assert!(changes.added.is_empty(), "added should be cleared");
        assert!(changes.invalidated.contains(&a.index()));
        assert!(!changes.invalidated.contains(&b.index()));
    }
}
