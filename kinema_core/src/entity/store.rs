// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays entity storage with allocation, membership, dependency,
//! and content management.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, Rect};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::deps::{DependencyTable, Observation};
use super::id::{EntityId, EntityKind, INVALID};
use super::traverse::Children;
use crate::clock::{Version, VersionClock};
use crate::content::{Content, Group, union_bounds};
use crate::dirty;
use crate::error::{CycleError, EdgeKind};
use crate::trace::{MarkCleanEvent, Tracer};
use crate::updater::{Updater, UpdaterId};

/// Construction options for a [`Scene`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SceneConfig {
    /// Number of entity slots to reserve up front.
    pub initial_capacity: usize,
    /// Clock issuing version stamps. Use
    /// [`VersionClock::resume_after`] to continue an existing order.
    pub clock: VersionClock,
}

/// Struct-of-arrays storage for all entities of one scene.
///
/// Entities are addressed by [`EntityId`] handles. Internally, each entity
/// occupies a slot in parallel arrays. Destroyed entities are recycled via a
/// free list, and generation counters prevent stale handle access.
///
/// `C` is the render/layout context threaded through
/// [`update`](Self::update) to content hooks and updaters.
pub struct Scene<C = ()> {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Versioning --
    pub(crate) kind: Vec<EntityKind>,
    pub(crate) dirty: Vec<bool>,
    pub(crate) version: Vec<Version>,
    pub(crate) deps: Vec<DependencyTable>,
    pub(crate) deps_sum: Vec<u64>,
    pub(crate) observed_max_child: Vec<Version>,
    pub(crate) clock: VersionClock,
    /// Query number in which a slot was last found clean by `is_dirty`.
    pub(crate) clean_mark: Vec<u32>,
    pub(crate) query_number: u32,

    // -- Content (checked out while its own hooks run) --
    pub(crate) content: Vec<Option<Box<dyn Content<C>>>>,
    pub(crate) bounds: Vec<Option<Rect>>,
    pub(crate) updaters: Vec<Vec<(UpdaterId, Updater<C>)>>,
    pub(crate) next_updater: u64,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Change log --
    pub(crate) log: DirtyTracker<u32>,
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl<C> fmt::Debug for Scene<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("len", &self.len)
            .field("free", &self.free_list.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl<C> Default for Scene<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Scene<C> {
    /// Creates an empty scene with a fresh clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Creates an empty scene from `config`.
    #[must_use]
    pub fn with_config(config: SceneConfig) -> Self {
        let cap = config.initial_capacity;
        Self {
            parent: Vec::with_capacity(cap),
            first_child: Vec::with_capacity(cap),
            next_sibling: Vec::with_capacity(cap),
            prev_sibling: Vec::with_capacity(cap),
            kind: Vec::with_capacity(cap),
            dirty: Vec::with_capacity(cap),
            version: Vec::with_capacity(cap),
            deps: Vec::with_capacity(cap),
            deps_sum: Vec::with_capacity(cap),
            observed_max_child: Vec::with_capacity(cap),
            clock: config.clock,
            clean_mark: Vec::with_capacity(cap),
            query_number: 0,
            content: Vec::with_capacity(cap),
            bounds: Vec::with_capacity(cap),
            updaters: Vec::with_capacity(cap),
            next_updater: 0,
            generation: Vec::with_capacity(cap),
            free_list: Vec::new(),
            len: 0,
            log: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    /// Returns the scene's clock.
    #[must_use]
    pub fn clock(&self) -> VersionClock {
        self.clock
    }

    // -- Allocation API --

    /// Creates a leaf entity owning `content`.
    ///
    /// The entity starts dirty at [`Version::ZERO`] with no dependencies.
    pub fn create_leaf(&mut self, content: impl Content<C>) -> EntityId {
        self.create(EntityKind::Leaf, Box::new(content))
    }

    /// Creates a composite entity owning `content` and no children.
    pub fn create_composite(&mut self, content: impl Content<C>) -> EntityId {
        self.create(EntityKind::Composite, Box::new(content))
    }

    /// Creates a composite entity with empty [`Group`] content.
    pub fn create_group(&mut self) -> EntityId {
        self.create(EntityKind::Composite, Box::new(Group))
    }

    /// Creates an entity of the given kind.
    pub fn create(&mut self, kind: EntityKind, content: Box<dyn Content<C>>) -> EntityId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.kind[i] = kind;
            self.dirty[i] = true;
            self.version[i] = Version::ZERO;
            self.deps[i].clear();
            self.deps_sum[i] = 0;
            self.observed_max_child[i] = Version::ZERO;
            self.clean_mark[i] = 0;
            self.content[i] = Some(content);
            self.bounds[i] = None;
            self.updaters[i].clear();
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.kind.push(kind);
            self.dirty.push(true);
            self.version.push(Version::ZERO);
            self.deps.push(DependencyTable::new());
            self.deps_sum.push(0);
            self.observed_max_child.push(Version::ZERO);
            self.clean_mark.push(0);
            self.content.push(Some(content));
            self.bounds.push(None);
            self.updaters.push(Vec::new());
            self.generation.push(0);
            idx
        };

        self.pending_added.push(idx);
        self.log.mark(idx, dirty::TOPOLOGY);

        EntityId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys an entity, freeing its slot for reuse.
    ///
    /// The entity is detached from its parent, and every dependency edge
    /// from or to it is removed. Dependents notice the removal through their
    /// dependency-sum check.
    ///
    /// # Panics
    ///
    /// Panics if the entity has children (remove them first) or if the
    /// handle is stale.
    pub fn destroy_entity(&mut self, id: EntityId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy entity with children"
        );

        if self.parent[idx as usize] != INVALID {
            let p = self.parent[idx as usize];
            self.detach(p, idx);
        }

        // Drop edges in both directions.
        self.deps[idx as usize].clear();
        for other in 0..self.len {
            if other != idx && self.deps[other as usize].remove(id) {
                self.log.mark(other, dirty::TOPOLOGY);
            }
        }
        self.log.remove_key(idx);

        self.content[idx as usize] = None;
        self.updaters[idx as usize].clear();
        self.bounds[idx as usize] = None;

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.pending_removed.push(idx);
        self.log.mark(idx, dirty::TOPOLOGY);
    }

    /// Returns whether the given handle refers to a live entity.
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the kind of an entity.
    #[must_use]
    pub fn kind(&self, id: EntityId) -> EntityKind {
        self.validate(id);
        self.kind[id.idx as usize]
    }

    // -- Membership API --

    /// Adds `child` as the last child of composite `parent`.
    ///
    /// Marks `parent` dirty.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] if `parent` is `child` or is already reachable
    /// from `child` through dependency or membership edges.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `parent` is not a composite, or
    /// if `child` already has a parent.
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), CycleError> {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        self.assert_composite(parent);
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        self.check_edge(parent, child, EdgeKind::Membership)?;

        self.link_last(p, c);
        self.attach(p, c);
        Ok(())
    }

    /// Inserts `child` before `sibling` in the sibling's parent.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] if the new membership would close a cycle.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent, or
    /// `sibling` has no parent.
    pub fn insert_before(&mut self, child: EntityId, sibling: EntityId) -> Result<(), CycleError> {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");
        self.check_edge(self.handle(p), child, EdgeKind::Membership)?;

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];

        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            // `sibling` was the first child.
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;

        self.attach(p, c);
        Ok(())
    }

    /// Removes `child` from its parent, if it has one.
    ///
    /// Marks the former parent dirty. Removing an entity without a parent is
    /// a no-op.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove_from_parent(&mut self, child: EntityId) {
        self.validate(child);
        let p = self.parent[child.idx as usize];
        if p != INVALID {
            self.detach(p, child.idx);
        }
    }

    /// Removes `child` from `parent` if it is one of its children.
    ///
    /// Returns whether anything was removed.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) -> bool {
        self.validate(parent);
        self.validate(child);
        if self.parent[child.idx as usize] != parent.idx {
            return false;
        }
        self.detach(parent.idx, child.idx);
        true
    }

    /// Moves `child` to be the last child of `new_parent`.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] if the new membership would close a cycle; the
    /// child then stays where it was.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or `new_parent` is not a composite.
    pub fn reparent(&mut self, child: EntityId, new_parent: EntityId) -> Result<(), CycleError> {
        self.validate(child);
        self.validate(new_parent);
        self.assert_composite(new_parent);
        self.check_edge(new_parent, child, EdgeKind::Membership)?;

        let old_p = self.parent[child.idx as usize];
        if old_p != INVALID {
            self.detach(old_p, child.idx);
        }
        self.link_last(new_parent.idx, child.idx);
        self.attach(new_parent.idx, child.idx);
        Ok(())
    }

    /// Returns the parent of an entity, if any.
    #[must_use]
    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(self.handle(p))
        }
    }

    /// Returns an iterator over the direct children of an entity.
    ///
    /// Leaves have no children.
    #[must_use]
    pub fn children(&self, id: EntityId) -> Children<'_, C> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the live entities that have no parent, in slot order.
    #[must_use]
    pub fn roots(&self) -> Vec<EntityId> {
        let mut roots = Vec::new();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                roots.push(self.handle(idx));
            }
        }
        roots
    }

    // -- Dependency API --

    /// Records `dependency` in the dependency table of `entity`, observed at
    /// its current version.
    ///
    /// If the dependency is already present its observation is overwritten,
    /// so adding a dependency always treats it as currently fresh, even if it
    /// changed since it was last observed.
    ///
    /// The dependency-sum baseline is not touched, so adding a dependency to
    /// a clean entity normally makes it dirty.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] if `dependency` is `entity` or can already
    /// reach `entity` in the update graph. The table is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn add_dependency(
        &mut self,
        entity: EntityId,
        dependency: EntityId,
    ) -> Result<(), CycleError> {
        self.validate(entity);
        self.validate(dependency);
        self.check_edge(entity, dependency, EdgeKind::Dependency)?;

        let observed = self.version[dependency.idx as usize];
        if self.deps[entity.idx as usize].insert(dependency, observed) {
            let _ = self
                .log
                .add_dependency(entity.idx, dependency.idx, dirty::INVALIDATED);
            self.log.mark(entity.idx, dirty::TOPOLOGY);
        }
        Ok(())
    }

    /// Removes `dependency` from the table of `entity`.
    ///
    /// Absent entries are a no-op.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is stale.
    pub fn remove_dependency(&mut self, entity: EntityId, dependency: EntityId) {
        self.validate(entity);
        if self.deps[entity.idx as usize].remove(dependency) {
            // Keep the change-log edge if membership still implies it.
            if self.parent[dependency.idx as usize] != entity.idx {
                self.log
                    .remove_dependency(entity.idx, dependency.idx, dirty::INVALIDATED);
            }
            self.log.mark(entity.idx, dirty::TOPOLOGY);
        }
    }

    /// Returns the dependency observations of an entity, in insertion order.
    #[must_use]
    pub fn dependencies(&self, id: EntityId) -> &[Observation] {
        self.validate(id);
        self.deps[id.idx as usize].as_slice()
    }

    /// Returns the dependency version sum recorded at the last clean
    /// transition.
    #[must_use]
    pub fn dependency_sum(&self, id: EntityId) -> u64 {
        self.validate(id);
        self.deps_sum[id.idx as usize]
    }

    // -- Versioning API --

    /// Returns the version stamp of an entity.
    #[must_use]
    pub fn version(&self, id: EntityId) -> Version {
        self.validate(id);
        self.version[id.idx as usize]
    }

    /// Returns the explicit dirty flag without consulting dependencies.
    #[must_use]
    pub fn dirty_flag(&self, id: EntityId) -> bool {
        self.validate(id);
        self.dirty[id.idx as usize]
    }

    /// Returns the highest child version seen when the composite was last
    /// cleaned ([`Version::ZERO`] for leaves and childless composites).
    #[must_use]
    pub fn observed_max_child_version(&self, id: EntityId) -> Version {
        self.validate(id);
        self.observed_max_child[id.idx as usize]
    }

    /// Unconditionally marks an entity dirty.
    ///
    /// Also records the invalidation, propagated to everything that depends
    /// on the entity, in the change log.
    pub fn set_dirty(&mut self, id: EntityId) {
        self.validate(id);
        self.set_dirty_at(id.idx);
    }

    /// Marks an entity clean and stamps it with the next clock value.
    ///
    /// For composites, every child is cleaned first (recursively), the
    /// highest child version is recorded, and the cached bounds are refolded
    /// from the children before the composite itself is stamped.
    pub fn mark_clean(&mut self, id: EntityId) {
        self.validate(id);
        self.mark_clean_at(id.idx, &mut Tracer::none());
    }

    // -- Content API --

    /// Returns the content of an entity, without refreshing it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the content was lost to a panicking
    /// hook.
    #[must_use]
    pub fn content(&self, id: EntityId) -> &dyn Content<C> {
        self.validate(id);
        match self.content[id.idx as usize].as_deref() {
            Some(content) => content,
            None => checked_out(id),
        }
    }

    /// Returns the content of an entity as `T`, without refreshing it.
    #[must_use]
    pub fn content_as<T: Content<C>>(&self, id: EntityId) -> Option<&T> {
        self.content(id).downcast_ref::<T>()
    }

    /// Returns the content of an entity for mutation and marks it dirty.
    pub fn content_mut(&mut self, id: EntityId) -> &mut dyn Content<C> {
        self.validate(id);
        self.set_dirty_at(id.idx);
        match self.content[id.idx as usize].as_deref_mut() {
            Some(content) => content,
            None => checked_out(id),
        }
    }

    /// Returns the content of an entity as `T` for mutation.
    ///
    /// The entity is marked dirty even if the downcast fails.
    pub fn content_as_mut<T: Content<C>>(&mut self, id: EntityId) -> Option<&mut T> {
        self.content_mut(id).downcast_mut::<T>()
    }

    /// Replaces the content of an entity and marks it dirty.
    pub fn set_content(&mut self, id: EntityId, content: impl Content<C>) {
        self.validate(id);
        self.content[id.idx as usize] = Some(Box::new(content));
        self.set_dirty_at(id.idx);
    }

    /// Applies `affine` to the content of `id` and all its descendants,
    /// marking each of them dirty.
    pub fn apply_transform(&mut self, id: EntityId, affine: Affine) {
        self.validate(id);
        let mut stack = alloc::vec![id.idx];
        while let Some(idx) = stack.pop() {
            match self.content[idx as usize].as_deref_mut() {
                Some(content) => content.transform(affine),
                None => checked_out(self.handle(idx)),
            }
            self.set_dirty_at(idx);
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
        }
    }

    /// Returns the cached bounding box of an entity without refreshing it.
    ///
    /// Callers that need up-to-date geometry should use
    /// [`bounding_box`](Self::bounding_box).
    #[must_use]
    pub fn cached_bounds(&self, id: EntityId) -> Option<Rect> {
        self.validate(id);
        self.bounds[id.idx as usize]
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: EntityId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale EntityId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Builds the current handle for a live slot.
    pub(crate) fn handle(&self, idx: u32) -> EntityId {
        EntityId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Content of a live slot; `None` for stale handles or checked-out slots.
    pub(crate) fn try_content(&self, id: EntityId) -> Option<&dyn Content<C>> {
        if id.idx >= self.len || self.generation[id.idx as usize] != id.generation {
            return None;
        }
        self.content[id.idx as usize].as_deref()
    }

    fn assert_composite(&self, id: EntityId) {
        assert!(
            self.kind[id.idx as usize] == EntityKind::Composite,
            "{id:?} is not a composite"
        );
    }

    pub(crate) fn set_dirty_at(&mut self, idx: u32) {
        self.dirty[idx as usize] = true;
        self.log.mark_with(idx, dirty::INVALIDATED, &EagerPolicy);
    }

    /// Live sum of dependency versions.
    pub(crate) fn live_dependency_sum(&self, idx: u32) -> u64 {
        self.deps[idx as usize]
            .as_slice()
            .iter()
            .fold(0_u64, |sum, o| {
                sum.wrapping_add(self.version[o.dependency.idx as usize].get())
            })
    }

    /// Cleans `idx`, cascading through children of composites.
    pub(crate) fn mark_clean_at(&mut self, idx: u32, tracer: &mut Tracer<'_>) {
        if self.kind[idx as usize] == EntityKind::Composite {
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                self.mark_clean_at(child, tracer);
                child = self.next_sibling[child as usize];
            }
        }
        self.restamp_at(idx, tracer);
    }

    /// Stamps `idx` without touching its children. Composites first record
    /// their highest child version and refold their bounds.
    pub(crate) fn restamp_at(&mut self, idx: u32, tracer: &mut Tracer<'_>) {
        if self.kind[idx as usize] == EntityKind::Composite {
            let mut max = Version::ZERO;
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                max = max.max(self.version[child as usize]);
                child = self.next_sibling[child as usize];
            }
            self.observed_max_child[idx as usize] = max;
            self.bounds[idx as usize] = self.folded_bounds(idx);
        }
        self.stamp(idx, tracer);
    }

    /// Base clean transition: clear the flag, draw a version, re-baseline
    /// the dependency sum.
    fn stamp(&mut self, idx: u32, tracer: &mut Tracer<'_>) {
        let version = self.clock.next_version();
        let sum = self.live_dependency_sum(idx);
        self.dirty[idx as usize] = false;
        self.version[idx as usize] = version;
        self.deps_sum[idx as usize] = sum;
        self.log.mark(idx, dirty::REFRESHED);
        tracer.mark_clean(&MarkCleanEvent {
            entity: idx,
            version,
            dependency_sum: sum,
        });
    }

    /// Recomputes the cached bounds of `idx` from its current geometry.
    pub(crate) fn recompute_bounds_at(&mut self, idx: u32) {
        self.bounds[idx as usize] = match self.kind[idx as usize] {
            EntityKind::Leaf => self.own_bounds(idx),
            EntityKind::Composite => self.folded_bounds(idx),
        };
    }

    fn own_bounds(&self, idx: u32) -> Option<Rect> {
        match self.content[idx as usize].as_deref() {
            Some(content) => content.bounds(),
            None => checked_out(self.handle(idx)),
        }
    }

    /// Union of a composite's own geometry and its children's cached bounds.
    fn folded_bounds(&self, idx: u32) -> Option<Rect> {
        let mut acc = self.own_bounds(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            acc = union_bounds(acc, self.bounds[child as usize]);
            child = self.next_sibling[child as usize];
        }
        acc
    }

    /// Fails if adding the edge `from -> to` would close a cycle.
    fn check_edge(&self, from: EntityId, to: EntityId, kind: EdgeKind) -> Result<(), CycleError> {
        if from.idx == to.idx || self.reaches(to.idx, from.idx) {
            return Err(CycleError { from, to, kind });
        }
        Ok(())
    }

    /// Whether `target` is reachable from `start` along dependency and
    /// membership edges.
    fn reaches(&self, start: u32, target: u32) -> bool {
        let mut visited = alloc::vec![false; self.len as usize];
        let mut stack = alloc::vec![start];
        while let Some(idx) = stack.pop() {
            if idx == target {
                return true;
            }
            if core::mem::replace(&mut visited[idx as usize], true) {
                continue;
            }
            stack.extend(
                self.deps[idx as usize]
                    .as_slice()
                    .iter()
                    .map(|o| o.dependency.idx),
            );
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
        }
        false
    }

    /// Appends `c` to the child list of `p`.
    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Bookkeeping after `c` was linked under `p`.
    fn attach(&mut self, p: u32, c: u32) {
        // Composite bounds depend on every child.
        let _ = self.log.add_dependency(p, c, dirty::INVALIDATED);
        self.set_dirty_at(p);
        self.log.mark(p, dirty::TOPOLOGY);
    }

    /// Unlinks `c` from `p` and records the change.
    fn detach(&mut self, p: u32, c: u32) {
        self.unlink_from_parent(c);
        if !self.deps[p as usize].contains(self.handle(c)) {
            self.log.remove_dependency(p, c, dirty::INVALIDATED);
        }
        self.set_dirty_at(p);
        self.log.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}

#[cold]
#[track_caller]
fn checked_out(id: EntityId) -> ! {
    panic!("content of {id:?} is unavailable (checked out by a hook that panicked?)")
}
