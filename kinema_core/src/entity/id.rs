// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entity identity.

use core::fmt;

/// Sentinel value indicating "no entity" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to an entity in a [`Scene`](super::Scene).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after an entity is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    /// Slot index into the scene's arrays.
    pub(crate) idx: u32,
    /// Generation counter; must match the scene's generation for this slot.
    pub(crate) generation: u32,
}

impl EntityId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}@gen{})", self.idx, self.generation)
    }
}

/// How an entity folds freshness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Ordinary entity: dirty when its flag is set, when a dependency is
    /// dirty or newer than observed, or when the dependency version sum
    /// moved since the last clean transition.
    #[default]
    Leaf,
    /// Entity whose children are its content. Only its own flag is
    /// consulted by [`is_dirty`](super::Scene::is_dirty); children are
    /// brought up to date when it is cleaned.
    Composite,
}
