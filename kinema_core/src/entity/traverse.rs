// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{EntityId, INVALID};
use super::store::Scene;

/// An iterator over the direct children of a composite.
///
/// Created by [`Scene::children`].
pub struct Children<'a, C> {
    scene: &'a Scene<C>,
    current: u32,
}

impl<C> core::fmt::Debug for Children<'_, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Children")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl<'a, C> Children<'a, C> {
    pub(crate) fn new(scene: &'a Scene<C>, first: u32) -> Self {
        Self {
            scene,
            current: first,
        }
    }
}

impl<C> Iterator for Children<'_, C> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.scene.next_sibling[idx as usize];
        Some(self.scene.handle(idx))
    }
}
