// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-entity updater callbacks.
//!
//! An updater is a closure run during the finish step of every
//! [`Scene::update`] call that reaches its entity, after the self-recompute
//! phase. Animations hang off updaters: they mutate the content in place and
//! the entity is then re-stamped. Any entity with at least one updater
//! registered counts as changed on every update.

use alloc::boxed::Box;
use core::fmt;

use crate::content::Content;
use crate::entity::{EntityId, Scene};

/// A boxed updater closure.
pub type Updater<C> = Box<dyn FnMut(&mut dyn Content<C>, &mut C)>;

/// Handle returned by [`Scene::register_updater`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct UpdaterId(pub(crate) u64);

impl fmt::Debug for UpdaterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UpdaterId({})", self.0)
    }
}

impl<C> Scene<C> {
    /// Registers `f` to run on every update of `id`, in registration order.
    pub fn register_updater(
        &mut self,
        id: EntityId,
        f: impl FnMut(&mut dyn Content<C>, &mut C) + 'static,
    ) -> UpdaterId {
        self.validate(id);
        let handle = UpdaterId(self.next_updater);
        self.next_updater += 1;
        self.updaters[id.idx as usize].push((handle, Box::new(f)));
        handle
    }

    /// Removes a previously registered updater. Returns `true` if it was
    /// present.
    pub fn remove_updater(&mut self, id: EntityId, updater: UpdaterId) -> bool {
        self.validate(id);
        let list = &mut self.updaters[id.idx as usize];
        match list.iter().position(|(h, _)| *h == updater) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Removes every updater of `id`.
    pub fn clear_updaters(&mut self, id: EntityId) {
        self.validate(id);
        self.updaters[id.idx as usize].clear();
    }

    /// Returns how many updaters `id` has.
    #[must_use]
    pub fn updater_count(&self, id: EntityId) -> usize {
        self.validate(id);
        self.updaters[id.idx as usize].len()
    }

    /// Runs the updaters of `idx` against its content. Returns how many ran.
    pub(crate) fn run_updaters(&mut self, idx: u32, ctx: &mut C) -> usize {
        let mut list = core::mem::take(&mut self.updaters[idx as usize]);
        if list.is_empty() {
            return 0;
        }
        let Some(mut content) = self.content[idx as usize].take() else {
            self.updaters[idx as usize] = list;
            return 0;
        };
        for (_, f) in &mut list {
            f(content.as_mut(), ctx);
        }
        self.content[idx as usize] = Some(content);
        let count = list.len();
        self.updaters[idx as usize] = list;
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PointContent;

    #[test]
    fn register_and_remove() {
        let mut scene = Scene::<()>::new();
        let id = scene.create_leaf(PointContent::new(0.0, 0.0));
        let a = scene.register_updater(id, |_, _| {});
        let b = scene.register_updater(id, |_, _| {});
        assert_ne!(a, b);
        assert_eq!(scene.updater_count(id), 2);

        assert!(scene.remove_updater(id, a));
        assert!(!scene.remove_updater(id, a));
        assert_eq!(scene.updater_count(id), 1);

        scene.clear_updaters(id);
        assert_eq!(scene.updater_count(id), 0);
    }

    #[test]
    fn updaters_run_in_registration_order() {
        let mut scene = Scene::<alloc::vec::Vec<u8>>::new();
        let id = scene.create_leaf(PointContent::new(0.0, 0.0));
        scene.register_updater(id, |_, log: &mut alloc::vec::Vec<u8>| log.push(1));
        scene.register_updater(id, |_, log: &mut alloc::vec::Vec<u8>| log.push(2));

        let mut log = alloc::vec::Vec::new();
        assert_eq!(scene.run_updaters(id.idx, &mut log), 2);
        assert_eq!(log, [1, 2]);
    }

    #[test]
    fn updater_mutates_content() {
        let mut scene = Scene::<()>::new();
        let id = scene.create_leaf(PointContent::new(0.0, 0.0));
        scene.register_updater(id, |content, _| {
            if let Some(p) = content.downcast_mut::<PointContent>() {
                p.point.x += 1.0;
            }
        });
        scene.run_updaters(id.idx, &mut ());
        scene.run_updaters(id.idx, &mut ());
        assert_eq!(scene.content_as::<PointContent>(id).unwrap().point.x, 2.0);
    }
}
