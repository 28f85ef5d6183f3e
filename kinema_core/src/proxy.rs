// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazily materialized transform proxies.
//!
//! A [`TransformProxy`] stands in for an entity seen through a chain of
//! affine transforms. Applying a transform only composes it into an
//! accumulated operator; the referenced entity is never modified. The first
//! read after a change takes a fresh, detached copy of the entity, applies
//! the whole accumulated operator once, and caches the result until the next
//! change.
//!
//! The proxy's stale flag is independent of the referenced entity's own
//! dirty/version state: a cached copy is not rebuilt merely because the
//! entity changed afterwards. Call [`reset`](TransformProxy::reset) (or apply
//! another transform) to force a rebuild.

use alloc::boxed::Box;
use core::fmt;

use kurbo::{Affine, Rect};

use crate::content::Content;
use crate::entity::{EntityId, Scene};
use crate::trace::{MaterializeEvent, Tracer};

/// A deferred view of an entity under accumulated affine transforms.
pub struct TransformProxy<C> {
    target: EntityId,
    accumulated: Affine,
    base: Affine,
    stale: bool,
    materialized: Option<Box<dyn Content<C>>>,
    materializations: u32,
}

impl<C> fmt::Debug for TransformProxy<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformProxy")
            .field("target", &self.target)
            .field("accumulated", &self.accumulated)
            .field("base", &self.base)
            .field("stale", &self.stale)
            .field("materializations", &self.materializations)
            .finish_non_exhaustive()
    }
}

impl<C: 'static> TransformProxy<C> {
    /// Creates a proxy for `target` with an identity operator.
    #[must_use]
    pub fn new(target: EntityId) -> Self {
        Self {
            target,
            accumulated: Affine::IDENTITY,
            base: Affine::IDENTITY,
            stale: true,
            materialized: None,
            materializations: 0,
        }
    }

    /// Sets the baseline operator, which is also the starting accumulated
    /// operator.
    #[must_use]
    pub fn with_base(mut self, base: Affine) -> Self {
        self.base = base;
        self.accumulated = base;
        self.stale = true;
        self
    }

    /// Returns the proxied entity.
    #[must_use]
    pub fn target(&self) -> EntityId {
        self.target
    }

    /// Returns the accumulated operator.
    #[must_use]
    pub fn accumulated(&self) -> Affine {
        self.accumulated
    }

    /// Returns the baseline operator restored by [`reset`](Self::reset).
    #[must_use]
    pub fn base(&self) -> Affine {
        self.base
    }

    /// Returns whether the next read rebuilds the copy.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Returns how many copies were built so far.
    #[must_use]
    pub fn materializations(&self) -> u32 {
        self.materializations
    }

    /// Composes `op` after the accumulated operator.
    pub fn apply_transform(&mut self, op: Affine) {
        self.accumulated = op * self.accumulated;
        self.stale = true;
    }

    /// Stores the accumulated operator as the new baseline.
    pub fn save_base(&mut self) {
        self.base = self.accumulated;
    }

    /// Collapses the accumulated operator back to the baseline and drops the
    /// cached copy.
    pub fn reset(&mut self) {
        self.accumulated = self.base;
        self.materialized = None;
        self.stale = true;
    }

    /// Returns the transformed copy, building it first if stale.
    pub fn materialize(&mut self, scene: &mut Scene<C>, ctx: &mut C) -> &dyn Content<C> {
        self.materialize_traced(scene, ctx, &mut Tracer::none())
    }

    /// Like [`materialize`](Self::materialize), reporting rebuilds to
    /// `tracer`.
    pub fn materialize_traced(
        &mut self,
        scene: &mut Scene<C>,
        ctx: &mut C,
        tracer: &mut Tracer<'_>,
    ) -> &dyn Content<C> {
        if self.stale {
            self.materialized = None;
            self.stale = false;
        }

        let target = self.target;
        let accumulated = self.accumulated;
        let count = &mut self.materializations;
        let mut built = false;
        let copy = self.materialized.get_or_insert_with(|| {
            *count += 1;
            built = true;
            let mut copy = scene.snapshot(target, ctx);
            copy.transform(accumulated);
            copy
        });
        if built {
            tracer.materialize(&MaterializeEvent {
                target: target.index(),
                materializations: *count,
            });
        }
        &**copy
    }

    /// Returns the bounds of the transformed copy.
    pub fn bounding_box(&mut self, scene: &mut Scene<C>, ctx: &mut C) -> Option<Rect> {
        self.materialize(scene, ctx).bounds()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;
    use crate::content::{PointContent, Snapshot};

    #[test]
    fn transforms_are_deferred_until_read() {
        let mut scene = Scene::<()>::new();
        let p = scene.create_leaf(PointContent::new(1.0, 0.0));
        scene.update(p, &mut ());
        let v = scene.version(p);

        let mut proxy = TransformProxy::new(p);
        proxy.apply_transform(Affine::translate((1.0, 0.0)));
        proxy.apply_transform(Affine::scale(2.0));
        assert_eq!(proxy.materializations(), 0);
        assert_eq!(
            scene.content_as::<PointContent>(p).unwrap().point,
            Point::new(1.0, 0.0),
            "target is untouched"
        );
        assert_eq!(scene.version(p), v);

        let copy = proxy.materialize(&mut scene, &mut ());
        // Translate first, then scale.
        assert_eq!(
            copy.downcast_ref::<PointContent>().unwrap().point,
            Point::new(4.0, 0.0)
        );
        assert_eq!(proxy.materializations(), 1);

        let _ = proxy.materialize(&mut scene, &mut ());
        assert_eq!(proxy.materializations(), 1, "second read is cached");
        assert_eq!(scene.version(p), v);
    }

    #[test]
    fn materialize_reads_fresh_content() {
        let mut scene = Scene::<()>::new();
        let p = scene.create_leaf(PointContent::new(0.0, 0.0));
        let mut proxy = TransformProxy::new(p);

        assert_eq!(
            proxy.bounding_box(&mut scene, &mut ()),
            Some(Rect::new(0.0, 0.0, 0.0, 0.0))
        );
        assert!(!scene.is_dirty(p), "the read refreshed the target");
    }

    #[test]
    fn stale_flag_is_independent_of_target() {
        let mut scene = Scene::<()>::new();
        let p = scene.create_leaf(PointContent::new(0.0, 0.0));
        let mut proxy = TransformProxy::new(p);
        let _ = proxy.materialize(&mut scene, &mut ());

        scene.content_as_mut::<PointContent>(p).unwrap().point = Point::new(5.0, 5.0);
        let copy = proxy.materialize(&mut scene, &mut ());
        assert_eq!(
            copy.downcast_ref::<PointContent>().unwrap().point,
            Point::ORIGIN
        );

        proxy.apply_transform(Affine::IDENTITY);
        let copy = proxy.materialize(&mut scene, &mut ());
        assert_eq!(
            copy.downcast_ref::<PointContent>().unwrap().point,
            Point::new(5.0, 5.0)
        );
        assert_eq!(proxy.materializations(), 2);
    }

    #[test]
    fn reset_returns_to_base() {
        let mut scene = Scene::<()>::new();
        let p = scene.create_leaf(PointContent::new(1.0, 1.0));
        let mut proxy = TransformProxy::new(p).with_base(Affine::translate((10.0, 0.0)));
        proxy.apply_transform(Affine::scale(3.0));
        proxy.reset();
        assert_eq!(proxy.accumulated(), Affine::translate((10.0, 0.0)));

        let copy = proxy.materialize(&mut scene, &mut ());
        assert_eq!(
            copy.downcast_ref::<PointContent>().unwrap().point,
            Point::new(11.0, 1.0)
        );

        proxy.apply_transform(Affine::translate((0.0, 1.0)));
        proxy.save_base();
        proxy.apply_transform(Affine::scale(2.0));
        proxy.reset();
        assert_eq!(proxy.accumulated(), proxy.base());
        assert!(proxy.is_stale());
    }

    #[test]
    fn group_proxy_copies_descendants() {
        let mut scene = Scene::<()>::new();
        let g = scene.create_group();
        let a = scene.create_leaf(PointContent::new(0.0, 0.0));
        let b = scene.create_leaf(PointContent::new(1.0, 1.0));
        scene.add_child(g, a).unwrap();
        scene.add_child(g, b).unwrap();

        let mut proxy = TransformProxy::new(g);
        proxy.apply_transform(Affine::translate((2.0, 0.0)));
        let copy = proxy.materialize(&mut scene, &mut ());
        assert_eq!(copy.downcast_ref::<Snapshot<()>>().unwrap().parts().len(), 3);
        assert_eq!(
            proxy.bounding_box(&mut scene, &mut ()),
            Some(Rect::new(2.0, 0.0, 3.0, 1.0))
        );
        assert_eq!(
            scene.cached_bounds(g),
            Some(Rect::new(0.0, 0.0, 1.0, 1.0))
        );
    }
}
