// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry providers.
//!
//! The engine never decides *what* changed geometrically. Each entity owns a
//! boxed [`Content`] that rebuilds its derived state when asked, reports its
//! bounding box, and knows how to transform itself. The update protocol calls
//! [`Content::recompute`] in its self-recompute phase and [`Content::bounds`]
//! when it refreshes cached bounding geometry.
//!
//! A few small content types are provided for grouping and for building
//! tests and demos: [`Group`], [`PointContent`], [`PathContent`],
//! [`PolylineContent`], and [`Snapshot`].

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use kurbo::{Affine, BezPath, Point, Rect, Shape as _};

use crate::clock::Version;
use crate::entity::{EntityId, Scene};

/// A geometry provider owned by one entity.
///
/// `C` is the render/layout context passed through
/// [`Scene::update`](crate::entity::Scene::update) unchanged.
pub trait Content<C>: 'static {
    /// Rebuilds derived state from inputs.
    ///
    /// Called when the entity was dirty or one of its dependencies changed.
    /// Dependencies (and, for composites, children) are already fresh when
    /// this runs. The entity's own slot is checked out while the hook runs,
    /// so `inputs` cannot see it.
    fn recompute(&mut self, inputs: &Inputs<'_, C>, ctx: &mut C) {
        _ = (inputs, ctx);
    }

    /// Returns the bounding box of the current shape, or `None` if empty.
    fn bounds(&self) -> Option<Rect>;

    /// Applies `affine` to the shape in place.
    fn transform(&mut self, affine: Affine);

    /// Returns an owned copy of this content.
    fn clone_content(&self) -> Box<dyn Content<C>>;

    /// Upcasts for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts for downcasting to the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C> dyn Content<C> + '_ {
    /// Returns the content as `T` if it has that concrete type.
    #[must_use]
    pub fn downcast_ref<T: Content<C>>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Returns the content as `T` if it has that concrete type.
    #[must_use]
    pub fn downcast_mut<T: Content<C>>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Read-only view of the scene handed to [`Content::recompute`].
pub struct Inputs<'a, C> {
    scene: &'a Scene<C>,
}

impl<C> fmt::Debug for Inputs<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inputs").finish_non_exhaustive()
    }
}

impl<'a, C> Inputs<'a, C> {
    pub(crate) fn new(scene: &'a Scene<C>) -> Self {
        Self { scene }
    }

    /// Returns the content of `id` as `T`.
    ///
    /// Returns `None` if the content has a different type, if `id` was
    /// destroyed, or if it is the entity currently being recomputed.
    #[must_use]
    pub fn get<T: Content<C>>(&self, id: EntityId) -> Option<&'a T> {
        self.scene.try_content(id)?.downcast_ref::<T>()
    }

    /// Returns the content of `id`, if available.
    #[must_use]
    pub fn content(&self, id: EntityId) -> Option<&'a dyn Content<C>> {
        self.scene.try_content(id)
    }

    /// Returns the cached bounding box of `id`.
    ///
    /// Returns `None` if `id` was destroyed or has no geometry.
    #[must_use]
    pub fn bounds(&self, id: EntityId) -> Option<Rect> {
        if self.scene.is_alive(id) {
            self.scene.bounds[id.idx as usize]
        } else {
            None
        }
    }

    /// Returns the version stamp of `id`, or `None` if it was destroyed.
    #[must_use]
    pub fn version(&self, id: EntityId) -> Option<Version> {
        self.scene
            .is_alive(id)
            .then(|| self.scene.version[id.idx as usize])
    }
}

/// Returns the smallest rectangle containing both inputs.
pub(crate) fn union_bounds(a: Option<Rect>, b: Option<Rect>) -> Option<Rect> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

// ---------------------------------------------------------------------------
// Provided content types
// ---------------------------------------------------------------------------

/// Empty content, used by composites whose shape is entirely their children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Group;

impl<C> Content<C> for Group {
    fn bounds(&self) -> Option<Rect> {
        None
    }

    fn transform(&mut self, _affine: Affine) {}

    fn clone_content(&self) -> Box<dyn Content<C>> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A single point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointContent {
    /// Position of the point.
    pub point: Point,
}

impl PointContent {
    /// Creates a point content at `(x, y)`.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            point: Point::new(x, y),
        }
    }
}

impl<C> Content<C> for PointContent {
    fn bounds(&self) -> Option<Rect> {
        Some(Rect::from_points(self.point, self.point))
    }

    fn transform(&mut self, affine: Affine) {
        self.point = affine * self.point;
    }

    fn clone_content(&self) -> Box<dyn Content<C>> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A Bézier path.
#[derive(Clone, Debug, Default)]
pub struct PathContent {
    /// The path geometry.
    pub path: BezPath,
}

impl PathContent {
    /// Wraps a path.
    #[must_use]
    pub fn new(path: BezPath) -> Self {
        Self { path }
    }
}

impl<C> Content<C> for PathContent {
    fn bounds(&self) -> Option<Rect> {
        if self.path.elements().is_empty() {
            None
        } else {
            Some(self.path.bounding_box())
        }
    }

    fn transform(&mut self, affine: Affine) {
        self.path.apply_affine(affine);
    }

    fn clone_content(&self) -> Box<dyn Content<C>> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// An open polyline rebuilt from the positions of [`PointContent`] entities.
///
/// The source entities should be registered as dependencies of the entity
/// owning this content; sources that are missing or not points are skipped.
#[derive(Clone, Debug, Default)]
pub struct PolylineContent {
    /// Entities whose points form the vertices, in order.
    pub sources: Vec<EntityId>,
    /// The derived path. Rebuilt on every recompute.
    pub path: BezPath,
}

impl PolylineContent {
    /// Creates a polyline through the given point entities.
    #[must_use]
    pub fn new(sources: Vec<EntityId>) -> Self {
        Self {
            sources,
            path: BezPath::new(),
        }
    }
}

impl<C> Content<C> for PolylineContent {
    fn recompute(&mut self, inputs: &Inputs<'_, C>, _ctx: &mut C) {
        let mut path = BezPath::new();
        let points = self
            .sources
            .iter()
            .filter_map(|&id| inputs.get::<PointContent>(id));
        for (i, p) in points.enumerate() {
            if i == 0 {
                path.move_to(p.point);
            } else {
                path.line_to(p.point);
            }
        }
        self.path = path;
    }

    fn bounds(&self) -> Option<Rect> {
        if self.path.elements().is_empty() {
            None
        } else {
            Some(self.path.bounding_box())
        }
    }

    fn transform(&mut self, affine: Affine) {
        self.path.apply_affine(affine);
    }

    fn clone_content(&self) -> Box<dyn Content<C>> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A detached copy of an entity and its descendants, flattened in drawing
/// order.
///
/// Produced by [`Scene::snapshot`](crate::entity::Scene::snapshot). The
/// copy has no links back into the scene; transforming it never touches the
/// original entities.
pub struct Snapshot<C> {
    parts: Vec<Box<dyn Content<C>>>,
}

impl<C> fmt::Debug for Snapshot<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("parts", &self.parts.len())
            .finish()
    }
}

impl<C> Snapshot<C> {
    pub(crate) fn new(parts: Vec<Box<dyn Content<C>>>) -> Self {
        Self { parts }
    }

    /// Returns the copied contents in drawing order.
    #[must_use]
    pub fn parts(&self) -> &[Box<dyn Content<C>>] {
        &self.parts
    }
}

impl<C: 'static> Content<C> for Snapshot<C> {
    fn bounds(&self) -> Option<Rect> {
        self.parts
            .iter()
            .fold(None, |acc, part| union_bounds(acc, part.bounds()))
    }

    fn transform(&mut self, affine: Affine) {
        for part in &mut self.parts {
            part.transform(affine);
        }
    }

    fn clone_content(&self) -> Box<dyn Content<C>> {
        Box::new(Self {
            parts: self.parts.iter().map(|p| p.clone_content()).collect(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_bounds_skips_empty() {
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(union_bounds(None, None), None);
        assert_eq!(union_bounds(Some(r), None), Some(r));
        assert_eq!(union_bounds(None, Some(r)), Some(r));
        assert_eq!(
            union_bounds(Some(r), Some(Rect::new(2.0, 2.0, 3.0, 3.0))),
            Some(Rect::new(0.0, 0.0, 3.0, 3.0))
        );
    }

    #[test]
    fn point_transform_and_bounds() {
        let mut p = PointContent::new(1.0, 2.0);
        Content::<()>::transform(&mut p, Affine::translate((3.0, 4.0)));
        assert_eq!(p.point, Point::new(4.0, 6.0));
        assert_eq!(
            Content::<()>::bounds(&p),
            Some(Rect::new(4.0, 6.0, 4.0, 6.0))
        );
    }

    #[test]
    fn empty_path_has_no_bounds() {
        let path = PathContent::default();
        assert_eq!(Content::<()>::bounds(&path), None);
    }

    #[test]
    fn snapshot_transforms_every_part() {
        let parts: Vec<Box<dyn Content<()>>> = alloc::vec![
            Box::new(PointContent::new(0.0, 0.0)),
            Box::new(PointContent::new(1.0, 1.0)),
        ];
        let mut snap = Snapshot::new(parts);
        snap.transform(Affine::scale(2.0));
        assert_eq!(snap.bounds(), Some(Rect::new(0.0, 0.0, 2.0, 2.0)));
    }

    #[test]
    fn downcast_through_dyn() {
        let boxed: Box<dyn Content<()>> = Box::new(PointContent::new(5.0, 5.0));
        assert!(boxed.downcast_ref::<PointContent>().is_some());
        assert!(boxed.downcast_ref::<Group>().is_none());
    }

    /// Records what `recompute` could see of its source.
    #[derive(Clone, Debug)]
    struct Watcher {
        source: EntityId,
        seen: Option<(Option<Version>, Option<Rect>, bool)>,
    }

    impl Content<()> for Watcher {
        fn recompute(&mut self, inputs: &Inputs<'_, ()>, _ctx: &mut ()) {
            self.seen = Some((
                inputs.version(self.source),
                inputs.bounds(self.source),
                inputs.content(self.source).is_some(),
            ));
        }

        fn bounds(&self) -> Option<Rect> {
            None
        }

        fn transform(&mut self, _affine: Affine) {}

        fn clone_content(&self) -> Box<dyn Content<()>> {
            Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn inputs_see_live_sources() {
        let mut scene = Scene::<()>::new();
        let source = scene.create_leaf(PointContent::new(1.0, 2.0));
        let watcher = scene.create_leaf(Watcher { source, seen: None });
        scene.update(source, &mut ());
        scene.update(watcher, &mut ());

        let seen = scene.content_as::<Watcher>(watcher).unwrap().seen;
        assert_eq!(
            seen,
            Some((
                Some(scene.version(source)),
                Some(Rect::new(1.0, 2.0, 1.0, 2.0)),
                true
            ))
        );
    }

    #[test]
    fn inputs_treat_destroyed_sources_as_missing() {
        let mut scene = Scene::<()>::new();
        let source = scene.create_leaf(PointContent::new(1.0, 2.0));
        let watcher = scene.create_leaf(Watcher { source, seen: None });
        scene.update(source, &mut ());
        scene.destroy_entity(source);

        scene.update(watcher, &mut ());
        let seen = scene.content_as::<Watcher>(watcher).unwrap().seen;
        assert_eq!(seen, Some((None, None, false)));
    }
}
