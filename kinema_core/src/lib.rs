// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental, version-stamped dependency graph for animated diagram
//! objects.
//!
//! `kinema_core` decides *whether* a drawable object is stale, *in what
//! order* to refresh it, and *how* composite objects fold child freshness
//! into their own. It does not decide what changed geometrically (that is
//! supplied through [`Content`](content::Content) hooks) and it does not
//! render. It is `no_std` compatible (with `alloc`) and uses
//! struct-of-arrays storage with generational index handles.
//!
//! # Architecture
//!
//! ```text
//!   mutation (content_mut, set_dirty, add_child, ...)
//!       │
//!       ▼
//!   dirty flag ──► Scene::is_dirty() ◄── dependency versions + sum
//!                         │
//!                         ▼
//!   Scene::update() ──► dependencies ──► children ──► recompute
//!                                                       │
//!                 ┌─────────────────────────────────────┘
//!                 ▼
//!   updaters ──► bounds ──► mark_clean (VersionClock) ──► SceneChanges
//! ```
//!
//! **[`entity`]**: Struct-of-arrays entity graph with generational handles,
//! dependency tables, composite membership, and the update protocol.
//!
//! **[`clock`]**: [`Version`](clock::Version) stamps and the per-scene
//! [`VersionClock`](clock::VersionClock).
//!
//! **[`content`]**: The [`Content`](content::Content) trait and a handful of
//! provided content types.
//!
//! **[`updater`]**: Per-entity mutation callbacks run on every update.
//!
//! **[`proxy`]**: [`TransformProxy`](proxy::TransformProxy), a lazily
//! materialized view of an entity under accumulated transforms.
//!
//! **[`dirty`]**: Change-log channels via `understory_dirty`, drained into
//! [`SceneChanges`](entity::SceneChanges).
//!
//! **[`error`]**: [`CycleError`](error::CycleError).
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! update instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Example
//!
//! ```
//! use kinema_core::content::{PointContent, PolylineContent};
//! use kinema_core::entity::Scene;
//! use kurbo::Rect;
//!
//! let mut scene = Scene::<()>::new();
//! let a = scene.create_leaf(PointContent::new(0.0, 0.0));
//! let b = scene.create_leaf(PointContent::new(2.0, 1.0));
//! let line = scene.create_leaf(PolylineContent::new(vec![a, b]));
//! scene.add_dependency(line, a).unwrap();
//! scene.add_dependency(line, b).unwrap();
//!
//! assert_eq!(
//!     scene.bounding_box(line, &mut ()),
//!     Some(Rect::new(0.0, 0.0, 2.0, 1.0))
//! );
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod clock;
pub mod content;
pub mod dirty;
pub mod entity;
pub mod error;
pub mod proxy;
pub mod trace;
pub mod updater;
