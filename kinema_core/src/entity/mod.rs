// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entity graph data model.
//!
//! An *entity* is a node in a scene's update graph. Each entity has:
//!
//! - An identity ([`EntityId`]), a generational handle that becomes stale
//!   when the entity is destroyed.
//! - A [`kind`](EntityKind): leaves fold freshness over their dependencies,
//!   composites over their children.
//! - A dirty flag and a [`Version`](crate::clock::Version) stamp drawn from
//!   the scene's clock on every clean transition.
//! - A [`DependencyTable`] recording, for each dependency, the version last
//!   observed, plus the sum of those versions at the last clean transition.
//! - Topology: parent, first-child, and sibling links forming ordered
//!   composites.
//! - Content: a boxed [`Content`](crate::content::Content) that rebuilds
//!   derived state and reports bounding geometry, plus any number of
//!   [updaters](crate::updater).
//!
//! Entities are stored in struct-of-arrays layout with index-based handles.
//!
//! # Freshness
//!
//! [`Scene::is_dirty`] decides freshness from versions alone. The change log
//! (see [`dirty`](crate::dirty)) is kept in parallel for bulk reporting via
//! [`Scene::drain_changes`] and never affects update decisions.
//!
//! # Edges
//!
//! Dependency and membership edges together must form a DAG. Any insertion
//! that would close a cycle is refused with a
//! [`CycleError`](crate::error::CycleError).

mod changes;
mod deps;
mod id;
mod store;
mod traverse;
mod update;

pub use changes::SceneChanges;
pub use deps::{DependencyTable, Observation};
pub use id::{EntityId, EntityKind, INVALID};
pub use store::{Scene, SceneConfig};
pub use traverse::Children;
