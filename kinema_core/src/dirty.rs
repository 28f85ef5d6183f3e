// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change-notification channel constants.
//!
//! Freshness itself is decided by version stamps (see
//! [`entity`](crate::entity)). Alongside that, the scene keeps a
//! multi-channel change log (via [`understory_dirty`]) so that renderers can
//! learn, once per frame, which entities they need to look at again.
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`INVALIDATED`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and mirrors the update
//!   graph: a dependent depends on each of its dependencies, and a composite
//!   depends on each of its children. Marking an entity dirty marks every
//!   entity whose derived state may be affected.
//!
//! - **Local-only**: [`REFRESHED`] is marked whenever an entity receives a
//!   new version stamp.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on membership and lifecycle
//!   changes (create/destroy, add/remove child, dependency edits).
//!
//! # Consumption
//!
//! [`Scene::drain_changes`](crate::entity::Scene::drain_changes) drains all
//! channels and surfaces the results as
//! [`SceneChanges`](crate::entity::SceneChanges).

use understory_dirty::Channel;

/// Entity was marked dirty, directly or through something it depends on.
pub const INVALIDATED: Channel = Channel::new(0);

/// Entity received a new version stamp.
pub const REFRESHED: Channel = Channel::new(1);

/// Membership, lifecycle, or dependency edges changed.
pub const TOPOLOGY: Channel = Channel::new(2);
