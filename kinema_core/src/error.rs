// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural errors.

use core::fmt;

use crate::entity::EntityId;

/// Which kind of edge a rejected operation tried to add.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// `from` would depend on `to`.
    Dependency,
    /// `to` would become a child of `from`.
    Membership,
}

/// Returned when adding an edge would close a cycle in the update graph.
///
/// The update graph contains an edge `a -> b` whenever `b` must be fresh
/// before `a` can be refreshed: `b` is a dependency of `a`, or `b` is a
/// child of composite `a`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleError {
    /// Entity the new edge starts from.
    pub from: EntityId,
    /// Entity the new edge points to.
    pub to: EntityId,
    /// Kind of edge that was rejected.
    pub kind: EdgeKind,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EdgeKind::Dependency => write!(
                f,
                "{:?} cannot depend on {:?}: the update graph would contain a cycle",
                self.from, self.to
            ),
            EdgeKind::Membership => write!(
                f,
                "{:?} cannot contain {:?}: the update graph would contain a cycle",
                self.from, self.to
            ),
        }
    }
}

impl core::error::Error for CycleError {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;
    use crate::content::PointContent;
    use crate::entity::Scene;

    #[test]
    fn display_names_both_ends() {
        let mut scene = Scene::<()>::new();
        let a = scene.create_leaf(PointContent::new(0.0, 0.0));
        let b = scene.create_leaf(PointContent::new(0.0, 0.0));
        scene.add_dependency(a, b).unwrap();
        let err = scene.add_dependency(b, a).unwrap_err();
        assert_eq!(
            err.to_string(),
            "EntityId(1@gen0) cannot depend on EntityId(0@gen0): the update graph would contain a cycle"
        );
    }
}
