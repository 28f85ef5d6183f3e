// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Freshness queries and the update protocol.
//!
//! [`Scene::update`] brings one entity up to date in three steps:
//!
//! 1. **Dependencies**: every dependency that is dirty or newer than its
//!    recorded observation is updated first, then re-observed.
//! 2. **Children**: a composite that is about to be re-stamped updates all
//!    of its children, in order.
//! 3. **Finish**: the content recomputes if the entity was dirty or a
//!    dependency changed, updaters run, and if anything changed the entity
//!    refreshes its bounds and is stamped clean.
//!
//! The walk uses an explicit stack, so deep dependency chains do not grow
//! the call stack. Cycles never reach it: they are rejected when edges are
//! added.

use alloc::vec::Vec;

use kurbo::Rect;

use super::id::{EntityId, EntityKind, INVALID};
use super::store::Scene;
use crate::content::{Content, Inputs, Snapshot};
use crate::trace::{
    DependencyRefreshEvent, RecomputeCause, RecomputeEvent, Tracer, UpdateBeginEvent,
    UpdateEndEvent, UpdatersEvent,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Dependencies,
    Children,
    Finish,
}

/// One entity in the middle of being updated.
#[derive(Debug)]
struct Frame {
    idx: u32,
    step: Step,
    /// Position in the dependency table.
    cursor: usize,
    /// Child currently being updated, for composites.
    child: u32,
    /// Set while a nested update for `cursor` or `child` is in flight.
    awaiting: bool,
    /// Explicit flag on entry, before dependencies were consulted.
    flagged: bool,
    was_dirty: bool,
    changed: bool,
}

enum Advance {
    Descend(u32),
    Done(bool),
}

/// One entity in the `tick` walk.
struct Visit {
    idx: u32,
    /// Child currently being walked.
    child: u32,
    entered: bool,
    /// Whether any descendant changed.
    changed: bool,
}

impl Visit {
    fn new(idx: u32) -> Self {
        Self {
            idx,
            child: INVALID,
            entered: false,
            changed: false,
        }
    }
}

/// One leaf whose freshness is being decided.
struct Probe {
    idx: u32,
    pos: usize,
    stale: bool,
    sum: u64,
}

impl<C> Scene<C> {
    /// Returns whether an entity needs an update.
    ///
    /// A leaf is dirty if its flag is set, if any dependency is dirty or has
    /// a version newer than the one observed, or if the sum of its
    /// dependencies' versions differs from the sum recorded when it was last
    /// cleaned. A positive answer is cached in the flag.
    ///
    /// A composite reports only its own flag; its children are brought up to
    /// date when it is updated.
    ///
    /// The sum check catches removed dependencies, but two replacements whose
    /// versions add up to the same total as before go unnoticed.
    pub fn is_dirty(&mut self, id: EntityId) -> bool {
        self.validate(id);
        self.is_dirty_at(id.idx)
    }

    pub(crate) fn is_dirty_at(&mut self, idx: u32) -> bool {
        self.begin_query();
        if let Some(answer) = self.settled_dirty(idx) {
            return answer;
        }

        // Post-order walk over dependencies with an explicit stack. Each slot
        // is decided at most once per query: stale slots keep their flag and
        // clean ones are marked with the query number.
        let mut stack = alloc::vec![Probe {
            idx,
            pos: 0,
            stale: false,
            sum: 0,
        }];
        let mut finished: Option<bool> = None;
        loop {
            let Some(top) = stack.last_mut() else {
                return finished.unwrap_or(false);
            };
            let i = top.idx as usize;
            if let Some(dep_dirty) = finished.take() {
                // The dependency at `pos` was just decided.
                if let Some(obs) = self.deps[i].get(top.pos) {
                    let d = obs.dependency.idx as usize;
                    top.stale |= dep_dirty || self.version[d] > obs.observed;
                    top.sum = top.sum.wrapping_add(self.version[d].get());
                }
                top.pos += 1;
            }

            let mut pending = None;
            while let Some(obs) = self.deps[i].get(top.pos) {
                let d = obs.dependency.idx;
                match self.settled_dirty(d) {
                    Some(dep_dirty) => {
                        top.stale |= dep_dirty || self.version[d as usize] > obs.observed;
                        top.sum = top.sum.wrapping_add(self.version[d as usize].get());
                        top.pos += 1;
                    }
                    None => {
                        pending = Some(d);
                        break;
                    }
                }
            }

            if let Some(d) = pending {
                stack.push(Probe {
                    idx: d,
                    pos: 0,
                    stale: false,
                    sum: 0,
                });
                continue;
            }

            let stale = top.stale || top.sum != self.deps_sum[i];
            if stale {
                self.dirty[i] = true;
            } else {
                self.clean_mark[i] = self.query_number;
            }
            stack.pop();
            finished = Some(stale);
        }
    }

    /// Starts a new freshness query, invalidating earlier clean marks.
    fn begin_query(&mut self) {
        self.query_number = self.query_number.wrapping_add(1);
        if self.query_number == 0 {
            self.clean_mark.fill(0);
            self.query_number = 1;
        }
    }

    /// Answers `is_dirty` without looking at dependencies, when possible.
    fn settled_dirty(&self, idx: u32) -> Option<bool> {
        let i = idx as usize;
        if self.dirty[i] {
            Some(true)
        } else if self.kind[i] == EntityKind::Composite {
            Some(false)
        } else if self.deps[i].is_empty() && self.deps_sum[i] == 0 {
            Some(false)
        } else if self.clean_mark[i] == self.query_number {
            Some(false)
        } else {
            None
        }
    }

    /// Brings an entity up to date. Returns whether anything changed.
    ///
    /// Calling it again right away returns `false` unless the entity has
    /// updaters.
    pub fn update(&mut self, id: EntityId, ctx: &mut C) -> bool {
        self.update_traced(id, ctx, &mut Tracer::none())
    }

    /// Like [`update`](Self::update), reporting each step to `tracer`.
    pub fn update_traced(&mut self, id: EntityId, ctx: &mut C, tracer: &mut Tracer<'_>) -> bool {
        self.validate(id);
        let mut stack: Vec<Frame> = alloc::vec![self.enter(id.idx, tracer)];
        let mut result = false;

        while let Some(frame) = stack.last_mut() {
            match self.advance(frame, ctx, tracer) {
                Advance::Descend(next) => {
                    debug_assert!(
                        stack.iter().all(|f| f.idx != next),
                        "update graph contains a cycle"
                    );
                    let frame = self.enter(next, tracer);
                    stack.push(frame);
                }
                Advance::Done(changed) => {
                    stack.pop();
                    result = changed;
                }
            }
        }
        result
    }

    /// Updates every live entity. Returns whether anything changed.
    ///
    /// Roots are visited in slot order, each followed by its descendants in
    /// pre-order. A composite that gets stamped has already updated its whole
    /// subtree, so the walk skips it. A clean composite is walked into
    /// instead, and if any descendant changed it is restamped with refolded
    /// bounds afterwards, without running its children a second time.
    pub fn tick(&mut self, ctx: &mut C) -> bool {
        let mut changed = false;
        for root in self.roots() {
            changed |= self.tick_from(root.idx, ctx);
        }
        changed
    }

    fn tick_from(&mut self, root: u32, ctx: &mut C) -> bool {
        let mut stack = alloc::vec![Visit::new(root)];
        let mut returned: Option<bool> = None;

        while let Some(top) = stack.last_mut() {
            if let Some(child_changed) = returned.take() {
                top.changed |= child_changed;
                top.child = self.next_sibling[top.child as usize];
            } else if !top.entered {
                top.entered = true;
                if self.update(self.handle(top.idx), ctx) {
                    stack.pop();
                    returned = Some(true);
                    continue;
                }
                top.child = self.first_child[top.idx as usize];
            }

            if top.child != INVALID {
                let child = top.child;
                stack.push(Visit::new(child));
                continue;
            }

            let (idx, changed) = (top.idx, top.changed);
            stack.pop();
            if changed {
                self.restamp_at(idx, &mut Tracer::none());
            }
            returned = Some(changed);
        }
        returned.unwrap_or(false)
    }

    /// Returns the bounding box of an entity, updating it first if dirty.
    pub fn bounding_box(&mut self, id: EntityId, ctx: &mut C) -> Option<Rect> {
        self.refresh(id, ctx);
        self.bounds[id.idx as usize]
    }

    /// Returns the content of an entity, updating it first if dirty.
    pub fn fresh_content(&mut self, id: EntityId, ctx: &mut C) -> &dyn Content<C> {
        self.refresh(id, ctx);
        self.content(id)
    }

    /// Returns a detached copy of an entity, updating it first if dirty.
    ///
    /// Leaves are copied directly. Composites are flattened into a
    /// [`Snapshot`] holding their own content followed by every descendant,
    /// in pre-order.
    pub fn snapshot(&mut self, id: EntityId, ctx: &mut C) -> alloc::boxed::Box<dyn Content<C>>
    where
        C: 'static,
    {
        self.refresh(id, ctx);
        if self.kind[id.idx as usize] == EntityKind::Leaf {
            return self.content(id).clone_content();
        }

        let mut parts = Vec::new();
        let mut stack = alloc::vec![id.idx];
        while let Some(idx) = stack.pop() {
            parts.push(self.content(self.handle(idx)).clone_content());
            // Push children in reverse so they pop in order.
            let first = stack.len();
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
            stack[first..].reverse();
        }
        alloc::boxed::Box::new(Snapshot::new(parts))
    }

    fn refresh(&mut self, id: EntityId, ctx: &mut C) {
        if self.is_dirty(id) {
            self.update(id, ctx);
        }
    }

    fn enter(&mut self, idx: u32, tracer: &mut Tracer<'_>) -> Frame {
        let flagged = self.dirty[idx as usize];
        let was_dirty = self.is_dirty_at(idx);
        tracer.update_begin(&UpdateBeginEvent {
            entity: idx,
            was_dirty,
        });
        Frame {
            idx,
            step: Step::Dependencies,
            cursor: 0,
            child: INVALID,
            awaiting: false,
            flagged,
            was_dirty,
            changed: false,
        }
    }

    fn advance(&mut self, frame: &mut Frame, ctx: &mut C, tracer: &mut Tracer<'_>) -> Advance {
        let i = frame.idx as usize;
        loop {
            match frame.step {
                Step::Dependencies => {
                    if frame.awaiting {
                        // The dependency at `cursor` is fresh now.
                        frame.awaiting = false;
                        if let Some(obs) = self.deps[i].get(frame.cursor) {
                            let observed = self.version[obs.dependency.idx as usize];
                            self.deps[i].observe_at(frame.cursor, observed);
                            tracer.dependency_refresh(&DependencyRefreshEvent {
                                entity: frame.idx,
                                dependency: obs.dependency.idx,
                                observed,
                            });
                        }
                        frame.changed = true;
                        frame.cursor += 1;
                    }
                    while let Some(obs) = self.deps[i].get(frame.cursor) {
                        let d = obs.dependency.idx;
                        let dep_dirty = self.is_dirty_at(d);
                        if dep_dirty || self.version[d as usize] > obs.observed {
                            frame.awaiting = true;
                            return Advance::Descend(d);
                        }
                        frame.cursor += 1;
                    }
                    frame.step = Step::Children;
                    // A composite is only stamped after all of its children
                    // are fresh.
                    let will_stamp =
                        frame.was_dirty || frame.changed || !self.updaters[i].is_empty();
                    frame.child = if self.kind[i] == EntityKind::Composite && will_stamp {
                        self.first_child[i]
                    } else {
                        INVALID
                    };
                }
                Step::Children => {
                    if frame.awaiting {
                        frame.awaiting = false;
                        frame.child = self.next_sibling[frame.child as usize];
                    }
                    if frame.child != INVALID {
                        frame.awaiting = true;
                        return Advance::Descend(frame.child);
                    }
                    frame.step = Step::Finish;
                }
                Step::Finish => return Advance::Done(self.finish(frame, ctx, tracer)),
            }
        }
    }

    fn finish(&mut self, frame: &Frame, ctx: &mut C, tracer: &mut Tracer<'_>) -> bool {
        let idx = frame.idx;
        let mut changed = frame.changed;

        if frame.was_dirty || frame.changed {
            tracer.recompute(&RecomputeEvent {
                entity: idx,
                cause: if frame.flagged {
                    RecomputeCause::SelfDirty
                } else {
                    RecomputeCause::DependencyChanged
                },
            });
            self.recompute_at(idx, ctx);
            changed = true;
        }

        let count = self.run_updaters(idx, ctx);
        if count > 0 {
            tracer.updaters(&UpdatersEvent { entity: idx, count });
            changed = true;
        }

        if changed {
            if self.kind[idx as usize] == EntityKind::Leaf {
                self.recompute_bounds_at(idx);
            }
            self.mark_clean_at(idx, tracer);
        }

        tracer.update_end(&UpdateEndEvent {
            entity: idx,
            changed,
            version: self.version[idx as usize],
        });
        changed
    }

    /// Runs the content's recompute hook with its own slot checked out.
    fn recompute_at(&mut self, idx: u32, ctx: &mut C) {
        let Some(mut content) = self.content[idx as usize].take() else {
            return;
        };
        content.recompute(&Inputs::new(self), ctx);
        self.content[idx as usize] = Some(content);
    }
}
