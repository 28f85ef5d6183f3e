// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the update protocol.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! update walk calls at each step. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Entities are identified by slot index in events; pair with
//! [`EntityId::index`](crate::entity::EntityId::index) to correlate.

use crate::clock::Version;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why an entity's content was recomputed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecomputeCause {
    /// The entity itself was dirty when the update began.
    SelfDirty,
    /// The entity was clean, but at least one dependency was refreshed.
    DependencyChanged,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when an entity's update begins.
#[derive(Clone, Copy, Debug)]
pub struct UpdateBeginEvent {
    /// Slot index of the entity.
    pub entity: u32,
    /// Whether the entity reported dirty on entry.
    pub was_dirty: bool,
}

/// Emitted when an entity's update finishes.
#[derive(Clone, Copy, Debug)]
pub struct UpdateEndEvent {
    /// Slot index of the entity.
    pub entity: u32,
    /// Whether anything changed (the return value of `update`).
    pub changed: bool,
    /// Version after the update.
    pub version: Version,
}

/// Emitted when a dependency was brought up to date and re-observed.
#[derive(Clone, Copy, Debug)]
pub struct DependencyRefreshEvent {
    /// Slot index of the dependent.
    pub entity: u32,
    /// Slot index of the dependency.
    pub dependency: u32,
    /// The dependency's version as now recorded.
    pub observed: Version,
}

/// Emitted before an entity's content recomputes.
#[derive(Clone, Copy, Debug)]
pub struct RecomputeEvent {
    /// Slot index of the entity.
    pub entity: u32,
    /// Why it recomputes.
    pub cause: RecomputeCause,
}

/// Emitted after an entity's updaters ran.
#[derive(Clone, Copy, Debug)]
pub struct UpdatersEvent {
    /// Slot index of the entity.
    pub entity: u32,
    /// How many updaters ran.
    pub count: usize,
}

/// Emitted for every clean transition.
#[derive(Clone, Copy, Debug)]
pub struct MarkCleanEvent {
    /// Slot index of the entity.
    pub entity: u32,
    /// The freshly drawn version stamp.
    pub version: Version,
    /// Dependency version sum recorded as the new baseline.
    pub dependency_sum: u64,
}

/// Emitted when a transform proxy builds a new materialized copy.
#[derive(Clone, Copy, Debug)]
pub struct MaterializeEvent {
    /// Slot index of the proxied entity.
    pub target: u32,
    /// Total materializations performed by the proxy, including this one.
    pub materializations: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the update protocol.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when an entity's update begins.
    fn on_update_begin(&mut self, e: &UpdateBeginEvent) {
        _ = e;
    }

    /// Called when an entity's update finishes.
    fn on_update_end(&mut self, e: &UpdateEndEvent) {
        _ = e;
    }

    /// Called when a dependency observation is refreshed.
    fn on_dependency_refresh(&mut self, e: &DependencyRefreshEvent) {
        _ = e;
    }

    /// Called before content recomputes.
    fn on_recompute(&mut self, e: &RecomputeEvent) {
        _ = e;
    }

    /// Called after updaters ran.
    fn on_updaters(&mut self, e: &UpdatersEvent) {
        _ = e;
    }

    /// Called for every clean transition.
    fn on_mark_clean(&mut self, e: &MarkCleanEvent) {
        _ = e;
    }

    /// Called when a proxy materializes.
    fn on_materialize(&mut self, e: &MaterializeEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

/// Generates a `Tracer` method forwarding one event type to the sink.
macro_rules! emit {
    ($(#[$meta:meta])* $name:ident, $event:ty, $hook:ident) => {
        $(#[$meta])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$hook(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    emit!(
        /// Emits an [`UpdateBeginEvent`].
        update_begin, UpdateBeginEvent, on_update_begin
    );
    emit!(
        /// Emits an [`UpdateEndEvent`].
        update_end, UpdateEndEvent, on_update_end
    );
    emit!(
        /// Emits a [`DependencyRefreshEvent`].
        dependency_refresh, DependencyRefreshEvent, on_dependency_refresh
    );
    emit!(
        /// Emits a [`RecomputeEvent`].
        recompute, RecomputeEvent, on_recompute
    );
    emit!(
        /// Emits an [`UpdatersEvent`].
        updaters, UpdatersEvent, on_updaters
    );
    emit!(
        /// Emits a [`MarkCleanEvent`].
        mark_clean, MarkCleanEvent, on_mark_clean
    );
    emit!(
        /// Emits a [`MaterializeEvent`].
        materialize, MaterializeEvent, on_materialize
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_clean() -> MarkCleanEvent {
        MarkCleanEvent {
            entity: 3,
            version: Version(7),
            dependency_sum: 12,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_update_begin(&UpdateBeginEvent {
            entity: 0,
            was_dirty: true,
        });
        sink.on_mark_clean(&sample_clean());
        sink.on_materialize(&MaterializeEvent {
            target: 0,
            materializations: 1,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.mark_clean(&sample_clean());
        tracer.recompute(&RecomputeEvent {
            entity: 1,
            cause: RecomputeCause::SelfDirty,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            versions: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_mark_clean(&mut self, e: &MarkCleanEvent) {
                self.versions.push(e.version.get());
            }
        }

        let mut sink = RecordingSink {
            versions: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.mark_clean(&sample_clean());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.versions, &[7]);
    }
}
