// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-order event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps a copy of every event
//! it receives, in arrival order, as a [`RecordedEvent`].

use kinema_core::trace::{
    DependencyRefreshEvent, MarkCleanEvent, MaterializeEvent, RecomputeEvent, TraceSink,
    UpdateBeginEvent, UpdateEndEvent, UpdatersEvent,
};

/// One recorded trace event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// See [`UpdateBeginEvent`].
    UpdateBegin(UpdateBeginEvent),
    /// See [`UpdateEndEvent`].
    UpdateEnd(UpdateEndEvent),
    /// See [`DependencyRefreshEvent`].
    DependencyRefresh(DependencyRefreshEvent),
    /// See [`RecomputeEvent`].
    Recompute(RecomputeEvent),
    /// See [`UpdatersEvent`].
    Updaters(UpdatersEvent),
    /// See [`MarkCleanEvent`].
    MarkClean(MarkCleanEvent),
    /// See [`MaterializeEvent`].
    Materialize(MaterializeEvent),
}

/// A [`TraceSink`] that records every event in order.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TraceSink for RecorderSink {
    fn on_update_begin(&mut self, e: &UpdateBeginEvent) {
        self.events.push(RecordedEvent::UpdateBegin(*e));
    }

    fn on_update_end(&mut self, e: &UpdateEndEvent) {
        self.events.push(RecordedEvent::UpdateEnd(*e));
    }

    fn on_dependency_refresh(&mut self, e: &DependencyRefreshEvent) {
        self.events.push(RecordedEvent::DependencyRefresh(*e));
    }

    fn on_recompute(&mut self, e: &RecomputeEvent) {
        self.events.push(RecordedEvent::Recompute(*e));
    }

    fn on_updaters(&mut self, e: &UpdatersEvent) {
        self.events.push(RecordedEvent::Updaters(*e));
    }

    fn on_mark_clean(&mut self, e: &MarkCleanEvent) {
        self.events.push(RecordedEvent::MarkClean(*e));
    }

    fn on_materialize(&mut self, e: &MaterializeEvent) {
        self.events.push(RecordedEvent::Materialize(*e));
    }
}
