// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Lines inside
//! a nested update are indented by nesting depth, so a dependency walk reads
//! as a tree.

use std::io::Write;

use kinema_core::trace::{
    DependencyRefreshEvent, MarkCleanEvent, MaterializeEvent, RecomputeCause, RecomputeEvent,
    TraceSink, UpdateBeginEvent, UpdateEndEvent, UpdatersEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    depth: usize,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer, depth: 0 }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer, depth: 0 }
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn indent(&self) -> String {
        "  ".repeat(self.depth)
    }
}

fn cause_name(cause: RecomputeCause) -> &'static str {
    match cause {
        RecomputeCause::SelfDirty => "self",
        RecomputeCause::DependencyChanged => "dependency",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_update_begin(&mut self, e: &UpdateBeginEvent) {
        let _ = writeln!(
            self.writer,
            "{}[update:begin] entity={} dirty={}",
            self.indent(),
            e.entity,
            e.was_dirty,
        );
        self.depth += 1;
    }

    fn on_update_end(&mut self, e: &UpdateEndEvent) {
        self.depth = self.depth.saturating_sub(1);
        let _ = writeln!(
            self.writer,
            "{}[update:end] entity={} changed={} version={:?}",
            self.indent(),
            e.entity,
            e.changed,
            e.version,
        );
    }

    fn on_dependency_refresh(&mut self, e: &DependencyRefreshEvent) {
        let _ = writeln!(
            self.writer,
            "{}[dep] entity={} dependency={} observed={:?}",
            self.indent(),
            e.entity,
            e.dependency,
            e.observed,
        );
    }

    fn on_recompute(&mut self, e: &RecomputeEvent) {
        let _ = writeln!(
            self.writer,
            "{}[recompute] entity={} cause={}",
            self.indent(),
            e.entity,
            cause_name(e.cause),
        );
    }

    fn on_updaters(&mut self, e: &UpdatersEvent) {
        let _ = writeln!(
            self.writer,
            "{}[updaters] entity={} count={}",
            self.indent(),
            e.entity,
            e.count,
        );
    }

    fn on_mark_clean(&mut self, e: &MarkCleanEvent) {
        let _ = writeln!(
            self.writer,
            "{}[clean] entity={} version={:?} sum={}",
            self.indent(),
            e.entity,
            e.version,
            e.dependency_sum,
        );
    }

    fn on_materialize(&mut self, e: &MaterializeEvent) {
        let _ = writeln!(
            self.writer,
            "{}[materialize] target={} count={}",
            self.indent(),
            e.target,
            e.materializations,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinema_core::clock::Version;
    use kinema_core::content::PointContent;
    use kinema_core::entity::Scene;
    use kinema_core::trace::Tracer;

    #[test]
    fn pretty_print_mark_clean() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_mark_clean(&MarkCleanEvent {
            entity: 4,
            version: Version(9),
            dependency_sum: 3,
        });
        let output = String::from_utf8(sink.writer).unwrap();
        assert_eq!(output, "[clean] entity=4 version=v9 sum=3\n");
    }

    #[test]
    fn nested_updates_are_indented() {
        let mut scene = Scene::<()>::new();
        let a = scene.create_leaf(PointContent::new(0.0, 0.0));
        let b = scene.create_leaf(PointContent::new(0.0, 0.0));
        scene.add_dependency(b, a).unwrap();

        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        scene.update_traced(b, &mut (), &mut Tracer::new(&mut sink));
        let output = String::from_utf8(sink.into_writer()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "[update:begin] entity=1 dirty=true");
        assert_eq!(lines[1], "  [update:begin] entity=0 dirty=true");
        assert!(lines[2].starts_with("    [recompute] entity=0"), "got: {output}");
        assert_eq!(lines.last().copied(), Some("[update:end] entity=1 changed=true version=v2"));
    }
}
