// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads events recorded by a
//! [`RecorderSink`](super::recorder::RecorderSink) and writes
//! [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! The update protocol has no wall clock, so each event's position in the
//! recording is used as its timestamp (one "microsecond" per event). Update
//! begin/end pairs become nested duration slices; everything else becomes an
//! instant event.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::RecordedEvent;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    let mut out: Vec<Value> = Vec::with_capacity(events.len());

    for (seq, recorded) in events.iter().enumerate() {
        let ts = seq as f64;
        let value = match recorded {
            RecordedEvent::UpdateBegin(e) => json!({
                "ph": "B",
                "name": format!("update #{}", e.entity),
                "cat": "Update",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "args": {
                    "entity": e.entity,
                    "was_dirty": e.was_dirty,
                }
            }),
            RecordedEvent::UpdateEnd(e) => json!({
                "ph": "E",
                "name": format!("update #{}", e.entity),
                "cat": "Update",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "args": {
                    "changed": e.changed,
                    "version": e.version.get(),
                }
            }),
            RecordedEvent::DependencyRefresh(e) => instant(
                "DependencyRefresh",
                ts,
                json!({
                    "entity": e.entity,
                    "dependency": e.dependency,
                    "observed": e.observed.get(),
                }),
            ),
            RecordedEvent::Recompute(e) => instant(
                "Recompute",
                ts,
                json!({
                    "entity": e.entity,
                    "cause": format!("{:?}", e.cause),
                }),
            ),
            RecordedEvent::Updaters(e) => instant(
                "Updaters",
                ts,
                json!({
                    "entity": e.entity,
                    "count": e.count,
                }),
            ),
            RecordedEvent::MarkClean(e) => instant(
                "MarkClean",
                ts,
                json!({
                    "entity": e.entity,
                    "version": e.version.get(),
                    "dependency_sum": e.dependency_sum,
                }),
            ),
            RecordedEvent::Materialize(e) => instant(
                "Materialize",
                ts,
                json!({
                    "target": e.target,
                    "materializations": e.materializations,
                }),
            ),
        };
        out.push(value);
    }

    serde_json::to_writer_pretty(writer, &out)?;
    Ok(())
}

fn instant(name: &str, ts: f64, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": "Update",
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}
