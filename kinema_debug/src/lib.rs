// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for kinema update
//! diagnostics.
//!
//! This crate provides [`TraceSink`](kinema_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output,
//!   indented by update nesting depth.
//! - [`recorder::RecorderSink`]: in-order event recording.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   events, with nested updates as duration slices.

pub mod chrome;
pub mod pretty;
pub mod recorder;
