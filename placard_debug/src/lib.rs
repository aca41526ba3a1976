// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for placard frame traces.
//!
//! This crate provides [`TraceSink`](placard_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: keeps every event in memory for later
//!   inspection.
//! - [`json::JsonLinesSink`] and [`json::export`]: newline-delimited JSON,
//!   written live or from a recording.

pub mod json;
pub mod pretty;
pub mod recorder;
