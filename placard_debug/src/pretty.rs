// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use placard_core::trace::{PhaseBeginEvent, PhaseEndEvent, SubmitEvent, TraceSink, UpdateEvent};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    excluded_only: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("excluded_only", &self.excluded_only)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            excluded_only: false,
        }
    }

    /// Only print update events for handles that excluded themselves.
    ///
    /// Busy maps update thousands of handles per frame.
    #[must_use]
    pub fn excluded_only(mut self) -> Self {
        self.excluded_only = true;
        self
    }

    /// Returns the destination, consuming the sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {}",
            e.frame_index,
            e.phase.name(),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {}",
            e.frame_index,
            e.phase.name(),
        );
    }

    fn on_update(&mut self, e: &UpdateEvent) {
        if self.excluded_only && e.accepted {
            return;
        }
        let outcome = if e.accepted { "accepted" } else { "EXCLUDED" };
        let _ = writeln!(
            self.writer,
            "[update] frame={} {:?} {:?} {outcome}",
            e.frame_index, e.overlay, e.feature,
        );
    }

    fn on_submit(&mut self, e: &SubmitEvent) {
        let _ = writeln!(
            self.writer,
            "[submit] frame={} overlays={} indexes={} mutations={}",
            e.frame_index, e.overlays, e.indexes, e.mutations,
        );
    }
}
