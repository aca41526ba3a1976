// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Newline-delimited JSON trace output.
//!
//! Every event becomes one JSON object on its own line, tagged by `"event"`.
//! [`JsonLinesSink`] writes events as they arrive; [`export`] writes a
//! [`RecorderSink`](crate::recorder::RecorderSink) recording after the fact.

use std::io::{self, Write};

use serde_json::{Value, json};

use placard_core::trace::{PhaseBeginEvent, PhaseEndEvent, SubmitEvent, TraceSink, UpdateEvent};

use crate::recorder::RecordedEvent;

/// Converts a recorded event to its JSON object.
#[must_use]
pub fn to_value(event: &RecordedEvent) -> Value {
    match event {
        RecordedEvent::PhaseBegin(e) => json!({
            "event": "phase_begin",
            "frame_index": e.frame_index,
            "phase": e.phase.name(),
        }),
        RecordedEvent::PhaseEnd(e) => json!({
            "event": "phase_end",
            "frame_index": e.frame_index,
            "phase": e.phase.name(),
        }),
        RecordedEvent::Update(e) => json!({
            "event": "update",
            "frame_index": e.frame_index,
            "overlay": {
                "index": e.overlay.index(),
                "generation": e.overlay.generation(),
            },
            "feature": {
                "source": e.feature.source.0,
                "index": e.feature.index,
            },
            "accepted": e.accepted,
        }),
        RecordedEvent::Submit(e) => json!({
            "event": "submit",
            "frame_index": e.frame_index,
            "overlays": e.overlays,
            "indexes": e.indexes,
            "mutations": e.mutations,
        }),
    }
}

/// Writes `events` as JSON lines.
///
/// # Errors
///
/// Returns any error raised by `writer`.
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    for event in events {
        serde_json::to_writer(&mut *writer, &to_value(event))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Streams events as JSON lines to a [`Write`](std::io::Write) destination.
///
/// [`TraceSink`] methods cannot fail, so the first write error is kept and
/// later events are dropped. Check [`error`](Self::error) when done.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> std::fmt::Debug for JsonLinesSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSink")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// Returns the first write error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    /// Flushes and returns the destination.
    ///
    /// # Errors
    ///
    /// Returns the first write error, or the flush error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn emit(&mut self, event: RecordedEvent) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.writer, &to_value(&event))
            .map_err(io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        if let Err(e) = result {
            self.error = Some(e);
        }
    }
}

impl<W: Write> TraceSink for JsonLinesSink<W> {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.emit(RecordedEvent::PhaseBegin(*e));
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.emit(RecordedEvent::PhaseEnd(*e));
    }

    fn on_update(&mut self, e: &UpdateEvent) {
        self.emit(RecordedEvent::Update(*e));
    }

    fn on_submit(&mut self, e: &SubmitEvent) {
        self.emit(RecordedEvent::Submit(*e));
    }
}
