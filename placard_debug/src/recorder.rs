// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.

use placard_core::trace::{PhaseBeginEvent, PhaseEndEvent, SubmitEvent, TraceSink, UpdateEvent};

/// A trace event captured by [`RecorderSink`].
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// See [`TraceSink::on_phase_begin`].
    PhaseBegin(PhaseBeginEvent),
    /// See [`TraceSink::on_phase_end`].
    PhaseEnd(PhaseEndEvent),
    /// See [`TraceSink::on_update`].
    Update(UpdateEvent),
    /// See [`TraceSink::on_submit`].
    Submit(SubmitEvent),
}

impl RecordedEvent {
    /// Returns the frame the event belongs to.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        match self {
            Self::PhaseBegin(e) => e.frame_index,
            Self::PhaseEnd(e) => e.frame_index,
            Self::Update(e) => e.frame_index,
            Self::Submit(e) => e.frame_index,
        }
    }
}

/// Records events in arrival order.
#[derive(Clone, Debug, Default)]
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

    /// Returns the events of a single frame.
    pub fn frame(&self, frame_index: u64) -> impl Iterator<Item = &RecordedEvent> {
        self.events
            .iter()
            .filter(move |e| e.frame_index() == frame_index)
    }

    /// Takes the recorded events, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<RecordedEvent> {
        std::mem::take(&mut self.events)
    }
}

impl TraceSink for RecorderSink {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.events.push(RecordedEvent::PhaseBegin(*e));
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.events.push(RecordedEvent::PhaseEnd(*e));
    }

    fn on_update(&mut self, e: &UpdateEvent) {
        self.events.push(RecordedEvent::Update(*e));
    }

    fn on_submit(&mut self, e: &SubmitEvent) {
        self.events.push(RecordedEvent::Submit(*e));
    }
}
