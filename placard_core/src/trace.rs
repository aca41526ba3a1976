// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame instrumentation hooks.
//!
//! [`OverlayStore::update_all`](crate::overlay::OverlayStore::update_all) and
//! the submission stage report what they do to a [`TraceSink`] through a
//! [`Tracer`]. Without the `trace` feature a `Tracer` holds no sink and its
//! methods are empty, so call sites cost nothing.

use crate::overlay::{FeatureId, OverlayId};

/// Which stage of the overlay frame is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Per-handle refresh against the current screen.
    Update,
    /// Draining resolver decisions into frame changes.
    Evaluate,
    /// Staging visible handles into GPU buffers.
    Submit,
}

impl PhaseKind {
    /// Returns a short lowercase name for display.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Evaluate => "evaluate",
            Self::Submit => "submit",
        }
    }
}

/// Marks the beginning of a frame stage.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which stage is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a frame stage.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which stage is ending.
    pub phase: PhaseKind,
}

/// Emitted once per handle after its per-frame refresh.
#[derive(Clone, Copy, Debug)]
pub struct UpdateEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// The handle's slot in the working set.
    pub overlay: OverlayId,
    /// The feature the handle decorates.
    pub feature: FeatureId,
    /// `false` when the handle excluded itself from this frame.
    pub accepted: bool,
}

/// Per-frame submission summary.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubmitEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Overlays staged.
    pub overlays: usize,
    /// Index values written.
    pub indexes: usize,
    /// Attribute mutations written.
    pub mutations: usize,
}

/// Receives trace events from the overlay frame.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the beginning of a frame stage.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a frame stage.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after each handle's per-frame refresh.
    fn on_update(&mut self, e: &UpdateEvent) {
        _ = e;
    }

    /// Called when a frame's overlays have been staged.
    fn on_submit(&mut self, e: &SubmitEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

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

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.dispatch(|s| s.on_phase_begin(e));
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        self.dispatch(|s| s.on_phase_end(e));
    }

    /// Emits an [`UpdateEvent`].
    #[inline]
    pub fn update(&mut self, e: &UpdateEvent) {
        self.dispatch(|s| s.on_update(e));
    }

    /// Emits a [`SubmitEvent`].
    #[inline]
    pub fn submit(&mut self, e: &SubmitEvent) {
        self.dispatch(|s| s.on_submit(e));
    }

    #[inline(always)]
    fn dispatch(&mut self, emit: impl FnOnce(&mut dyn TraceSink)) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            emit(sink);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = emit;
        }
    }
}
