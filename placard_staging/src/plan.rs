// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Submit plan: the visible overlays of one frame and their staged data.

use alloc::vec::Vec;
use core::ops::Range;

use kurbo::Rect;
use placard_core::buffer::BufferError;
use placard_core::overlay::{FeatureId, OverlayId, OverlayStore};
use placard_core::screen::Screen;
use placard_core::trace::{PhaseBeginEvent, PhaseEndEvent, PhaseKind, SubmitEvent, Tracer};

use crate::attribute::AttributeStaging;
use crate::config::StagingConfig;
use crate::index::IndexStaging;

/// One visible overlay in the submit plan.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitItem {
    /// The overlay this item originates from.
    pub overlay: OverlayId,
    /// The feature the overlay decorates.
    pub feature: FeatureId,
    /// The overlay's indexes within [`SubmitPlan::indexes`]. Empty for
    /// handles that do not stage indexes.
    pub index_range: Range<usize>,
    /// Pixel bounds for this frame.
    pub pixel_rect: Rect,
}

/// Everything a renderer needs to draw the overlays of one frame.
///
/// Items are in resolution order, so a renderer drawing them back to front
/// puts the last-placed overlay on top. The plan is meant to be kept and
/// re-staged every frame to reuse its allocations.
#[derive(Clone, Debug)]
pub struct SubmitPlan {
    /// Frame the plan was last staged for.
    pub frame_index: u64,
    /// Visible overlays in resolution order.
    pub items: Vec<SubmitItem>,
    /// Indexes of all items, back to back.
    pub indexes: IndexStaging,
    /// Attribute mutations of all items, grouped by binding.
    pub attributes: AttributeStaging,
}

impl Default for SubmitPlan {
    fn default() -> Self {
        Self::new(&StagingConfig::DEFAULT)
    }
}

impl SubmitPlan {
    /// Creates an empty plan sized by `config`.
    #[must_use]
    pub fn new(config: &StagingConfig) -> Self {
        Self {
            frame_index: 0,
            items: Vec::new(),
            indexes: IndexStaging::new(config.index_capacity),
            attributes: AttributeStaging::new(),
        }
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
        self.indexes.clear();
        self.attributes.clear();
    }

    /// Rebuilds the plan from the visible overlays of `store`.
    ///
    /// Each visible, accepted handle replays its index storage (when it
    /// requires indexes) and emits its dynamic attributes against `screen`.
    ///
    /// # Errors
    ///
    /// Returns the first [`BufferError`] raised by a handle or by the staging
    /// buffers. The plan is left empty in that case.
    pub fn stage(
        &mut self,
        store: &OverlayStore,
        screen: &Screen,
        frame_index: u64,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), BufferError> {
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: PhaseKind::Submit,
        });

        self.clear();
        self.frame_index = frame_index;
        let result = self.stage_items(store, screen);
        match &result {
            Ok(()) => tracer.submit(&SubmitEvent {
                frame_index,
                overlays: self.items.len(),
                indexes: self.indexes.len(),
                mutations: self.attributes.len(),
            }),
            Err(_) => self.clear(),
        }

        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: PhaseKind::Submit,
        });
        result
    }

    fn stage_items(&mut self, store: &OverlayStore, screen: &Screen) -> Result<(), BufferError> {
        for id in store.resolution_order() {
            let handle = store.get(id);
            if !handle.is_visible() {
                continue;
            }

            let start = self.indexes.len();
            let written = handle.emit_indexes(&mut self.indexes)?;
            if handle.has_dynamic_attributes() {
                handle.emit_attribute_mutation(&mut self.attributes, screen)?;
            }

            self.items.push(SubmitItem {
                overlay: id,
                feature: handle.feature_id(),
                index_range: start..start + written,
                pixel_rect: handle.pixel_rect(screen),
            });
        }
        Ok(())
    }
}
