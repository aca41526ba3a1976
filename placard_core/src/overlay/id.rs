// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay and feature identity types.

use core::fmt;

/// Identifies the data source (tile, dataset) a feature came from.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourceId(pub u32);

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

/// Identifies the map feature an overlay decorates.
///
/// Opaque to the overlay machinery apart from its ordering, which is by
/// source and then by index within the source.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FeatureId {
    /// Where the feature came from.
    pub source: SourceId,
    /// Position of the feature within its source.
    pub index: u32,
}

impl FeatureId {
    /// Creates a feature id.
    #[inline]
    #[must_use]
    pub const fn new(source: SourceId, index: u32) -> Self {
        Self { source, index }
    }
}

impl fmt::Debug for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureId({}:{})", self.source.0, self.index)
    }
}

/// A handle to an overlay in an [`OverlayStore`](super::OverlayStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after an overlay is removed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl OverlayId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OverlayId({}@gen{})", self.idx, self.generation)
    }
}
