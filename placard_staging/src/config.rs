// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Staging limits.

/// Sizes the buffers of a [`SubmitPlan`](crate::SubmitPlan).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StagingConfig {
    /// Maximum number of index values staged per frame.
    pub index_capacity: usize,
}

impl StagingConfig {
    /// Room for 65536 indexes.
    pub const DEFAULT: Self = Self {
        index_capacity: 1 << 16,
    };

    /// Returns a copy with another index capacity.
    #[must_use]
    pub const fn with_index_capacity(mut self, index_capacity: usize) -> Self {
        self.index_capacity = index_capacity;
        self
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
