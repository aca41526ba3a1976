// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded index staging.

use alloc::vec::Vec;

use placard_core::buffer::{BufferError, IndexBufferMutator};

/// A fixed-capacity index buffer filled once per frame.
///
/// Appends are all-or-nothing: a batch that does not fit is rejected whole
/// and the staged contents stay as they were.
#[derive(Clone, Debug)]
pub struct IndexStaging {
    indexes: Vec<u32>,
    capacity: usize,
}

impl IndexStaging {
    /// Creates an empty buffer holding at most `capacity` indexes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            indexes: Vec::new(),
            capacity,
        }
    }

    /// Returns the maximum number of indexes.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of staged indexes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Returns `true` if nothing is staged.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Returns the number of indexes that still fit.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.indexes.len()
    }

    /// Returns the staged indexes.
    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.indexes
    }

    /// Drops all staged indexes, keeping the allocation.
    pub fn clear(&mut self) {
        self.indexes.clear();
    }
}

impl IndexBufferMutator for IndexStaging {
    fn append_indexes(&mut self, indexes: &[u32]) -> Result<(), BufferError> {
        let available = self.remaining();
        if indexes.len() > available {
            return Err(BufferError::IndexBufferFull {
                available,
                requested: indexes.len(),
            });
        }
        self.indexes.extend_from_slice(indexes);
        Ok(())
    }
}
