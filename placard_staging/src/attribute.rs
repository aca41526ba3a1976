// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-binding attribute mutation staging.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use placard_core::buffer::{AttributeBufferMutator, BindingId, BindingInfo, MutateNode};

/// The mutations recorded for one binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingMutations {
    /// Layout of the binding, as first seen this frame.
    pub info: BindingInfo,
    /// Mutations in the order they were recorded.
    pub nodes: Vec<MutateNode>,
}

impl BindingMutations {
    /// Returns the number of bytes carried by all mutations.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.nodes.iter().map(|n| n.data.len()).sum()
    }
}

/// Collects a frame's attribute mutations grouped by binding.
///
/// Bindings iterate in ascending [`BindingId`] order so that uploads are
/// issued deterministically regardless of overlay order.
#[derive(Clone, Debug, Default)]
pub struct AttributeStaging {
    bindings: BTreeMap<BindingId, BindingMutations>,
    len: usize,
}

impl AttributeStaging {
    /// Creates an empty staging area.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of mutations.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no mutation was recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the mutations for `id`, if any were recorded.
    #[must_use]
    pub fn binding(&self, id: BindingId) -> Option<&BindingMutations> {
        self.bindings.get(&id)
    }

    /// Iterates bindings in ascending id order.
    pub fn bindings(&self) -> impl Iterator<Item = &BindingMutations> {
        self.bindings.values()
    }

    /// Drops all recorded mutations.
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.len = 0;
    }
}

impl AttributeBufferMutator for AttributeStaging {
    fn add_mutation(&mut self, binding: &BindingInfo, node: MutateNode) {
        self.bindings
            .entry(binding.id())
            .or_insert_with(|| BindingMutations {
                info: binding.clone(),
                nodes: Vec::new(),
            })
            .nodes
            .push(node);
        self.len += 1;
    }
}
