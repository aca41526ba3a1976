// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GPU staging contracts.
//!
//! Overlay handles never talk to a graphics API. At submission time they
//! write into two collaborator traits implemented elsewhere:
//!
//! - [`IndexBufferMutator`] receives a handle's staged index values.
//! - [`AttributeBufferMutator`] receives per-frame vertex attribute data,
//!   addressed by binding and [`MutateRegion`].
//!
//! [`IndexStorage`] is the scratch area a handle fills with its indexes once
//! per rebuild and replays every frame.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

/// Identifies a vertex buffer binding.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindingId(pub u8);

impl fmt::Debug for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BindingId({})", self.0)
    }
}

/// One attribute inside a binding's interleaved vertex layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeDecl {
    /// Shader-side attribute name.
    pub name: &'static str,
    /// Number of `f32` components.
    pub components: u8,
    /// Byte offset within one vertex.
    pub offset: u16,
}

/// Describes a vertex buffer binding: its id, vertex stride and attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingInfo {
    id: BindingId,
    stride: u16,
    attributes: Vec<AttributeDecl>,
}

impl BindingInfo {
    /// Creates a binding with no attributes.
    #[must_use]
    pub fn new(id: BindingId, stride: u16) -> Self {
        Self {
            id,
            stride,
            attributes: Vec::new(),
        }
    }

    /// Adds an attribute declaration.
    #[must_use]
    pub fn with_attribute(mut self, decl: AttributeDecl) -> Self {
        self.attributes.push(decl);
        self
    }

    /// Returns the binding id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> BindingId {
        self.id
    }

    /// Returns the size of one vertex in bytes.
    #[inline]
    #[must_use]
    pub fn stride(&self) -> u16 {
        self.stride
    }

    /// Returns the attribute declarations in insertion order.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeDecl] {
        &self.attributes
    }
}

/// A run of vertices within a binding's buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MutateRegion {
    /// First vertex.
    pub offset: u32,
    /// Number of vertices.
    pub count: u32,
}

impl MutateRegion {
    /// Creates a region.
    #[inline]
    #[must_use]
    pub const fn new(offset: u32, count: u32) -> Self {
        Self { offset, count }
    }
}

/// New contents for one [`MutateRegion`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutateNode {
    /// Target vertices.
    pub region: MutateRegion,
    /// Raw vertex bytes, `region.count * stride` long.
    pub data: Vec<u8>,
}

/// Errors raised by staging operations.
///
/// All of these are contract violations by the caller. The operation that
/// reports one has made no partial change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferError {
    /// No dynamic attribute is registered for this binding.
    AttributeNotFound(BindingId),
    /// Index storage was already allocated with a different size.
    IndexCapacityMismatch {
        /// Size of the existing storage.
        allocated: usize,
        /// Size asked for.
        requested: usize,
    },
    /// Indexes were emitted before any storage was allocated.
    IndexStorageMissing,
    /// The index buffer cannot take this many more indexes.
    IndexBufferFull {
        /// Free slots left in the buffer.
        available: usize,
        /// Indexes offered.
        requested: usize,
    },
    /// A mutation covers a different number of vertices than the registered
    /// region.
    AttributeCountMismatch {
        /// Binding written to.
        binding: BindingId,
        /// Vertices in the registered region.
        expected: u32,
        /// Vertices produced.
        actual: u32,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttributeNotFound(id) => {
                write!(f, "no dynamic attribute registered for binding {}", id.0)
            }
            Self::IndexCapacityMismatch {
                allocated,
                requested,
            } => write!(
                f,
                "index storage holds {allocated} indexes, {requested} requested"
            ),
            Self::IndexStorageMissing => f.write_str("index storage was never allocated"),
            Self::IndexBufferFull {
                available,
                requested,
            } => write!(
                f,
                "index buffer has room for {available} indexes, {requested} offered"
            ),
            Self::AttributeCountMismatch {
                binding,
                expected,
                actual,
            } => write!(
                f,
                "binding {} expects {expected} vertices, got {actual}",
                binding.0
            ),
        }
    }
}

impl core::error::Error for BufferError {}

/// Receives index values at submission time.
pub trait IndexBufferMutator {
    /// Appends all of `indexes`, or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::IndexBufferFull`] if they do not fit.
    fn append_indexes(&mut self, indexes: &[u32]) -> Result<(), BufferError>;
}

/// Receives per-frame vertex attribute data at submission time.
pub trait AttributeBufferMutator {
    /// Records new contents for a region of `binding`'s buffer.
    fn add_mutation(&mut self, binding: &BindingInfo, node: MutateNode);
}

/// A handle-owned scratch area of index values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexStorage {
    indexes: Vec<u32>,
}

impl IndexStorage {
    /// Creates zero-filled storage for `len` indexes.
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self {
            indexes: vec![0; len],
        }
    }

    /// Returns the number of indexes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Returns whether the storage holds no indexes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Returns the indexes.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.indexes
    }

    /// Returns the indexes for writing.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u32] {
        &mut self.indexes
    }
}
