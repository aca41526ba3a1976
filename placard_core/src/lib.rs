// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen transforms, overlay priorities and overlay handles for map
//! decoration placement.
//!
//! `placard_core` decides, for every on-screen decoration attached to a map
//! feature (icon, label, path-following text), where it sits in pixel space
//! under the current camera, how it ranks when it competes with other
//! decorations for space, and how its geometry is staged for GPU upload. It
//! is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! One frame flows through the crate like this:
//!
//! ```text
//!   camera gestures ──► Screen mutators (pan / scale / rotate / perspective)
//!                            │
//!                            ▼
//!   scene builder ──► OverlayStore::insert(handle with compute_priority(..))
//!                            │
//!                            ▼
//!                  OverlayStore::update_all(&screen, ..)
//!                            │
//!                            ▼
//!   external resolver ──► intersects() + compare_overlays() ──► set_visible()
//!                            │
//!                            ▼
//!                  OverlayStore::evaluate(&screen, ..) ──► OverlayChanges
//!                            │
//!                            ▼
//!   submission ──► emit_indexes() / emit_attribute_mutation() into mutators
//! ```
//!
//! **[`screen`]**: The [`Screen`](screen::Screen) transform engine, a
//! bidirectional geographic/pixel mapping that recomputes both matrices
//! after every mutation, with an optional pseudo-3D perspective mode.
//!
//! **[`transform`]**: Column-major 4×4 matrix used by the perspective mode.
//!
//! **[`priority`]**: [`compute_priority`](priority::compute_priority) and
//! the masks selecting its sub-fields.
//!
//! **[`buffer`]**: Index storage, binding descriptions and the buffer
//! mutator traits that GPU staging implements.
//!
//! **[`overlay`]**: The [`OverlayHandle`](overlay::OverlayHandle) contract,
//! its reference shapes, and the per-frame [`OverlayStore`](overlay::OverlayStore).
//!
//! **[`dirty`]**: Dirty-tracking channels used by the store.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and the
//! zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod buffer;
pub mod dirty;
pub mod overlay;
pub mod priority;
pub mod screen;
pub mod trace;
pub mod transform;
