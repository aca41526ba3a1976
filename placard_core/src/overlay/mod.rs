// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay handles and the per-frame working set.
//!
//! An *overlay* is a screen-space decoration (icon, label, path text) attached
//! to a map feature. Each one is represented by an [`OverlayHandle`]:
//!
//! - An identity ([`FeatureId`]), an [`Anchor`] and a
//!   [`Priority`](crate::priority::Priority), all fixed at construction.
//! - **Shape queries** against a caller-supplied
//!   [`Screen`](crate::screen::Screen): a fast-reject
//!   [`pixel_rect`](OverlayHandle::pixel_rect), the exact
//!   [`pixel_shape`](OverlayHandle::pixel_shape), and the symmetric
//!   [`intersects`](OverlayHandle::intersects) predicate built on them.
//! - **Resolver state**: a visibility flag and an [`OverlayRank`], written
//!   only by the external occlusion resolver.
//! - **Staging state**: an index scratch area and a binding-ordered registry
//!   of dynamic attributes, replayed into buffer mutators at submission.
//!
//! Two variants ship with the crate: [`SquareHandle`], a fixed pixel-size
//! box pinned to a geographic point, and [`PathTextHandle`], which lays
//! glyphs along a shared [`Spline`] and re-places them every frame.
//!
//! # Working set
//!
//! [`OverlayStore`] owns the frame's handles behind generational
//! [`OverlayId`]s. Resolver writes go through the store so that
//! [`evaluate`](OverlayStore::evaluate) can report them as
//! [`OverlayChanges`] (see [`dirty`](crate::dirty)).
//!
//! The store never decides visibility itself. A resolver typically walks
//! [`resolution_order`](OverlayStore::resolution_order), tests each handle
//! against those already placed with `intersects`, breaks ties with
//! [`compare_overlays`], and calls
//! [`set_visible`](OverlayStore::set_visible).

mod anchor;
mod handle;
mod id;
mod path_text;
mod spline;
mod square;
mod store;

pub use anchor::Anchor;
pub use handle::{OverlayBase, OverlayHandle, OverlayRank, Rects, compare_overlays};
pub use id::{FeatureId, OverlayId, SourceId};
pub use path_text::{GlyphPlacement, PathTextHandle, PathTextParams, VERTICES_PER_GLYPH};
pub use spline::{Spline, SplineSample, SplineWalker};
pub use square::SquareHandle;
pub use store::{OverlayChanges, OverlayStore, UpdateReport};
