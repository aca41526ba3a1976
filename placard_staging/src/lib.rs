// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Submission staging and damage tracking for placard.
//!
//! This crate sits between [`placard_core`]'s overlay working set and a
//! renderer. Once the external resolver has decided which overlays are on
//! screen, a [`SubmitPlan`] walks them in resolution order and collects what
//! each one contributes to the frame:
//!
//! - [`IndexStaging`]: a bounded index buffer implementing
//!   [`IndexBufferMutator`](placard_core::buffer::IndexBufferMutator).
//! - [`AttributeStaging`]: per-binding vertex attribute mutations
//!   implementing
//!   [`AttributeBufferMutator`](placard_core::buffer::AttributeBufferMutator).
//! - [`DamageRegion`]: the pixel area a renderer has to redraw, derived from
//!   [`OverlayChanges`](placard_core::overlay::OverlayChanges).
//!
//! ```text
//! store.update_all(&screen, ..)   handles refresh against the screen
//! resolver                        set_visible / set_overlay_rank
//! store.evaluate(&screen, ..)     ──▶ OverlayChanges ──▶ DamageRegion
//! plan.stage(&store, &screen, ..) ──▶ SubmitItem[] + staged buffers
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Turns on `placard_core`'s `trace`
//!   feature so staging reports its phase and summary events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod attribute;
mod config;
mod damage;
mod index;
mod plan;

pub use attribute::{AttributeStaging, BindingMutations};
pub use config::StagingConfig;
pub use damage::DamageRegion;
pub use index::IndexStaging;
pub use plan::{SubmitItem, SubmitPlan};
