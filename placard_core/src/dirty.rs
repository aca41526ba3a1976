// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! [`OverlayStore`](crate::overlay::OverlayStore) uses multi-channel dirty
//! tracking (via [`understory_dirty`]) to record what the external resolver
//! changed during a frame. Each channel represents an independent category of
//! change. Overlays are independent of each other, so every channel is
//! local-only: no dependency edges exist and nothing propagates.
//!
//! Insertions and removals are not channels; the store keeps them as plain
//! pending lists.
//!
//! # Consumption
//!
//! Callers never query dirty state directly. Each
//! [`OverlayStore::evaluate`](crate::overlay::OverlayStore::evaluate) call
//! drains all channels and surfaces the results as
//! [`OverlayChanges`](crate::overlay::OverlayChanges).

use understory_dirty::Channel;

/// Visibility was set, or the overlay excluded itself from the frame.
pub const VISIBILITY: Channel = Channel::new(0);

/// The overlay moved to another resolution rank.
pub const RANK: Channel = Channel::new(1);
