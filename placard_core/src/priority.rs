// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay priority encoding.
//!
//! A [`Priority`] packs three disjoint fields into one `u64` so that plain
//! integer comparison orders overlays:
//!
//! ```text
//!   63      56 55      48 47                              16 15       0
//!  ┌──────────┬──────────┬──────────────────────────────────┬──────────┐
//!  │ min zoom │  manual  │           depth key              │ reserved │
//!  └──────────┴──────────┴──────────────────────────────────┴──────────┘
//! ```
//!
//! The zoom-level field dominates, then the manual field, then the depth
//! key. Each [`PriorityMask`] selects one field so two priorities can be
//! compared on a subset of fields; [`PriorityMask::ALL`] is their union.

use core::cmp::Ordering;
use core::fmt;
use core::ops::{BitAnd, BitOr};

/// Depths are clamped to `[MIN_DEPTH, MAX_DEPTH]` before encoding.
pub const MIN_DEPTH: f32 = -100_000.0;

/// Upper clamp for depths; see [`MIN_DEPTH`].
pub const MAX_DEPTH: f32 = 100_000.0;

const ZOOM_SHIFT: u32 = 56;
const MANUAL_SHIFT: u32 = 48;
const DEPTH_SHIFT: u32 = 16;

/// A bit-mask selecting fields of a [`Priority`] for partial comparison.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriorityMask(pub u64);

impl PriorityMask {
    /// Selects the minimum-zoom-level field.
    pub const ZOOM_LEVEL: Self = Self(0xFF00_0000_0000_0000);
    /// Selects the manual ordering field.
    pub const MANUAL: Self = Self(0x00FF_0000_0000_0000);
    /// Selects the fine-grained depth field.
    pub const RANK: Self = Self(0x0000_FFFF_FFFF_0000);
    /// Selects every field.
    pub const ALL: Self = Self(Self::ZOOM_LEVEL.0 | Self::MANUAL.0 | Self::RANK.0);

    /// Returns the fields selected by both masks.
    #[inline]
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Returns the fields selected by either mask.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for PriorityMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitAnd for PriorityMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl BitOr for PriorityMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Debug for PriorityMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PriorityMask({:#018x})", self.0)
    }
}

/// A composite overlay ordering key; greater wins.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Priority(pub u64);

impl Priority {
    /// Returns the bits selected by `mask`.
    #[inline]
    #[must_use]
    pub const fn masked(self, mask: PriorityMask) -> u64 {
        self.0 & mask.0
    }

    /// Compares two priorities on the fields selected by `mask` only.
    #[inline]
    #[must_use]
    pub fn cmp_masked(self, other: Self, mask: PriorityMask) -> Ordering {
        self.masked(mask).cmp(&other.masked(mask))
    }

    /// Returns the minimum zoom level field.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the field is 8 bits wide"
    )]
    pub const fn min_zoom_level(self) -> u8 {
        (self.0 >> ZOOM_SHIFT) as u8
    }

    /// Returns the manual ordering field.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the field is 8 bits wide"
    )]
    pub const fn manual(self) -> u8 {
        (self.0 >> MANUAL_SHIFT) as u8
    }

    /// Returns the encoded depth key.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the field is 32 bits wide"
    )]
    pub const fn depth_key(self) -> u32 {
        (self.0 >> DEPTH_SHIFT) as u32
    }
}

impl fmt::Debug for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Priority(zoom={} manual={} depth={:#010x})",
            self.min_zoom_level(),
            self.manual(),
            self.depth_key()
        )
    }
}

/// Packs an overlay's ordering inputs into a [`Priority`].
///
/// - `min_zoom_level` is the lowest zoom at which the overlay is eligible,
///   clamped to `0..=255`. Overlays eligible only at higher zooms rank higher:
///   one eligible from a low zoom is shown at more zoom levels and yields to
///   the more specific ones.
/// - `manual` is an explicit ordering value from styling.
/// - `depth` is a continuous tie-break, clamped to
///   [`MIN_DEPTH`]`..=`[`MAX_DEPTH`]; NaN encodes as the minimum.
///
/// The result depends only on the inputs, never on construction order.
#[must_use]
pub fn compute_priority(min_zoom_level: i32, manual: u8, depth: f32) -> Priority {
    let zoom = u64::from(min_zoom_level.clamp(0, 0xFF).unsigned_abs());
    Priority(
        (zoom << ZOOM_SHIFT)
            | (u64::from(manual) << MANUAL_SHIFT)
            | (u64::from(depth_key(depth)) << DEPTH_SHIFT),
    )
}

/// Maps a depth to a `u32` whose unsigned order matches the float order.
fn depth_key(depth: f32) -> u32 {
    let clamped = if depth.is_nan() {
        MIN_DEPTH
    } else {
        depth.clamp(MIN_DEPTH, MAX_DEPTH)
    };
    // Adding zero folds -0.0 into +0.0.
    let bits = (clamped + 0.0).to_bits();
    if bits & 0x8000_0000 != 0 {
        !bits
    } else {
        bits | 0x8000_0000
    }
}
