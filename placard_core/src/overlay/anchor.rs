// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Anchors: which point of an overlay's shape is pinned to its pivot.

use kurbo::Vec2;

/// The point of an overlay's shape that sits on the geographic pivot.
///
/// `Left` means the overlay's left edge touches the pivot, so the shape
/// extends to the right of it; the other variants follow the same rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Shape centred on the pivot.
    #[default]
    Center,
    /// Left edge midpoint on the pivot.
    Left,
    /// Right edge midpoint on the pivot.
    Right,
    /// Top edge midpoint on the pivot.
    Top,
    /// Bottom edge midpoint on the pivot.
    Bottom,
    /// Top-left corner on the pivot.
    LeftTop,
    /// Top-right corner on the pivot.
    RightTop,
    /// Bottom-left corner on the pivot.
    LeftBottom,
    /// Bottom-right corner on the pivot.
    RightBottom,
}

impl Anchor {
    /// Returns the anchored point's position relative to the shape centre,
    /// in units of the shape's half size, pixel Y-down.
    ///
    /// `Center` is `(0, 0)`, `LeftTop` is `(-1, -1)`, `RightBottom` is
    /// `(1, 1)`.
    #[must_use]
    pub const fn direction(self) -> Vec2 {
        let (x, y) = match self {
            Self::Center => (0.0, 0.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
            Self::Top => (0.0, -1.0),
            Self::Bottom => (0.0, 1.0),
            Self::LeftTop => (-1.0, -1.0),
            Self::RightTop => (1.0, -1.0),
            Self::LeftBottom => (-1.0, 1.0),
            Self::RightBottom => (1.0, 1.0),
        };
        Vec2::new(x, y)
    }
}
