// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-size pixel square pinned to a geographic point.

use alloc::vec;

use kurbo::{Point, Rect, Size, Vec2};

use crate::priority::Priority;
use crate::screen::Screen;

use super::anchor::Anchor;
use super::handle::{OverlayBase, OverlayHandle, Rects};
use super::id::FeatureId;

/// The reference overlay: a constant pixel-size rectangle whose anchor
/// point sits on a geographic pivot.
///
/// The footprint does not depend on zoom or rotation, only on where the pivot
/// projects.
#[derive(Clone, Debug)]
pub struct SquareHandle {
    base: OverlayBase,
    global_pivot: Point,
    pixel_half_size: Size,
}

impl SquareHandle {
    /// Creates a handle covering `pixel_size` around `global_pivot`.
    #[must_use]
    pub fn new(
        feature: FeatureId,
        anchor: Anchor,
        global_pivot: Point,
        pixel_size: Size,
        priority: Priority,
    ) -> Self {
        Self {
            base: OverlayBase::new(feature, anchor, priority),
            global_pivot,
            pixel_half_size: pixel_size / 2.0,
        }
    }

    /// Returns the geographic pivot.
    #[inline]
    #[must_use]
    pub fn global_pivot(&self) -> Point {
        self.global_pivot
    }

    /// Returns half the pixel size.
    #[inline]
    #[must_use]
    pub fn pixel_half_size(&self) -> Size {
        self.pixel_half_size
    }
}

impl OverlayHandle for SquareHandle {
    fn base(&self) -> &OverlayBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OverlayBase {
        &mut self.base
    }

    fn pixel_rect(&self, screen: &Screen) -> Rect {
        let dir = self.base.anchor().direction();
        let half = self.pixel_half_size;
        let pivot = screen.global_to_pixel(self.global_pivot);
        let center = pivot - Vec2::new(dir.x * half.width, dir.y * half.height);
        Rect::from_center_size(center, half * 2.0)
    }

    fn pixel_shape(&self, screen: &Screen) -> Rects {
        vec![self.pixel_rect(screen)]
    }

    fn pivot(&self, screen: &Screen) -> Point {
        screen.global_to_pixel(self.global_pivot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::id::SourceId;

    const EPS: f64 = 1e-9;

    fn assert_rect_eq(a: Rect, b: Rect) {
        assert!(
            (a.x0 - b.x0).abs() < EPS
                && (a.y0 - b.y0).abs() < EPS
                && (a.x1 - b.x1).abs() < EPS
                && (a.y1 - b.y1).abs() < EPS,
            "{a:?} != {b:?}"
        );
    }

    fn handle(anchor: Anchor, pivot: Point) -> SquareHandle {
        SquareHandle::new(
            FeatureId::new(SourceId(1), 1),
            anchor,
            pivot,
            Size::new(20.0, 10.0),
            Priority::default(),
        )
    }

    #[test]
    fn centred_square_surrounds_projected_pivot() {
        let screen = Screen::default();
        let h = handle(Anchor::Center, screen.origin());
        assert_rect_eq(h.pixel_rect(&screen), Rect::new(310.0, 235.0, 330.0, 245.0));
        assert_eq!(h.pixel_shape(&screen).len(), 1);
    }

    #[test]
    fn anchor_moves_shape_away_from_pivot() {
        let screen = Screen::default();
        let pivot = screen.origin();

        let left_top = handle(Anchor::LeftTop, pivot).pixel_rect(&screen);
        assert_rect_eq(left_top, Rect::new(320.0, 240.0, 340.0, 250.0));

        let right = handle(Anchor::Right, pivot).pixel_rect(&screen);
        assert_rect_eq(right, Rect::new(300.0, 235.0, 320.0, 245.0));

        let bottom = handle(Anchor::Bottom, pivot).pixel_rect(&screen);
        assert_rect_eq(bottom, Rect::new(310.0, 230.0, 330.0, 240.0));
    }

    #[test]
    fn pivot_is_projected_global_point() {
        let mut screen = Screen::default();
        screen.rotate_by(0.3);
        screen.scale_by(2.0);
        let global = Point::new(12.0, -4.0);
        let h = handle(Anchor::RightBottom, global);
        let expected = screen.global_to_pixel(global);
        let pivot = h.pivot(&screen);
        assert!((pivot - expected).hypot() < EPS);

        // The generic anchored-corner rule agrees with the override.
        let r = h.pixel_rect(&screen);
        assert!((Point::new(r.x1, r.y1) - expected).hypot() < EPS);
    }

    #[test]
    fn size_is_independent_of_zoom() {
        let mut screen = Screen::default();
        let h = handle(Anchor::Center, Point::new(1.0, 1.0));
        let before = h.pixel_rect(&screen).size();
        screen.scale_by(8.0);
        screen.rotate_by(1.0);
        let after = h.pixel_rect(&screen).size();
        assert!((before.width - after.width).abs() < EPS);
        assert!((before.height - after.height).abs() < EPS);
    }
}
