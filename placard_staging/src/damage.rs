// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel-space damage tracking for partial redraws.

use alloc::vec::Vec;

use kurbo::Rect;
use placard_core::overlay::{OverlayChanges, OverlayStore};
use placard_core::screen::Screen;

/// A region of the viewport that needs redrawing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// The whole viewport needs redrawing.
    #[default]
    Full,
    /// Pixel rectangles that need redrawing. May overlap.
    Rects(Vec<Rect>),
    /// Nothing changed; the previous frame can be reused.
    None,
}

impl DamageRegion {
    /// Derives the damage caused by one [`OverlayStore::evaluate`] call.
    ///
    /// Newly shown overlays damage their current bounds on `screen`; hidden
    /// and removed ones damage the bounds they were last presented at.
    /// Rank changes alone do not move pixels and cause no damage.
    ///
    /// A camera change invalidates every overlay at once; callers should
    /// merge in [`DamageRegion::Full`] for such frames.
    #[must_use]
    pub fn from_changes(store: &OverlayStore, changes: &OverlayChanges, screen: &Screen) -> Self {
        let rects: Vec<Rect> = changes
            .shown
            .iter()
            .filter_map(|&idx| store.get_at(idx))
            .map(|handle| handle.pixel_rect(screen))
            .chain(changes.vacated.iter().copied())
            .collect();
        if rects.is_empty() {
            Self::None
        } else {
            Self::Rects(rects)
        }
    }

    /// Returns `true` if no region needs redrawing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&mut *self, other) {
            (Self::Full, _) | (_, Self::None) => {}
            (_, Self::Full) => *self = Self::Full,
            (Self::None, _) => *self = other.clone(),
            (Self::Rects(a), Self::Rects(b)) => a.extend_from_slice(b),
        }
    }

    /// Returns a single rectangle covering the damage, with `viewport`
    /// standing in for [`Full`](Self::Full).
    #[must_use]
    pub fn bounds(&self, viewport: Rect) -> Option<Rect> {
        match self {
            Self::Full => Some(viewport),
            Self::Rects(rects) => rects.iter().copied().reduce(|a, b| a.union(b)),
            Self::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::{Point, Size};
    use placard_core::overlay::{Anchor, FeatureId, SourceId, SquareHandle};
    use placard_core::priority::Priority;
    use placard_core::trace::Tracer;

    use super::*;

    fn square(at: Point) -> SquareHandle {
        SquareHandle::new(
            FeatureId::new(SourceId(0), 0),
            Anchor::Center,
            at,
            Size::new(10.0, 10.0),
            Priority::default(),
        )
    }

    fn approx(a: Rect, b: Rect) -> bool {
        [a.x0 - b.x0, a.y0 - b.y0, a.x1 - b.x1, a.y1 - b.y1]
            .iter()
            .all(|d| d.abs() < 1e-9)
    }

    #[test]
    fn merge_rules() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(5.0, 5.0, 6.0, 6.0);

        let mut d = DamageRegion::None;
        d.merge(&DamageRegion::Rects(vec![a]));
        d.merge(&DamageRegion::None);
        d.merge(&DamageRegion::Rects(vec![b]));
        assert_eq!(d, DamageRegion::Rects(vec![a, b]));
        assert_eq!(d.bounds(Rect::ZERO), Some(Rect::new(0.0, 0.0, 6.0, 6.0)));

        d.merge(&DamageRegion::Full);
        d.merge(&DamageRegion::Rects(vec![a]));
        assert_eq!(d, DamageRegion::Full);
        assert!(DamageRegion::None.is_empty());
        assert_eq!(DamageRegion::None.bounds(a), None);
    }

    #[test]
    fn shown_and_hidden_overlays_damage_their_bounds() {
        let screen = Screen::default();
        let mut store = OverlayStore::new();
        let id = store.insert(square(Point::new(320.0, 240.0)));
        let _ = store.update_all(&screen, 0, &mut Tracer::none());
        let changes = store.evaluate(&screen, 0, &mut Tracer::none());
        assert!(
            DamageRegion::from_changes(&store, &changes, &screen).is_empty(),
            "an inserted but hidden overlay draws nothing"
        );

        let expected = Rect::new(315.0, 235.0, 325.0, 245.0);
        store.set_visible(id, true);
        let changes = store.evaluate(&screen, 0, &mut Tracer::none());
        let DamageRegion::Rects(rects) = DamageRegion::from_changes(&store, &changes, &screen)
        else {
            panic!("showing an overlay damages its bounds");
        };
        assert_eq!(rects.len(), 1);
        assert!(approx(rects[0], expected), "{:?}", rects[0]);

        let _ = store.remove(id);
        let changes = store.evaluate(&screen, 0, &mut Tracer::none());
        let DamageRegion::Rects(rects) = DamageRegion::from_changes(&store, &changes, &screen)
        else {
            panic!("removing a shown overlay damages where it was");
        };
        assert_eq!(rects.len(), 1);
        assert!(approx(rects[0], expected), "{:?}", rects[0]);
    }
}
