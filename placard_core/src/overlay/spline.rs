// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polylines with arc-length walking.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Vec2};

/// A polyline with cached segment lengths.
///
/// Consecutive duplicate points are dropped on construction, so every stored
/// segment has a non-zero length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spline {
    points: Vec<Point>,
    lengths: Vec<f64>,
    length: f64,
}

/// A position on a spline together with the unit tangent there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplineSample {
    /// Position on the polyline.
    pub position: Point,
    /// Unit direction of the segment the position lies on.
    pub direction: Vec2,
}

impl Spline {
    /// Builds a spline through `points`.
    #[must_use]
    pub fn new(points: impl IntoIterator<Item = Point>) -> Self {
        let mut spline = Self::default();
        for p in points {
            spline.push(p);
        }
        spline
    }

    fn push(&mut self, p: Point) {
        if let Some(&last) = self.points.last() {
            let len = last.distance(p);
            if len == 0.0 {
                return;
            }
            self.lengths.push(len);
            self.length += len;
        }
        self.points.push(p);
    }

    /// Returns the vertices.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the total arc length.
    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Returns `true` if the spline has no segment.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Returns the spline with every vertex mapped through `f`.
    #[must_use]
    pub fn transformed(&self, f: impl Fn(Point) -> Point) -> Self {
        Self::new(self.points.iter().map(|&p| f(p)))
    }

    /// Returns the spline walked from the other end.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.points.iter().rev().copied())
    }

    /// Returns the axis-aligned bounds of the vertices.
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        let mut iter = self.points.iter();
        let Some(&first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(Rect::from_points(first, first), |r, &p| r.union_pt(p))
    }

    /// Returns the sample `distance` along the spline, or `None` past either
    /// end.
    #[must_use]
    pub fn sample(&self, distance: f64) -> Option<SplineSample> {
        let mut walker = self.walker();
        walker.advance(distance)
    }

    /// Returns a cursor at the start of the spline.
    #[must_use]
    pub fn walker(&self) -> SplineWalker<'_> {
        SplineWalker {
            spline: self,
            segment: 0,
            offset: 0.0,
        }
    }
}

/// A forward-only cursor over a [`Spline`].
#[derive(Clone, Debug)]
pub struct SplineWalker<'a> {
    spline: &'a Spline,
    segment: usize,
    offset: f64,
}

impl SplineWalker<'_> {
    /// Moves `distance` further along the spline and returns the new
    /// position.
    ///
    /// Returns `None` once the walk leaves the spline; the cursor then stays
    /// at the end. Negative distances are treated as zero.
    pub fn advance(&mut self, distance: f64) -> Option<SplineSample> {
        let lengths = &self.spline.lengths;
        let mut remaining = distance.max(0.0);
        while let Some(&len) = lengths.get(self.segment) {
            if self.offset + remaining <= len {
                self.offset += remaining;
                return Some(self.current(len));
            }
            remaining -= len - self.offset;
            self.segment += 1;
            self.offset = 0.0;
        }
        None
    }

    fn current(&self, len: f64) -> SplineSample {
        let a = self.spline.points[self.segment];
        let b = self.spline.points[self.segment + 1];
        SplineSample {
            position: a.lerp(b, self.offset / len),
            direction: (b - a) / len,
        }
    }
}
