// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text laid glyph by glyph along a geographic path.
//!
//! Placement is recomputed in [`update`](OverlayHandle::update) every frame:
//! the path is projected to pixels, turned around if it runs right-to-left so
//! the text stays upright, and each glyph is centred on the projected path at
//! its running arc length. The handle refuses the frame if the projected path
//! is shorter than the text.
//!
//! Glyph quads move every frame, so instead of staging indexes the handle
//! pushes four `[f32; 2]` corner positions per glyph into a dynamic attribute.

use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size, Vec2};

use crate::buffer::{
    AttributeBufferMutator, BindingId, BindingInfo, BufferError, MutateNode, MutateRegion,
};
use crate::priority::Priority;
use crate::screen::Screen;

use super::anchor::Anchor;
use super::handle::{OverlayBase, OverlayHandle, Rects};
use super::id::FeatureId;
use super::spline::Spline;

/// Vertices written per glyph.
pub const VERTICES_PER_GLYPH: u32 = 4;

/// Styling inputs for a [`PathTextHandle`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathTextParams {
    /// Pixel size of every glyph, in reading order.
    pub glyphs: Vec<Size>,
    /// Distance along the path to the start of the text. Centred when
    /// `None`.
    pub offset: Option<f64>,
}

/// One glyph's placement for the current frame, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphPlacement {
    /// Glyph centre.
    pub center: Point,
    /// Unit baseline direction.
    pub direction: Vec2,
    /// Glyph size.
    pub size: Size,
}

impl GlyphPlacement {
    /// Returns the rotated quad: left-top, right-top, right-bottom,
    /// left-bottom relative to the baseline direction.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        let along = self.direction * (self.size.width / 2.0);
        let normal = Vec2::new(-self.direction.y, self.direction.x) * (self.size.height / 2.0);
        let c = self.center;
        [
            c - along - normal,
            c + along - normal,
            c + along + normal,
            c - along + normal,
        ]
    }

    /// Returns the axis-aligned bounds of the rotated quad.
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        let [a, b, c, d] = self.corners();
        Rect::from_points(a, b).union_pt(c).union_pt(d)
    }
}

/// An overlay that lays text out along a shared [`Spline`].
#[derive(Clone, Debug)]
pub struct PathTextHandle {
    base: OverlayBase,
    spline: Arc<Spline>,
    params: PathTextParams,
    position_binding: BindingId,
    placements: Vec<GlyphPlacement>,
}

impl PathTextHandle {
    /// Creates a handle and registers `binding` as its per-glyph position
    /// attribute, starting at vertex `first_vertex`.
    ///
    /// `binding` must hold one `[f32; 2]` per vertex.
    #[must_use]
    pub fn new(
        feature: FeatureId,
        spline: Arc<Spline>,
        params: PathTextParams,
        priority: Priority,
        binding: BindingInfo,
        first_vertex: u32,
    ) -> Self {
        let position_binding = binding.id();
        let glyphs = u32::try_from(params.glyphs.len()).unwrap_or(u32::MAX);
        let region = MutateRegion::new(first_vertex, glyphs.saturating_mul(VERTICES_PER_GLYPH));
        let mut base = OverlayBase::new(feature, Anchor::Center, priority);
        base.register_dynamic_attribute(binding, region);
        Self {
            base,
            spline,
            params,
            position_binding,
            placements: Vec::new(),
        }
    }

    /// Returns the geographic path.
    #[must_use]
    pub fn spline(&self) -> &Arc<Spline> {
        &self.spline
    }

    /// Returns the total advance of the text in pixels.
    #[must_use]
    pub fn text_length(&self) -> f64 {
        self.params.glyphs.iter().map(|g| g.width).sum()
    }

    /// Returns the placements computed by the last successful update.
    #[must_use]
    pub fn placements(&self) -> &[GlyphPlacement] {
        &self.placements
    }

    fn place(&mut self, screen: &Screen) -> bool {
        let mut path = self.spline.transformed(|p| screen.global_to_pixel(p));
        let text = self.text_length();
        if path.is_empty() || path.length() < text {
            return false;
        }
        let runs_left = match (path.points().first(), path.points().last()) {
            (Some(first), Some(last)) => first.x > last.x,
            _ => false,
        };
        if runs_left {
            path = path.reversed();
        }

        let slack = path.length() - text;
        let start = match self.params.offset {
            Some(offset) if (0.0..=slack).contains(&offset) => offset,
            Some(_) => return false,
            None => slack / 2.0,
        };

        let mut walker = path.walker();
        let mut step = start;
        for size in &self.params.glyphs {
            step += size.width / 2.0;
            let Some(sample) = walker.advance(step) else {
                return false;
            };
            self.placements.push(GlyphPlacement {
                center: sample.position,
                direction: sample.direction,
                size: *size,
            });
            step = size.width / 2.0;
        }
        true
    }
}

impl OverlayHandle for PathTextHandle {
    fn base(&self) -> &OverlayBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OverlayBase {
        &mut self.base
    }

    fn update(&mut self, screen: &Screen) -> bool {
        self.placements.clear();
        let placed = self.place(screen);
        if !placed {
            self.placements.clear();
        }
        placed
    }

    fn pixel_rect(&self, screen: &Screen) -> Rect {
        let mut rects = self.placements.iter().map(GlyphPlacement::bounding_rect);
        match rects.next() {
            Some(first) => rects.fold(first, |acc, r| acc.union(r)),
            None => self
                .spline
                .transformed(|p| screen.global_to_pixel(p))
                .bounding_rect(),
        }
    }

    fn pixel_shape(&self, _screen: &Screen) -> Rects {
        self.placements
            .iter()
            .map(GlyphPlacement::bounding_rect)
            .collect()
    }

    fn indexes_required(&self) -> bool {
        false
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "GPU vertex positions are single precision"
    )]
    fn emit_attribute_mutation(
        &self,
        mutator: &mut dyn AttributeBufferMutator,
        screen: &Screen,
    ) -> Result<(), BufferError> {
        _ = screen;
        let (info, region) = self.base.attribute_region(self.position_binding)?;
        let vertices: Vec<[f32; 2]> = self
            .placements
            .iter()
            .flat_map(GlyphPlacement::corners)
            .map(|p| [p.x as f32, p.y as f32])
            .collect();
        let actual = u32::try_from(vertices.len()).unwrap_or(u32::MAX);
        if actual != region.count {
            return Err(BufferError::AttributeCountMismatch {
                binding: self.position_binding,
                expected: region.count,
                actual,
            });
        }
        mutator.add_mutation(
            info,
            MutateNode {
                region,
                data: bytemuck::cast_slice(&vertices).to_vec(),
            },
        );
        Ok(())
    }
}
