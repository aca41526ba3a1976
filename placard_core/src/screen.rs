// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bidirectional mapping between geographic ("global") and device-pixel
//! coordinates.
//!
//! A [`Screen`] is described by a handful of parameters: the pixel viewport,
//! the geographic point shown at the viewport centre (the *origin*), the
//! scale in global units per pixel, and the rotation angle. From those it
//! derives the pixel→global matrix as a fixed composition
//!
//! ```text
//!   translate(-viewport_center) → flip Y → scale(scale) → rotate(angle) → translate(origin)
//! ```
//!
//! and obtains global→pixel by inverting it. Device Y grows downward while
//! geographic Y grows upward, hence the flip.
//!
//! Every mutator updates its parameter and then runs the same recomputation
//! step before returning, so a `Screen` is never observable with matrices
//! that disagree with its parameters or with each other.
//!
//! # Perspective
//!
//! [`Screen::enable_perspective`] tilts the map plane around its near
//! horizontal edge. To keep the visible area the same as in flat mode, the
//! pixel viewport and geographic extent are first expanded by a factor derived
//! from the tilt and field of view; [`Screen::disable_perspective`] undoes the
//! expansion. Flat pixel coordinates are mapped to their tilted on-screen
//! position with [`Screen::project_pixel_point_3d`].

use core::f64::consts::{FRAC_PI_3, FRAC_PI_4, TAU};
use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Point, Rect, Vec2};

use crate::transform::Transform3d;

/// Relative tolerance used when checking that a matrix is a similarity.
const SIMILARITY_TOLERANCE: f64 = 1e-9;

/// Errors from [`Screen`] operations that validate their input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScreenError {
    /// The supplied global→pixel matrix is not a uniform-scale rotation with
    /// a flipped vertical axis, so no scale/angle/origin reproduces it.
    NotSimilarity,
}

impl fmt::Display for ScreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSimilarity => {
                f.write_str("matrix is not a Y-flipped similarity transform")
            }
        }
    }
}

impl core::error::Error for ScreenError {}

/// A rectangle in geographic space, rotated about its own frame's origin.
///
/// `local` is expressed in a frame centred at `center` and rotated by
/// `angle`; a point `p` of that frame lands at `center + rotate(angle) * p`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotatedRect {
    /// Origin of the local frame, in global coordinates.
    pub center: Point,
    /// Rotation of the local frame (radians, counter-clockwise).
    pub angle: f64,
    /// Extent in the local frame.
    pub local: Rect,
}

impl RotatedRect {
    /// Creates a rotated rect.
    #[inline]
    #[must_use]
    pub const fn new(center: Point, angle: f64, local: Rect) -> Self {
        Self {
            center,
            angle,
            local,
        }
    }

    /// Maps a point of the local frame to global coordinates.
    #[must_use]
    pub fn to_global(&self, local: Point) -> Point {
        Affine::rotate(self.angle).then_translate(self.center.to_vec2()) * local
    }

    /// Returns the global position of the local rect's centre.
    #[must_use]
    pub fn global_center(&self) -> Point {
        self.to_global(self.local.center())
    }

    /// Returns the four corners in global coordinates.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        let r = self.local;
        [
            self.to_global(Point::new(r.x0, r.y0)),
            self.to_global(Point::new(r.x1, r.y0)),
            self.to_global(Point::new(r.x1, r.y1)),
            self.to_global(Point::new(r.x0, r.y1)),
        ]
    }

    /// Returns the axis-aligned bounding box of the rotated rect.
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        let [a, b, c, d] = self.corners();
        Rect::from_points(a, b).union_pt(c).union_pt(d)
    }
}

impl From<Rect> for RotatedRect {
    fn from(rect: Rect) -> Self {
        Self {
            center: rect.center(),
            angle: 0.0,
            local: Rect::from_center_size(Point::ZERO, rect.size()),
        }
    }
}

/// Parameters of the pseudo-3D perspective mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveParams {
    /// Tilt of the map plane around the horizontal axis (radians).
    pub rotation_angle: f64,
    /// Vertical field of view of the virtual camera (radians).
    pub field_of_view: f64,
    /// Near clipping plane distance.
    pub near: f64,
    /// Far clipping plane distance.
    pub far: f64,
}

impl PerspectiveParams {
    /// A 45° tilt seen through a 60° field of view.
    pub const DEFAULT: Self = Self {
        rotation_angle: FRAC_PI_4,
        field_of_view: FRAC_PI_3,
        near: 0.1,
        far: 100.0,
    };

    /// Creates parameters for the given tilt and field of view, with the
    /// default clipping planes.
    #[must_use]
    pub const fn new(rotation_angle: f64, field_of_view: f64) -> Self {
        Self {
            rotation_angle,
            field_of_view,
            ..Self::DEFAULT
        }
    }
}

impl Default for PerspectiveParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Derived state of an enabled perspective mode.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Perspective {
    params: PerspectiveParams,
    /// Ratio of the expanded plane's width to the original.
    scale_x: f64,
    /// Ratio of the expanded plane's height to the original.
    scale_y: f64,
    pixel_to_3d: Transform3d,
}

/// Uniform-scale, rotation and translation recovered from a global→pixel
/// matrix by [`extract_similarity_params`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityParams {
    /// Rotation of the matrix in `[0, 2π)`.
    pub angle: f64,
    /// Uniform scale factor (pixels per global unit).
    pub scale: f64,
    /// Horizontal translation.
    pub dx: f64,
    /// Vertical translation.
    pub dy: f64,
}

/// The geographic/pixel transform engine.
///
/// The default screen has a 640×480 viewport at the pixel origin, a scale of
/// 0.1 global units per pixel, no rotation, and origin `(320, 240)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Screen {
    pixel_rect: Rect,
    scale: f64,
    angle: f64,
    origin: Point,

    // -- Derived (written only by `update_dependent`) --
    pixel_to_global: Affine,
    global_to_pixel: Affine,
    global_rect: RotatedRect,
    clip_rect: Rect,

    perspective: Option<Perspective>,
}

impl Default for Screen {
    fn default() -> Self {
        let mut screen = Self {
            pixel_rect: Rect::new(0.0, 0.0, 640.0, 480.0),
            scale: 0.1,
            angle: 0.0,
            origin: Point::new(320.0, 240.0),
            pixel_to_global: Affine::IDENTITY,
            global_to_pixel: Affine::IDENTITY,
            global_rect: RotatedRect::from(Rect::ZERO),
            clip_rect: Rect::ZERO,
            perspective: None,
        };
        screen.update_dependent();
        screen
    }
}

impl Screen {
    /// Creates a screen with the given viewport, fitted to `global_rect`.
    #[must_use]
    pub fn new(pixel_rect: Rect, global_rect: impl Into<RotatedRect>) -> Self {
        let mut screen = Self::default();
        screen.pixel_rect = pixel_rect;
        screen.fit_global_rect(global_rect);
        screen
    }

    /// Creates a screen sharing `base`'s viewport with explicit parameters.
    ///
    /// Perspective state is not carried over.
    #[must_use]
    pub fn with_params(base: &Self, origin: Point, scale: f64, angle: f64) -> Self {
        let mut screen = Self {
            pixel_rect: base.pixel_rect,
            scale,
            angle,
            origin,
            perspective: None,
            ..Self::default()
        };
        screen.update_dependent();
        screen
    }

    // -- Mutators --

    /// Replaces the pixel viewport.
    pub fn set_pixel_rect(&mut self, pixel_rect: Rect) {
        self.pixel_rect = pixel_rect;
        self.update_dependent();
    }

    /// Replaces the pixel viewport with `width × height` pixels at `(x0, y0)`.
    pub fn set_viewport(&mut self, x0: f64, y0: f64, width: f64, height: f64) {
        self.set_pixel_rect(Rect::new(x0, y0, x0 + width, y0 + height));
    }

    /// Fits `global_rect` into the current viewport.
    ///
    /// See [`set_from_rects`](Self::set_from_rects).
    pub fn fit_global_rect(&mut self, global_rect: impl Into<RotatedRect>) {
        let pixel_rect = self.pixel_rect;
        self.set_from_rects(global_rect, pixel_rect);
    }

    /// Chooses scale, angle and origin so that `global_rect` fits inside
    /// `pixel_rect`.
    ///
    /// The scale is the larger of the two per-axis ratios, so the rect is
    /// never cropped but may be over-covered along one axis. The viewport
    /// itself is not replaced.
    pub fn set_from_rects(&mut self, global_rect: impl Into<RotatedRect>, pixel_rect: Rect) {
        let global_rect = global_rect.into();
        let h_scale = global_rect.local.width() / pixel_rect.width();
        let v_scale = global_rect.local.height() / pixel_rect.height();

        self.scale = h_scale.max(v_scale);
        self.angle = global_rect.angle;
        self.origin = global_rect.global_center();
        self.update_dependent();
    }

    /// Sets the geographic point shown at the viewport centre.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
        self.update_dependent();
    }

    /// Pans the map by a pixel delta; content moves by `(dx, dy)` on screen.
    pub fn move_by_pixels(&mut self, dx: f64, dy: f64) {
        let pixel_origin = self.global_to_pixel * self.origin;
        self.origin = self.pixel_to_global * (pixel_origin - Vec2::new(dx, dy));
        self.update_dependent();
    }

    /// Pans the map by a geographic delta (the origin moves by `-delta`).
    pub fn move_by_global(&mut self, delta: Vec2) {
        self.origin -= delta;
        self.update_dependent();
    }

    /// Zooms by `factor`; values above 1 zoom in.
    pub fn scale_by(&mut self, factor: f64) {
        self.scale /= factor;
        self.update_dependent();
    }

    /// Sets the absolute scale in global units per pixel.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
        self.update_dependent();
    }

    /// Rotates by `angle` radians, counter-clockwise in global space.
    pub fn rotate_by(&mut self, angle: f64) {
        self.angle += angle;
        self.update_dependent();
    }

    /// Sets the absolute rotation angle (radians).
    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
        self.update_dependent();
    }

    /// Replaces the global→pixel matrix and re-derives scale, angle and
    /// origin from it.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::NotSimilarity`] if `matrix` is not a uniform
    /// scale plus rotation with a flipped vertical axis (which is what every
    /// screen matrix is). The screen is left unchanged in that case.
    pub fn set_global_to_pixel(&mut self, matrix: Affine) -> Result<(), ScreenError> {
        if !is_flipped_similarity(matrix) {
            return Err(ScreenError::NotSimilarity);
        }
        let params = extract_similarity_params(matrix);
        self.angle = -params.angle;
        self.scale = 1.0 / params.scale;
        self.origin = matrix.inverse() * self.pixel_rect.center();
        self.update_dependent();
        Ok(())
    }

    /// Enables the pseudo-3D mode, tilting the map plane around its near
    /// horizontal edge.
    ///
    /// The viewport and geographic extent are expanded so that, once tilted,
    /// the visible area matches the flat one. Enabling while already enabled
    /// first restores the flat state.
    pub fn enable_perspective(&mut self, params: PerspectiveParams) {
        if self.perspective.is_some() {
            self.disable_perspective();
        }

        let angle = params.rotation_angle;
        let half_fov = params.field_of_view / 2.0;
        let camera_z = 1.0 / half_fov.tan();

        // Ratio of the expanded plane's size to the original size.
        let scale_y = angle.cos() + angle.sin() * (half_fov + angle).tan();
        let scale_x =
            1.0 + 2.0 * angle.sin() * half_fov.cos() / (camera_z * (half_fov + angle).cos());
        let expand = scale_x.max(scale_y);

        let offset_z = camera_z + angle.sin() * expand;
        let offset_y = angle.cos() * expand - 1.0;

        let pixel_to_3d = Transform3d::perspective(camera_z, params.near, params.far)
            * Transform3d::from_translation(0.0, offset_y, offset_z)
            * Transform3d::from_rotation_x(angle)
            * Transform3d::from_scale(expand, expand, 1.0);

        // Keep the near edge in place: grow the extent away from the viewer.
        let dy_global = self.global_rect.local.height() * (expand - 1.0);
        self.origin += self.screen_up() * (dy_global / 2.0);
        self.pixel_rect = Rect::new(
            self.pixel_rect.x0,
            self.pixel_rect.y0,
            self.pixel_rect.x0 + self.pixel_rect.width() * expand,
            self.pixel_rect.y0 + self.pixel_rect.height() * expand,
        );
        self.perspective = Some(Perspective {
            params,
            scale_x: expand,
            scale_y: expand,
            pixel_to_3d,
        });
        self.update_dependent();
    }

    /// Leaves the pseudo-3D mode, restoring the flat viewport and extent.
    ///
    /// Does nothing when perspective is not enabled.
    pub fn disable_perspective(&mut self) {
        let Some(perspective) = self.perspective.take() else {
            return;
        };

        let dy_global = self.global_rect.local.height() * (1.0 - 1.0 / perspective.scale_y);
        self.origin -= self.screen_up() * (dy_global / 2.0);
        self.pixel_rect = Rect::new(
            self.pixel_rect.x0,
            self.pixel_rect.y0,
            self.pixel_rect.x0 + self.pixel_rect.width() / perspective.scale_x,
            self.pixel_rect.y0 + self.pixel_rect.height() / perspective.scale_y,
        );
        self.update_dependent();
    }

    // -- Conversions --

    /// Maps a global point to pixel space.
    #[inline]
    #[must_use]
    pub fn global_to_pixel(&self, p: Point) -> Point {
        self.global_to_pixel * p
    }

    /// Maps a pixel point to global space.
    #[inline]
    #[must_use]
    pub fn pixel_to_global(&self, p: Point) -> Point {
        self.pixel_to_global * p
    }

    /// Maps a global rect to pixel space.
    ///
    /// Only two opposite corners are converted, so under rotation the result
    /// is the rect spanned by those two corners, not the rotated quad.
    #[must_use]
    pub fn global_rect_to_pixel(&self, r: Rect) -> Rect {
        Rect::from_points(
            self.global_to_pixel(Point::new(r.x0, r.y1)),
            self.global_to_pixel(Point::new(r.x1, r.y0)),
        )
    }

    /// Maps a pixel rect to global space.
    ///
    /// Only two opposite corners are converted, as in
    /// [`global_rect_to_pixel`](Self::global_rect_to_pixel).
    #[must_use]
    pub fn pixel_rect_to_global(&self, r: Rect) -> Rect {
        Rect::from_points(
            self.pixel_to_global(Point::new(r.x0, r.y1)),
            self.pixel_to_global(Point::new(r.x1, r.y0)),
        )
    }

    /// Maps a flat pixel point to its perspective-corrected screen position.
    ///
    /// The result is expressed in [`pixel_rect_in_3d`](Self::pixel_rect_in_3d)
    /// space. In flat mode the point is returned unchanged.
    #[must_use]
    pub fn project_pixel_point_3d(&self, p: Point) -> Point {
        let Some(perspective) = &self.perspective else {
            return p;
        };
        let r = self.pixel_rect;
        let nx = 2.0 * (p.x - r.x0) / r.width() - 1.0;
        let ny = -(2.0 * (p.y - r.y0) / r.height() - 1.0);
        let ndc = perspective.pixel_to_3d.project(Point::new(nx, ny));

        let viewport = self.pixel_rect_in_3d();
        Point::new(
            viewport.x0 + (ndc.x + 1.0) * viewport.width() / 2.0,
            viewport.y0 + (1.0 - ndc.y) * viewport.height() / 2.0,
        )
    }

    /// Returns a geographic square of pixel radius `radius` around a pixel
    /// point, aligned with the screen.
    #[must_use]
    pub fn touch_rect(&self, pixel_point: Point, radius: f64) -> RotatedRect {
        self.touch_rect_sized(pixel_point, radius, radius)
    }

    /// Returns a geographic rect of the given pixel half extents around a
    /// pixel point, aligned with the screen.
    #[must_use]
    pub fn touch_rect_sized(
        &self,
        pixel_point: Point,
        half_width: f64,
        half_height: f64,
    ) -> RotatedRect {
        let w = half_width * self.scale;
        let h = half_height * self.scale;
        RotatedRect::new(
            self.pixel_to_global(pixel_point),
            self.angle,
            Rect::new(-w, -h, w, h),
        )
    }

    // -- Accessors --

    /// Returns the pixel viewport.
    #[inline]
    #[must_use]
    pub fn pixel_rect(&self) -> Rect {
        self.pixel_rect
    }

    /// Returns the viewport that is actually displayed.
    ///
    /// While perspective is enabled [`pixel_rect`](Self::pixel_rect) is the
    /// expanded plane; this returns the original, unexpanded viewport.
    #[must_use]
    pub fn pixel_rect_in_3d(&self) -> Rect {
        match &self.perspective {
            Some(p) => Rect::new(
                self.pixel_rect.x0,
                self.pixel_rect.y0,
                self.pixel_rect.x0 + self.pixel_rect.width() / p.scale_x,
                self.pixel_rect.y0 + self.pixel_rect.height() / p.scale_y,
            ),
            None => self.pixel_rect,
        }
    }

    /// Returns the scale in global units per pixel.
    #[inline]
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the rotation angle (radians).
    #[inline]
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Returns the global point at the viewport centre.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Returns the visible geographic area as a rotated rect.
    #[inline]
    #[must_use]
    pub fn global_rect(&self) -> RotatedRect {
        self.global_rect
    }

    /// Returns the axis-aligned bounds of [`global_rect`](Self::global_rect).
    #[inline]
    #[must_use]
    pub fn clip_rect(&self) -> Rect {
        self.clip_rect
    }

    /// Returns the global→pixel matrix.
    #[inline]
    #[must_use]
    pub fn global_to_pixel_matrix(&self) -> Affine {
        self.global_to_pixel
    }

    /// Returns the pixel→global matrix.
    #[inline]
    #[must_use]
    pub fn pixel_to_global_matrix(&self) -> Affine {
        self.pixel_to_global
    }

    /// Returns the viewport width, rounded to whole pixels.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "viewport sizes are far below i32::MAX"
    )]
    pub fn width(&self) -> i32 {
        self.pixel_rect.width().round() as i32
    }

    /// Returns the viewport height, rounded to whole pixels.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "viewport sizes are far below i32::MAX"
    )]
    pub fn height(&self) -> i32 {
        self.pixel_rect.height().round() as i32
    }

    /// Returns the shorter side of the viewport.
    #[must_use]
    pub fn min_pixel_rect_size(&self) -> f64 {
        self.pixel_rect.width().min(self.pixel_rect.height())
    }

    /// Returns whether perspective mode is enabled.
    #[inline]
    #[must_use]
    pub fn is_perspective(&self) -> bool {
        self.perspective.is_some()
    }

    /// Returns the active perspective parameters, if any.
    #[must_use]
    pub fn perspective_params(&self) -> Option<PerspectiveParams> {
        self.perspective.map(|p| p.params)
    }

    /// Returns the plane expansion factors `(x, y)`; `(1, 1)` in flat mode.
    #[must_use]
    pub fn perspective_scale(&self) -> (f64, f64) {
        self.perspective
            .map_or((1.0, 1.0), |p| (p.scale_x, p.scale_y))
    }

    /// Returns the normalized-pixel → clip-space projection matrix, if
    /// perspective is enabled.
    #[must_use]
    pub fn pixel_to_3d_matrix(&self) -> Option<Transform3d> {
        self.perspective.map(|p| p.pixel_to_3d)
    }

    // -- Internal --

    /// Direction of the screen's upward axis in global space (unit length).
    fn screen_up(&self) -> Vec2 {
        Vec2::new(-self.angle.sin(), self.angle.cos())
    }

    /// Rebuilds both matrices and the visible-area rects from the current
    /// parameters. Every mutator ends with this call.
    fn update_dependent(&mut self) {
        let center = self.pixel_rect.center();
        self.pixel_to_global = Affine::translate(-center.to_vec2())
            .then_scale_non_uniform(1.0, -1.0)
            .then_scale(self.scale)
            .then_rotate(self.angle)
            .then_translate(self.origin.to_vec2());
        self.global_to_pixel = self.pixel_to_global.inverse();

        let half_w = self.pixel_rect.width() * self.scale / 2.0;
        let half_h = self.pixel_rect.height() * self.scale / 2.0;
        self.global_rect = RotatedRect::new(
            self.origin,
            self.angle,
            Rect::new(-half_w, -half_h, half_w, half_h),
        );
        self.clip_rect = self.global_rect.bounding_rect();
    }
}

/// Derives the similarity transform mapping `old1 → new1` and `old2 → new2`.
///
/// The scale is the ratio of the pairwise distances and the rotation the
/// difference of their bearings. Used for two-finger gestures.
///
/// `old1` and `old2` must be distinct; coincident points produce a matrix of
/// NaN/infinite coefficients.
#[must_use]
pub fn similarity_transform_between(old1: Point, old2: Point, new1: Point, new2: Point) -> Affine {
    let s = new1.distance(new2) / old1.distance(old2);
    let a = (new2 - new1).atan2() - (old2 - old1).atan2();

    Affine::translate(-old1.to_vec2())
        .then_rotate(a)
        .then_scale(s)
        .then_translate(new1.to_vec2())
}

/// Extracts rotation, scale and translation from a global→pixel matrix.
///
/// Assumes `m` is a similarity transform (possibly with a flipped axis); the
/// result is meaningless otherwise.
#[must_use]
pub fn extract_similarity_params(m: Affine) -> SimilarityParams {
    let [a, b, _, _, dx, dy] = m.as_coeffs();
    SimilarityParams {
        angle: angle_in_2pi((-b).atan2(a)),
        scale: a.hypot(b),
        dx,
        dy,
    }
}

/// Returns whether two screens differ only by panning and rotation, i.e.
/// they show global distances at the same pixel length.
#[must_use]
pub fn is_panning_and_rotate(a: &Screen, b: &Screen) -> bool {
    let r1 = a.global_rect();
    let r2 = b.global_rect();
    let c1 = r1.local.center();
    let c2 = r2.local.center();
    let probe = Vec2::new(c1.x - r1.local.x0, c1.y - r1.local.y0);

    let p1 = a.global_to_pixel(r1.to_global(c1)) - a.global_to_pixel(r1.to_global(c1 + probe));
    let p2 = b.global_to_pixel(r2.to_global(c2)) - b.global_to_pixel(r2.to_global(c2 + probe));

    (p1.x - p2.x).abs() < 1e-5 && (p1.y - p2.y).abs() < 1e-5
}

/// Checks that the linear part of `m` is a uniform scale and rotation
/// composed with a flip of the vertical axis.
fn is_flipped_similarity(m: Affine) -> bool {
    let [a, b, c, d, e, f] = m.as_coeffs();
    if ![a, b, c, d, e, f].iter().all(|v| v.is_finite()) {
        return false;
    }
    let norm = a.hypot(b);
    if norm == 0.0 {
        return false;
    }
    let tolerance = norm * SIMILARITY_TOLERANCE;
    (a + d).abs() <= tolerance && (b - c).abs() <= tolerance
}

/// Normalizes an angle into `[0, 2π)`.
fn angle_in_2pi(angle: f64) -> f64 {
    let wrapped = angle - TAU * (angle / TAU).floor();
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use core::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_point_eq(a: Point, b: Point, eps: f64) {
        assert!(
            (a.x - b.x).abs() < eps && (a.y - b.y).abs() < eps,
            "{a:?} != {b:?}"
        );
    }

    fn assert_rect_eq(a: Rect, b: Rect, eps: f64) {
        assert_point_eq(Point::new(a.x0, a.y0), Point::new(b.x0, b.y0), eps);
        assert_point_eq(Point::new(a.x1, a.y1), Point::new(b.x1, b.y1), eps);
    }

    fn busy_screen() -> Screen {
        let mut screen = Screen::default();
        screen.set_viewport(0.0, 0.0, 800.0, 600.0);
        screen.set_origin(Point::new(1_000.0, -250.0));
        screen.set_scale(3.5);
        screen.set_angle(0.7);
        screen
    }

    #[test]
    fn default_viewport_size() {
        let screen = Screen::default();
        assert_eq!(screen.width(), 640);
        assert_eq!(screen.height(), 480);
        assert_eq!(screen.scale(), 0.1);
        assert_eq!(screen.angle(), 0.0);
        assert!(!screen.is_perspective());
    }

    #[test]
    fn default_maps_viewport_center_to_origin() {
        let screen = Screen::default();
        assert_point_eq(
            screen.pixel_to_global(Point::new(320.0, 240.0)),
            Point::new(320.0, 240.0),
            EPS,
        );
        // One pixel right is 0.1 global units right; one pixel down is 0.1 down.
        assert_point_eq(
            screen.pixel_to_global(Point::new(330.0, 250.0)),
            Point::new(321.0, 239.0),
            EPS,
        );
    }

    #[test]
    fn round_trip_pixel_global_pixel() {
        let screen = busy_screen();
        for &(x, y) in &[(0.0, 0.0), (400.0, 300.0), (799.0, 12.5), (3.0, 599.0)] {
            let p = Point::new(x, y);
            assert_point_eq(screen.global_to_pixel(screen.pixel_to_global(p)), p, 1e-6);
        }
    }

    #[test]
    fn fit_without_crop_uses_larger_ratio() {
        let mut screen = Screen::default();
        screen.set_viewport(0.0, 0.0, 100.0, 100.0);
        screen.fit_global_rect(Rect::new(0.0, 0.0, 200.0, 100.0));
        assert!((screen.scale() - 2.0).abs() < EPS);
        assert_point_eq(screen.origin(), Point::new(100.0, 50.0), EPS);
        // Whole requested rect is visible.
        let visible = screen.clip_rect();
        assert!(visible.x0 <= 0.0 && visible.x1 >= 200.0);
        assert!(visible.y0 <= 0.0 && visible.y1 >= 100.0);
    }

    #[test]
    fn new_fits_rotated_rect() {
        let global = RotatedRect::new(
            Point::new(10.0, 10.0),
            FRAC_PI_2,
            Rect::new(-50.0, -25.0, 50.0, 25.0),
        );
        let screen = Screen::new(Rect::new(0.0, 0.0, 100.0, 100.0), global);
        assert!((screen.scale() - 1.0).abs() < EPS);
        assert!((screen.angle() - FRAC_PI_2).abs() < EPS);
        assert_point_eq(screen.origin(), Point::new(10.0, 10.0), EPS);
    }

    #[test]
    fn move_by_pixels_shifts_content() {
        let mut screen = busy_screen();
        let g = Point::new(1_010.0, -240.0);
        let before = screen.global_to_pixel(g);
        screen.move_by_pixels(15.0, -7.0);
        let after = screen.global_to_pixel(g);
        assert_point_eq(after, before + Vec2::new(15.0, -7.0), 1e-6);
    }

    #[test]
    fn move_by_global_shifts_origin() {
        let mut screen = Screen::default();
        screen.move_by_global(Vec2::new(5.0, -3.0));
        assert_point_eq(screen.origin(), Point::new(315.0, 243.0), EPS);
    }

    #[test]
    fn scale_by_zooms_in() {
        let mut screen = Screen::default();
        screen.scale_by(2.0);
        assert!((screen.scale() - 0.05).abs() < EPS);
    }

    #[test]
    fn rotate_by_accumulates() {
        let mut screen = Screen::default();
        screen.rotate_by(0.25);
        screen.rotate_by(0.5);
        assert!((screen.angle() - 0.75).abs() < EPS);
        // A point east of the origin appears rotated clockwise on screen.
        let mut screen = Screen::default();
        screen.set_angle(FRAC_PI_2);
        let p = screen.global_to_pixel(screen.origin() + Vec2::new(0.0, 1.0));
        assert_point_eq(p, Point::new(330.0, 240.0), 1e-6);
    }

    #[test]
    fn rect_conversion_uses_two_corners() {
        let screen = Screen::default();
        let px = screen.global_rect_to_pixel(Rect::new(320.0, 240.0, 330.0, 250.0));
        assert_rect_eq(px, Rect::new(320.0, 140.0, 420.0, 240.0), 1e-6);
        let back = screen.pixel_rect_to_global(px);
        assert_rect_eq(back, Rect::new(320.0, 240.0, 330.0, 250.0), 1e-6);
    }

    #[test]
    fn global_rect_matches_viewport() {
        let screen = Screen::default();
        let r = screen.global_rect();
        assert_rect_eq(r.local, Rect::new(-32.0, -24.0, 32.0, 24.0), EPS);
        assert_rect_eq(
            screen.clip_rect(),
            Rect::new(288.0, 216.0, 352.0, 264.0),
            EPS,
        );
    }

    #[test]
    fn similarity_quarter_turn() {
        let m = similarity_transform_between(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
        );
        let [a, b, c, d, e, f] = m.as_coeffs();
        assert!(a.abs() < EPS && (b - 1.0).abs() < EPS);
        assert!((c + 1.0).abs() < EPS && d.abs() < EPS);
        assert!(e.abs() < EPS && f.abs() < EPS);
        assert!((a.hypot(b) - 1.0).abs() < EPS, "unit scale");
        assert!((b.atan2(a) - FRAC_PI_2).abs() < EPS, "90° rotation");
    }

    #[test]
    fn similarity_scales_and_translates() {
        let m = similarity_transform_between(
            Point::new(1.0, 1.0),
            Point::new(2.0, 1.0),
            Point::new(5.0, 5.0),
            Point::new(8.0, 5.0),
        );
        assert_point_eq(m * Point::new(1.0, 1.0), Point::new(5.0, 5.0), EPS);
        assert_point_eq(m * Point::new(2.0, 1.0), Point::new(8.0, 5.0), EPS);
    }

    #[test]
    fn similarity_with_coincident_points_is_not_finite() {
        let p = Point::new(3.0, 3.0);
        let m = similarity_transform_between(p, p, Point::ZERO, Point::new(1.0, 0.0));
        assert!(!m.as_coeffs().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn set_global_to_pixel_recovers_params() {
        let source = busy_screen();
        let mut screen = Screen::default();
        screen.set_viewport(0.0, 0.0, 800.0, 600.0);
        screen
            .set_global_to_pixel(source.global_to_pixel_matrix())
            .unwrap();

        assert!((screen.scale() - 3.5).abs() < 1e-9);
        assert!((screen.angle().cos() - 0.7_f64.cos()).abs() < 1e-9);
        assert!((screen.angle().sin() - 0.7_f64.sin()).abs() < 1e-9);
        assert_point_eq(screen.origin(), source.origin(), 1e-6);
        let g = Point::new(900.0, -100.0);
        assert_point_eq(screen.global_to_pixel(g), source.global_to_pixel(g), 1e-6);
    }

    #[test]
    fn set_global_to_pixel_rejects_skew() {
        let mut screen = Screen::default();
        let before = screen.clone();
        let skewed = Affine::new([1.0, 0.0, 0.5, -1.0, 0.0, 0.0]);
        assert_eq!(
            screen.set_global_to_pixel(skewed),
            Err(ScreenError::NotSimilarity)
        );
        // Unflipped rotations are not screen matrices either.
        assert_eq!(
            screen.set_global_to_pixel(Affine::rotate(0.3)),
            Err(ScreenError::NotSimilarity)
        );
        assert_eq!(screen, before, "rejected input leaves state untouched");
    }

    #[test]
    fn extract_params_of_rotated_matrix() {
        let m = Affine::rotate(-0.5).then_scale(4.0);
        let p = extract_similarity_params(m);
        assert!((p.scale - 4.0).abs() < EPS);
        assert!((p.angle - 0.5).abs() < EPS);
        let p = extract_similarity_params(Affine::rotate(0.5));
        assert!((p.angle - (TAU - 0.5)).abs() < EPS, "angle wraps into [0, 2π)");
    }

    #[test]
    fn perspective_round_trip_restores_viewport_and_scale() {
        for &(angle, fov) in &[(FRAC_PI_4, FRAC_PI_3), (0.3, 1.0), (1.0, 0.8)] {
            let mut screen = busy_screen();
            let before = screen.clone();
            screen.enable_perspective(PerspectiveParams::new(angle, fov));
            assert!(screen.is_perspective());
            assert!(screen.pixel_rect().width() > before.pixel_rect().width());
            screen.disable_perspective();

            assert!(!screen.is_perspective());
            assert_rect_eq(screen.pixel_rect(), before.pixel_rect(), 1e-6);
            assert!((screen.scale() - before.scale()).abs() < 1e-9);
            assert_point_eq(screen.origin(), before.origin(), 1e-6);
        }
    }

    #[test]
    fn perspective_keeps_displayed_viewport() {
        let mut screen = Screen::default();
        screen.enable_perspective(PerspectiveParams::default());
        assert_rect_eq(
            screen.pixel_rect_in_3d(),
            Rect::new(0.0, 0.0, 640.0, 480.0),
            1e-6,
        );
        let (sx, sy) = screen.perspective_scale();
        assert!(sx > 1.0 && (sx - sy).abs() < EPS);
        assert!(screen.pixel_to_3d_matrix().is_some_and(|m| m.is_finite()));
    }

    #[test]
    fn perspective_keeps_near_edge_anchored() {
        let mut screen = Screen::default();
        screen.enable_perspective(PerspectiveParams::default());
        let r = screen.pixel_rect();
        let projected = screen.project_pixel_point_3d(Point::new(r.center().x, r.y1));
        assert_point_eq(projected, Point::new(320.0, 480.0), 1e-6);
        // Far points are pulled towards the horizon.
        let far = screen.project_pixel_point_3d(Point::new(r.center().x, r.y0));
        assert!(far.y < 480.0);
    }

    #[test]
    fn zero_tilt_projection_is_identity() {
        let mut screen = Screen::default();
        screen.enable_perspective(PerspectiveParams::new(0.0, FRAC_PI_3));
        assert_eq!(screen.perspective_scale(), (1.0, 1.0));
        let p = Point::new(100.0, 400.0);
        assert_point_eq(screen.project_pixel_point_3d(p), p, 1e-9);
    }

    #[test]
    fn flat_projection_is_identity() {
        let screen = busy_screen();
        let p = Point::new(12.0, 34.0);
        assert_eq!(screen.project_pixel_point_3d(p), p);
    }

    #[test]
    fn enable_twice_does_not_compound() {
        let mut screen = Screen::default();
        screen.enable_perspective(PerspectiveParams::default());
        let once = screen.pixel_rect();
        screen.enable_perspective(PerspectiveParams::default());
        assert_rect_eq(screen.pixel_rect(), once, 1e-9);
        screen.disable_perspective();
        screen.disable_perspective();
        assert_rect_eq(
            screen.pixel_rect(),
            Rect::new(0.0, 0.0, 640.0, 480.0),
            1e-6,
        );
    }

    #[test]
    fn touch_rect_scales_radius() {
        let screen = Screen::default();
        let r = screen.touch_rect(Point::new(320.0, 240.0), 20.0);
        assert_point_eq(r.center, Point::new(320.0, 240.0), EPS);
        assert_rect_eq(r.local, Rect::new(-2.0, -2.0, 2.0, 2.0), EPS);
    }

    #[test]
    fn panning_and_rotation_keep_scale() {
        let a = busy_screen();
        let mut b = a.clone();
        b.move_by_pixels(40.0, 10.0);
        b.rotate_by(PI / 3.0);
        assert!(is_panning_and_rotate(&a, &b));
        b.scale_by(1.5);
        assert!(!is_panning_and_rotate(&a, &b));
    }

    #[test]
    fn with_params_shares_viewport() {
        let base = busy_screen();
        let s = Screen::with_params(&base, Point::new(1.0, 2.0), 0.5, 0.0);
        assert_eq!(s.pixel_rect(), base.pixel_rect());
        assert_point_eq(s.pixel_to_global(base.pixel_rect().center()), Point::new(1.0, 2.0), EPS);
    }

    #[test]
    fn min_pixel_rect_size_is_shorter_side() {
        assert_eq!(Screen::default().min_pixel_rect_size(), 480.0);
    }
}
