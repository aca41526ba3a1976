// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The projective matrix behind the perspective mode.
//!
//! [`Screen`](crate::screen::Screen) builds one [`Transform3d`] when
//! perspective is enabled: scale the flat plane, tilt it about the X axis,
//! push it away from the camera, then project. Only the pieces of that chain
//! are provided here.

use core::ops::Mul;

use kurbo::Point;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// A 4×4 projective matrix in column-major order.
///
/// Points are column vectors, so `a * b` applies `b` first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// `cols[c][r]` is the element at row `r` of column `c`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The identity matrix.
    pub const IDENTITY: Self = Self::from_diagonal(1.0, 1.0, 1.0);

    const fn from_diagonal(x: f64, y: f64, z: f64) -> Self {
        let mut cols = [[0.0; 4]; 4];
        cols[0][0] = x;
        cols[1][1] = y;
        cols[2][2] = z;
        cols[3][3] = 1.0;
        Self { cols }
    }

    /// Moves points by `(x, y, z)`.
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = [x, y, z, 1.0];
        m
    }

    /// Scales each axis independently.
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self::from_diagonal(sx, sy, sz)
    }

    /// Tilts the plane about the X axis; positive `radians` turn +Y towards
    /// +Z.
    #[must_use]
    pub fn from_rotation_x(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        let mut m = Self::IDENTITY;
        m.cols[1] = [0.0, cos, sin, 0.0];
        m.cols[2] = [0.0, -sin, cos, 0.0];
        m
    }

    /// GL-style frustum for a camera at the origin looking down +Z.
    ///
    /// `focal` is `1 / tan(fov / 2)`. Output `w` is the input `z`, and depth
    /// maps `near..far` onto `-1..1` after the divide.
    #[must_use]
    pub fn perspective(focal: f64, near: f64, far: f64) -> Self {
        let inv_depth = 1.0 / (far - near);
        let mut m = Self::from_diagonal(focal, focal, (far + near) * inv_depth);
        m.cols[2][3] = 1.0;
        m.cols[3] = [0.0, 0.0, -2.0 * far * near * inv_depth, 0.0];
        m
    }

    /// Applies the matrix to the homogeneous vector `v`.
    #[must_use]
    pub fn transform(&self, v: [f64; 4]) -> [f64; 4] {
        core::array::from_fn(|row| (0..4).map(|col| self.cols[col][row] * v[col]).sum())
    }

    /// Maps `(x, y, 0)` through the matrix and divides by `w`.
    ///
    /// The result is in normalized device coordinates.
    #[must_use]
    pub fn project(&self, p: Point) -> Point {
        let [x, y, _, w] = self.transform([p.x, p.y, 0.0, 1.0]);
        Point::new(x / w, y / w)
    }

    /// Returns `true` if no element is NaN or infinite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Transform3d {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            cols: rhs.cols.map(|col| self.transform(col)),
        }
    }
}
