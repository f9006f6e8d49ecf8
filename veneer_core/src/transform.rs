// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 plane transform.
//!
//! Planes only ever rotate about the screen normal, so this type covers
//! identity and Z rotation plus conversion to the `f32` column array a GPU
//! program consumes.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Degrees-to-radians factor applied to producer rotation values.
///
/// Producers were calibrated against this truncated constant, so it is kept
/// instead of `PI / 180`.
pub const DEG_TO_RAD: f64 = 0.017453;

/// A column-major 4×4 affine transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, matching the memory layout
/// GPU programs expect for a `mat4` uniform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Creates a rotation around the Z axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        #[cfg(feature = "std")]
        let (s, c) = radians.sin_cos();
        #[cfg(not(feature = "std"))]
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis from a producer's degree value.
    #[inline]
    #[must_use]
    pub fn from_rotation_z_degrees(degrees: f32) -> Self {
        Self::from_rotation_z(f64::from(degrees) * DEG_TO_RAD)
    }

    /// Flattens to sixteen `f32`s in column-major order.
    #[must_use]
    pub fn to_cols_array_f32(&self) -> [f32; 16] {
        let mut out = [0.0_f32; 16];
        for (j, col) in self.cols.iter().enumerate() {
            for (i, v) in col.iter().enumerate() {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "GPU uniforms are single precision"
                )]
                let v = *v as f32;
                out[j * 4 + i] = v;
            }
        }
        out
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform3d::default(), Transform3d::IDENTITY);
    }

    #[test]
    fn zero_degrees_is_identity() {
        assert_eq!(Transform3d::from_rotation_z_degrees(0.0), Transform3d::IDENTITY);
    }

    #[test]
    fn rotation_z_ninety_degrees() {
        let r = Transform3d::from_rotation_z_degrees(90.0);
        // The truncated factor leaves a small residue in cos.
        let eps = 1e-4;
        assert!((r.col(0)[0] - 0.0).abs() < eps);
        assert!((r.col(0)[1] - 1.0).abs() < eps);
        assert!((r.col(1)[0] + 1.0).abs() < eps);
        assert!((r.col(1)[1] - 0.0).abs() < eps);
    }

    #[test]
    fn flattens_column_major() {
        let r = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_2);
        let m = r.to_cols_array_f32();
        assert!((m[1] - 1.0).abs() < 1e-6, "m[1] is sin");
        assert!((m[4] + 1.0).abs() < 1e-6, "m[4] is -sin");
        assert_eq!(m[10], 1.0);
        assert_eq!(m[15], 1.0);
    }

    #[test]
    fn infinity_detected() {
        let mut t = Transform3d::IDENTITY;
        t.cols[0][3] = f64::INFINITY;
        assert!(!t.is_finite());
        assert!(Transform3d::from_rotation_z_degrees(45.0).is_finite());
    }
}
