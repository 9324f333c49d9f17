//! Math utilities and types
//!
//! Provides the vector types used by the collision engine plus the
//! small numeric helpers that keep degenerate geometry from producing NaN.

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Lengths below this are treated as zero when normalizing
pub const EPSILON: f32 = 1.0e-6;

/// Canonical up axis, substituted whenever a direction is undefined
pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Normalize `v`, falling back to [`UP`] for zero-length (or non-finite) input
pub fn normalize_or_up(v: Vec3) -> Vec3 {
    let length = v.magnitude();
    if length.is_finite() && length > EPSILON {
        v / length
    } else {
        UP
    }
}

/// True when every component of `v` is finite
pub fn is_finite(v: &Vec3) -> bool {
    v.iter().all(|c| c.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_or_up_unit_length() {
        let n = normalize_or_up(Vec3::new(3.0, 0.0, 4.0));
        assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(n.x, 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_normalize_or_up_degenerate() {
        assert_eq!(normalize_or_up(Vec3::zeros()), UP);
        assert_eq!(normalize_or_up(Vec3::new(f32::NAN, 0.0, 0.0)), UP);
    }
}
