//! Minimal 2D vector math for the simulation.
//!
//! Only the operations the physics actually uses are implemented. Distance
//! and normalization guard the zero-length case explicitly, because
//! coincident nodes are a real occurrence (two actors spawned at the same
//! ring position) and division by zero must never reach the force math.

use std::ops::{Add, AddAssign, Mul, Sub};

/// Minimum distance treated as non-coincident in normalization.
pub const DISTANCE_EPSILON: f64 = 1e-6;

/// A 2D vector (also used for positions on the viewport).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Construct from components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector length.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Distance to another point.
    pub fn distance_to(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Unit vector in this direction, or `None` for (near-)zero vectors.
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len < DISTANCE_EPSILON {
            None
        } else {
            Some(Self::new(self.x / len, self.y / len))
        }
    }

    /// Scale by a scalar.
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Point at `radius` along `angle` (radians) from this point.
    pub fn offset_polar(self, angle: f64, radius: f64) -> Self {
        Self::new(
            radius.mul_add(angle.cos(), self.x),
            radius.mul_add(angle.sin(), self.y),
        )
    }

    /// Linear interpolation from `self` to `other` at parameter `t`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            (other.x - self.x).mul_add(t, self.x),
            (other.y - self.y).mul_add(t, self.y),
        )
    }

    /// Clamp both components into `[min, max]` per axis.
    pub fn clamped(self, min: Self, max: Self) -> Self {
        Self::new(self.x.clamp(min.x, max.x), self.y.clamp(min.y, max.y))
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scaled(rhs)
    }
}

/// Cubic ease-out: fast start, gentle landing. Input clamped to `[0, 1]`.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn length_and_distance() {
        let v = Vec2::new(3.0, 4.0);
        assert!((v.length() - 5.0).abs() < 1e-12);
        assert!((Vec2::ZERO.distance_to(v) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn zero_vector_does_not_normalize() {
        assert!(Vec2::ZERO.normalized().is_none());
        assert!(Vec2::new(0.0, DISTANCE_EPSILON / 2.0).normalized().is_none());
    }

    #[test]
    fn normalized_has_unit_length() {
        let unit = Vec2::new(-7.0, 2.5).normalized().unwrap();
        assert!((unit.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Vec2::new(0.0, 10.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        let mid = a.lerp(b, 0.5);
        assert!((mid.x - 5.0).abs() < 1e-12);
        assert!((mid.y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn clamp_bounds_both_axes() {
        let v = Vec2::new(-50.0, 900.0);
        let clamped = v.clamped(Vec2::new(0.0, 0.0), Vec2::new(800.0, 600.0));
        assert_eq!(clamped, Vec2::new(0.0, 600.0));
    }

    #[test]
    fn ease_out_cubic_shape() {
        assert!(ease_out_cubic(0.0).abs() < 1e-12);
        assert!((ease_out_cubic(1.0) - 1.0).abs() < 1e-12);
        // Ease-out: ahead of linear in the middle.
        assert!(ease_out_cubic(0.5) > 0.5);
        // Clamped outside the unit interval.
        assert!((ease_out_cubic(2.0) - 1.0).abs() < 1e-12);
        assert!(ease_out_cubic(-1.0).abs() < 1e-12);
    }

    #[test]
    fn polar_offset() {
        let p = Vec2::new(10.0, 10.0).offset_polar(0.0, 5.0);
        assert!((p.x - 15.0).abs() < 1e-12);
        assert!((p.y - 10.0).abs() < 1e-12);
    }
}
