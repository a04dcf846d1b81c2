use core::ops::{Add, Mul, Neg, Sub};

/// 2D vector in surface pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);
    pub const ONE: Vec2 = Vec2::new(1.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Component-wise product.
    #[inline]
    pub fn hadamard(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x * rhs.x, self.y * rhs.y)
    }

    /// Rotates around the origin by precomputed `(sin, cos)`.
    #[inline]
    pub fn rotated(self, sin: f32, cos: f32) -> Vec2 {
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    #[inline]
    pub fn dot(self, rhs: Vec2) -> f32 {
        self.x * rhs.x + self.y * rhs.y
    }

    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector perpendicular to `self` (counter-clockwise), or zero for a zero vector.
    #[inline]
    pub fn perp_normalized(self) -> Vec2 {
        let len = self.length();
        if len <= f32::EPSILON {
            return Vec2::ZERO;
        }
        Vec2::new(-self.y / len, self.x / len)
    }

    #[inline]
    pub fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5
    }

    #[test]
    fn quarter_turn_rotates_x_onto_y() {
        let (s, c) = std::f32::consts::FRAC_PI_2.sin_cos();
        assert!(close(Vec2::new(1.0, 0.0).rotated(s, c), Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn perp_of_zero_is_zero() {
        assert_eq!(Vec2::ZERO.perp_normalized(), Vec2::ZERO);
    }

    #[test]
    fn perp_is_unit_length() {
        let p = Vec2::new(3.0, 4.0).perp_normalized();
        assert!((p.length() - 1.0).abs() < 1e-6);
        assert!(close(p, Vec2::new(-0.8, 0.6)));
    }
}
