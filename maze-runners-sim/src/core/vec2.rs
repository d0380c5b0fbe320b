//! Maze-Space 2D Vector
//!
//! Positions and displacements in maze units (1.0 = one tile).
//! The y axis grows downward, matching tile rows.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use serde::{Serialize, Deserialize};

/// 2D vector in maze units.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component (columns, grows to the right)
    pub x: f32,
    /// Y component (rows, grows downward)
    pub y: f32,
}

impl Vec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Centre of the tile at column `tx`, row `ty`.
    #[inline]
    pub fn tile_center(tx: usize, ty: usize) -> Self {
        Self {
            x: tx as f32 + 0.5,
            y: ty as f32 + 0.5,
        }
    }

    /// Scale both components.
    #[inline]
    pub fn scale(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    /// True when both components are exactly zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Squared length.
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Squared distance to another point.
    #[inline]
    pub fn distance_squared(self, other: Self) -> f32 {
        (self - other).length_squared()
    }

    /// Tile coordinates containing this point, or `None` left of / above the grid.
    #[inline]
    pub fn tile(self) -> Option<(usize, usize)> {
        if self.x < 0.0 || self.y < 0.0 || !self.x.is_finite() || !self.y.is_finite() {
            return None;
        }
        Some((self.x.floor() as usize, self.y.floor() as usize))
    }
}

impl Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl fmt::Debug for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec2({:.3}, {:.3})", self.x, self.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_ops() {
        let a = Vec2::new(3.0, 4.0);
        let b = Vec2::new(1.0, 2.0);
        assert_eq!(a + b, Vec2::new(4.0, 6.0));
        assert_eq!(a - b, Vec2::new(2.0, 2.0));
        assert_eq!(-b, Vec2::new(-1.0, -2.0));
        assert_eq!(a * 2.0, Vec2::new(6.0, 8.0));
        assert_eq!(a.length_squared(), 25.0);
    }

    #[test]
    fn test_tile_lookup() {
        assert_eq!(Vec2::new(1.5, 2.99).tile(), Some((1, 2)));
        assert_eq!(Vec2::new(0.0, 0.0).tile(), Some((0, 0)));
        assert_eq!(Vec2::new(-0.01, 3.0).tile(), None);
        assert_eq!(Vec2::new(2.0, f32::NAN).tile(), None);
        assert_eq!(Vec2::tile_center(3, 1), Vec2::new(3.5, 1.5));
    }

    #[test]
    fn test_is_zero() {
        assert!(Vec2::ZERO.is_zero());
        assert!(!Vec2::new(0.0, 0.015).is_zero());
    }
}
