//! Arena geometry
//!
//! Positions and velocities are plain `glam::Vec2` values. A `Rect` is an
//! axis-aligned box given by its top-left corner and its size, used both for
//! the simulated arena (extents) and for the visible window into it (viewport).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::error::SimError;

/// 2D vector used for positions, velocities and deltas
pub type Vector2d = Vec2;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum (top-left) corner
    pub corner: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a rectangle, rejecting non-positive or non-finite sizes
    pub fn new(corner: Vec2, width: f32, height: f32) -> Result<Self, SimError> {
        let rect = Self {
            corner,
            width,
            height,
        };
        rect.validate()?;
        Ok(rect)
    }

    /// Check the size invariant (useful for rects built by deserialization)
    pub fn validate(&self) -> Result<(), SimError> {
        let sized = self.width.is_finite() && self.height.is_finite();
        if !sized || self.width <= 0.0 || self.height <= 0.0 || !self.corner.is_finite() {
            return Err(SimError::InvalidRect {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.corner
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.corner + self.size()
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.corner + self.size() * 0.5
    }

    /// Range of coordinates left after shrinking every side by `margin`.
    ///
    /// Returns `(min, max)`. An axis too small for the margin collapses to the
    /// center of that axis, so `min <= max` always holds.
    pub fn inset(&self, margin: f32) -> (Vec2, Vec2) {
        let center = self.center();
        let mut min = self.min() + Vec2::splat(margin);
        let mut max = self.max() - Vec2::splat(margin);
        if min.x > max.x {
            min.x = center.x;
            max.x = center.x;
        }
        if min.y > max.y {
            min.y = center.y;
            max.y = center.y;
        }
        (min, max)
    }

    /// Check if a point lies inside (edges inclusive)
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.corner.x && point.x <= max.x && point.y >= self.corner.y && point.y <= max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_rejects_bad_sizes() {
        assert!(Rect::new(Vec2::ZERO, 0.0, 10.0).is_err());
        assert!(Rect::new(Vec2::ZERO, 10.0, -1.0).is_err());
        assert!(Rect::new(Vec2::ZERO, f32::NAN, 10.0).is_err());
        assert!(Rect::new(Vec2::new(f32::INFINITY, 0.0), 10.0, 10.0).is_err());
        assert!(Rect::new(Vec2::new(-5.0, 3.0), 10.0, 20.0).is_ok());
    }

    #[test]
    fn test_rect_bounds() {
        let rect = Rect::new(Vec2::new(10.0, 20.0), 100.0, 50.0).unwrap();
        assert_eq!(rect.max(), Vec2::new(110.0, 70.0));
        assert_eq!(rect.center(), Vec2::new(60.0, 45.0));
        assert!(rect.contains(Vec2::new(10.0, 70.0)));
        assert!(!rect.contains(Vec2::new(9.9, 30.0)));
    }

    #[test]
    fn test_inset_normal() {
        let rect = Rect::new(Vec2::ZERO, 100.0, 100.0).unwrap();
        let (min, max) = rect.inset(5.0);
        assert_eq!(min, Vec2::splat(5.0));
        assert_eq!(max, Vec2::splat(95.0));
    }

    #[test]
    fn test_inset_degenerate_collapses_to_center() {
        let rect = Rect::new(Vec2::ZERO, 100.0, 10.0).unwrap();
        let (min, max) = rect.inset(8.0);
        // x still has room, y collapses
        assert_eq!((min.x, max.x), (8.0, 92.0));
        assert_eq!((min.y, max.y), (5.0, 5.0));
    }
}
