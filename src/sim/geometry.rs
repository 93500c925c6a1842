//! Axis-aligned rectangle geometry for the arena and grid cells

use glam::DVec2;
use serde::Serialize;

use crate::error::{Error, Result};

/// An axis-aligned rectangle with inclusive bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aabb {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Aabb {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Build an arena rectangle, rejecting non-finite or non-positive extents
    pub fn arena(offset: DVec2, size: DVec2) -> Result<Self> {
        if !offset.is_finite() {
            return Err(Error::InvalidConfig("arena offset must be finite".into()));
        }
        if !size.is_finite() || size.x <= 0.0 || size.y <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "arena extent must be > 0 on both axes (got {} x {})",
                size.x, size.y
            )));
        }
        Ok(Self::new(
            offset.x,
            offset.x + size.x,
            offset.y,
            offset.y + size.y,
        ))
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[inline]
    pub fn min(&self) -> DVec2 {
        DVec2::new(self.min_x, self.min_y)
    }

    #[inline]
    pub fn max(&self) -> DVec2 {
        DVec2::new(self.max_x, self.max_y)
    }

    /// True if the point lies inside or on the boundary
    #[inline]
    pub fn contains_point(&self, point: DVec2) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Closest point of the rectangle to `point`
    #[inline]
    pub fn clamp_point(&self, point: DVec2) -> DVec2 {
        point.clamp(self.min(), self.max())
    }

    /// Map unit-square coordinates (each in [0, 1)) into the rectangle
    #[inline]
    pub fn lerp_point(&self, u: f64, v: f64) -> DVec2 {
        DVec2::new(self.min_x + u * self.width(), self.min_y + v * self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_from_offset_and_size() -> Result<()> {
        let arena = Aabb::arena(DVec2::new(0.0, 100.0), DVec2::new(1280.0, 600.0))?;
        assert_eq!(arena.min_x, 0.0);
        assert_eq!(arena.max_x, 1280.0);
        assert_eq!(arena.min_y, 100.0);
        assert_eq!(arena.max_y, 700.0);
        assert_eq!(arena.width(), 1280.0);
        assert_eq!(arena.height(), 600.0);
        Ok(())
    }

    #[test]
    fn test_arena_rejects_degenerate_extent() {
        assert!(Aabb::arena(DVec2::ZERO, DVec2::new(0.0, 10.0)).is_err());
        assert!(Aabb::arena(DVec2::ZERO, DVec2::new(10.0, -1.0)).is_err());
        assert!(Aabb::arena(DVec2::ZERO, DVec2::new(f64::NAN, 1.0)).is_err());
    }

    #[test]
    fn test_contains_point_is_inclusive() {
        let rect = Aabb::new(0.0, 10.0, 0.0, 10.0);
        assert!(rect.contains_point(DVec2::new(0.0, 0.0)));
        assert!(rect.contains_point(DVec2::new(10.0, 10.0)));
        assert!(!rect.contains_point(DVec2::new(10.000001, 5.0)));
        assert!(!rect.contains_point(DVec2::new(5.0, -0.1)));
    }

    #[test]
    fn test_lerp_point_stays_inside() {
        let rect = Aabb::new(-5.0, 5.0, 20.0, 40.0);
        let p = rect.lerp_point(0.5, 0.25);
        assert_eq!(p, DVec2::new(0.0, 25.0));
        assert!(rect.contains_point(rect.lerp_point(0.999, 0.999)));
    }
}
