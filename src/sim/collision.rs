//! Overlap predicates shared by the broad and narrow phase
//!
//! Both tests are inclusive: touching counts as overlapping. Keeping the
//! comparison identical in every direction is what makes the contact relation
//! symmetric.

use glam::DVec2;

use super::geometry::Aabb;

/// True if the circle reaches into or touches the rectangle
#[inline]
pub fn circle_rect_overlap(center: DVec2, radius: f64, rect: &Aabb) -> bool {
    let closest = rect.clamp_point(center);
    center.distance_squared(closest) <= radius * radius
}

/// True if the two circles overlap or are tangent
#[inline]
pub fn circle_circle_overlap(a: DVec2, ra: f64, b: DVec2, rb: f64) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) <= reach * reach
}
