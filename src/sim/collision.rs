//! Collision detection and response against the pen fence
//!
//! Each fence segment is an axis-aligned box in pen-local space with zero
//! thickness along its normal. Agents are circles. The resolver works on one
//! segment per call: the first one the circle overlaps wins.

use glam::Vec2;

use super::pen::{BoundarySegment, PenDefinition};
use crate::consts::COLLISION_SKIN;

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the fence, in world space (if hit)
    pub point: Vec2,
    /// Contact normal, pointing from the fence toward the resolved agent
    pub normal: Vec2,
    /// How far the agent had to be moved out (including any tunneled distance)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Closest point on a segment's box to `point` (both pen-local)
#[inline]
pub fn closest_point_on_segment(segment: &BoundarySegment, point: Vec2) -> Vec2 {
    point.clamp(segment.min, segment.max)
}

/// Whether the straight path `from -> to` crosses the segment's plane inside
/// the segment's extent (i.e. the agent skipped through the fence in one step)
fn crossed_segment(segment: &BoundarySegment, from: Vec2, to: Vec2) -> bool {
    let side_from = (from - segment.min).dot(segment.normal);
    let side_to = (to - segment.min).dot(segment.normal);
    if side_from * side_to >= 0.0 {
        return false;
    }

    let t = side_from / (side_from - side_to);
    let crossing = from.lerp(to, t);
    let along = crossing - closest_point_on_segment(segment, crossing);
    // Only the tangent axis matters; the normal offset is float noise here
    along.dot(segment.normal.perp()).abs() <= 1.0e-5
}

/// Resolve a circular agent against the pen fence.
///
/// `previous` is the agent's position before this tick's movement. It decides
/// which side of a fence the agent belongs on when it tunneled straight through
/// a segment, or when its center sits exactly on one.
///
/// On a hit the agent is placed `radius + COLLISION_SKIN` away from the contact
/// point along the returned normal.
pub fn circle_fence_collision(
    pen: &PenDefinition,
    previous: Vec2,
    position: &mut Vec2,
    radius: f32,
) -> CollisionResult {
    let local = *position - pen.position;
    let previous_local = previous - pen.position;

    for segment in &pen.segments {
        let closest = closest_point_on_segment(segment, local);
        let offset = local - closest;
        let dist_sq = offset.length_squared();
        if dist_sq > radius * radius {
            continue;
        }
        let dist = dist_sq.sqrt();

        let previous_side = (previous_local - closest).dot(segment.normal);
        let oriented = if previous_side < 0.0 {
            -segment.normal
        } else {
            segment.normal
        };

        let tunneled = crossed_segment(segment, previous_local, local);
        let (normal, penetration) = if tunneled {
            (oriented, radius + dist)
        } else {
            match offset.try_normalize() {
                Some(normal) => (normal, radius - dist),
                None => (oriented, radius),
            }
        };

        *position = pen.position + closest + normal * (radius + COLLISION_SKIN);
        return CollisionResult {
            hit: true,
            point: pen.position + closest,
            normal,
            penetration,
        };
    }

    CollisionResult::miss()
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}
