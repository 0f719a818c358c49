//! Pen geometry and containment progress
//!
//! Fence layout in pen-local space (x right, z toward the front):
//!
//! ```text
//!   back   ───────     ───────     z = -half_height
//!         │      gate gap     │
//!   left  │                   │ right
//!         │                   │
//!   front ───────     ───────     z = +half_height
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{CollisionResult, circle_fence_collision};
use crate::consts::PEN_PULSE_DECAY;
use crate::settings::PenSettings;

/// One fence piece: a zero-thickness box in pen-local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundarySegment {
    pub min: Vec2,
    pub max: Vec2,
    /// Canonical normal, pointing out of the pen
    pub normal: Vec2,
}

/// Static pen: rectangle with a centered gate in the front and back fences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenDefinition {
    pub half_width: f32,
    pub half_height: f32,
    pub gate_half_width: f32,
    /// Pen center in world space
    pub position: Vec2,
    /// Side walls first, then front and back pieces
    pub segments: Vec<BoundarySegment>,
}

impl PenDefinition {
    pub fn new(settings: &PenSettings) -> Self {
        let half_width = settings.width / 2.0;
        let half_height = settings.height / 2.0;
        let gate_half_width = (settings.gate_width / 2.0).clamp(0.0, half_width);

        let mut segments = vec![
            BoundarySegment {
                min: Vec2::new(-half_width, -half_height),
                max: Vec2::new(-half_width, half_height),
                normal: Vec2::new(-1.0, 0.0),
            },
            BoundarySegment {
                min: Vec2::new(half_width, -half_height),
                max: Vec2::new(half_width, half_height),
                normal: Vec2::new(1.0, 0.0),
            },
        ];

        if gate_half_width < half_width {
            for (z, normal) in [(half_height, 1.0), (-half_height, -1.0)] {
                segments.push(BoundarySegment {
                    min: Vec2::new(-half_width, z),
                    max: Vec2::new(-gate_half_width, z),
                    normal: Vec2::new(0.0, normal),
                });
                segments.push(BoundarySegment {
                    min: Vec2::new(gate_half_width, z),
                    max: Vec2::new(half_width, z),
                    normal: Vec2::new(0.0, normal),
                });
            }
        }

        Self {
            half_width,
            half_height,
            gate_half_width,
            position: settings.position,
            segments,
        }
    }

    /// Geometric containment in the full pen rectangle (gate and fences ignored)
    pub fn contains(&self, point: Vec2) -> bool {
        let local = point - self.position;
        local.x.abs() <= self.half_width && local.y.abs() <= self.half_height
    }

    /// Push a circular agent out of the fence; see [`circle_fence_collision`]
    pub fn resolve(&self, previous: Vec2, position: &mut Vec2, radius: f32) -> CollisionResult {
        circle_fence_collision(self, previous, position, radius)
    }

    /// Number of points inside the pen rectangle
    pub fn count_inside(&self, points: impl IntoIterator<Item = Vec2>) -> usize {
        points.into_iter().filter(|p| self.contains(*p)).count()
    }
}

/// Containment count, recomputed every tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PenProgress {
    /// Agents inside after the last update
    pub inside: usize,
    /// Highlight intensity (0-1), set on every new arrival and fading out
    pub highlight: f32,
}

impl PenProgress {
    /// Recount from scratch and return the change since the previous update
    pub fn update(
        &mut self,
        pen: &PenDefinition,
        points: impl IntoIterator<Item = Vec2>,
        dt: f32,
    ) -> i32 {
        let inside = pen.count_inside(points);
        let delta = inside as i32 - self.inside as i32;
        self.inside = inside;

        self.highlight = (self.highlight - dt * PEN_PULSE_DECAY).max(0.0);
        if delta > 0 {
            self.highlight = 1.0;
        }
        delta
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
