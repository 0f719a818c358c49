//! Herder motion: intent in, bounded acceleration-limited movement out

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::AgentState;
use crate::settings::HerderSettings;

/// Directional request for one tick, independent of input device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    /// Unit direction (or zero when idle / cancelled out).
    ///
    /// Right is +x, backward is +z. Normalizing here keeps diagonals from
    /// outrunning straight moves.
    pub fn direction(self) -> Vec2 {
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(
            axis(self.right, self.left),
            axis(self.backward, self.forward),
        )
        .normalize_or_zero()
    }
}

/// Axis-aligned region an agent is clamped to, centered on the world origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementBounds {
    pub half_width: f32,
    pub half_height: f32,
    pub padding: f32,
}

impl MovementBounds {
    /// Square world of the given half extent
    pub fn square(half_extent: f32, padding: f32) -> Self {
        Self {
            half_width: half_extent,
            half_height: half_extent,
            padding,
        }
    }

    pub fn clamp(&self, position: Vec2) -> Vec2 {
        let max = Vec2::new(
            self.half_width - self.padding,
            self.half_height - self.padding,
        );
        position.clamp(-max, max)
    }

    pub fn contains(&self, position: Vec2) -> bool {
        self.clamp(position) == position
    }
}

/// The player-controlled agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Herder {
    pub agent: AgentState,
    pub spawn: Vec2,
}

impl Herder {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            agent: AgentState::at(spawn),
            spawn,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.agent.position
    }

    /// Back to spawn, at rest, facing the default heading
    pub fn reset(&mut self) {
        self.agent = AgentState::at(self.spawn);
    }

    /// Advance one tick toward the intended velocity
    pub fn update(
        &mut self,
        intent: MoveIntent,
        dt: f32,
        settings: &HerderSettings,
        bounds: &MovementBounds,
    ) {
        let target = intent.direction() * settings.move_speed;
        let blend = (settings.acceleration * dt).min(1.0);
        self.agent.velocity = self.agent.velocity.lerp(target, blend);
        self.agent.advance(dt);
        self.agent.position = bounds.clamp(self.agent.position);
    }
}
