//! The flock: every herdable agent, stored flat and updated in index order

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::behavior::FlockBehavior;
use super::movement::MovementBounds;
use super::pen::PenDefinition;
use super::state::{AgentSnapshot, AgentState};
use crate::consts::SHEEP_RADIUS;
use crate::settings::FlockSettings;

/// A single flock member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheep {
    pub id: u32,
    pub spawn: Vec2,
    pub agent: AgentState,
    pub behavior: FlockBehavior,
}

impl Sheep {
    pub fn position(&self) -> Vec2 {
        self.agent.position
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            position: self.agent.position,
            heading: self.agent.heading,
            state: self.behavior.state,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Flock {
    pub members: Vec<Sheep>,
}

impl Flock {
    /// One member per configured spawn point
    pub fn spawn<R: Rng + ?Sized>(settings: &FlockSettings, rng: &mut R) -> Self {
        let members = settings
            .spawn_points
            .iter()
            .enumerate()
            .map(|(id, &spawn)| Sheep {
                id: id as u32,
                spawn,
                agent: AgentState::at(spawn),
                behavior: FlockBehavior::new(settings, rng),
            })
            .collect();
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.members.iter().map(Sheep::position)
    }

    /// Everyone back to spawn, at rest and idle
    pub fn reset<R: Rng + ?Sized>(&mut self, settings: &FlockSettings, rng: &mut R) {
        for sheep in &mut self.members {
            sheep.agent = AgentState::at(sheep.spawn);
            sheep.behavior.reset(settings, rng);
        }
    }

    /// Advance every member, then resolve it against the pen fence.
    ///
    /// Returns how many members bounced off the fence this tick.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        herder: Vec2,
        dt: f32,
        settings: &FlockSettings,
        bounds: &MovementBounds,
        pen: &PenDefinition,
        rng: &mut R,
    ) -> usize {
        let mut bounces = 0;
        for sheep in &mut self.members {
            let previous = sheep.agent.position;
            sheep
                .behavior
                .update(&mut sheep.agent, herder, dt, settings, bounds, rng);

            let contact = pen.resolve(previous, &mut sheep.agent.position, SHEEP_RADIUS);
            // A fence near the world edge can push past the padded bounds
            sheep.agent.position = bounds.clamp(sheep.agent.position);
            if contact.hit {
                log::trace!("Sheep {} bounced off the fence at {}", sheep.id, contact.point);
                sheep
                    .behavior
                    .bounce(&mut sheep.agent, contact.normal, settings, rng);
                bounces += 1;
            }
        }
        bounces
    }

    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        self.members.iter().map(Sheep::snapshot).collect()
    }
}
