//! Flock member behavior: Idle / Wander / Flee
//!
//! Proximity to the herder is checked before any timer so fleeing always
//! preempts idling and wandering. Flee exits at `fear_radius * FLEE_EXIT_FACTOR`,
//! wider than the entry radius, so an agent hovering near the edge doesn't flap
//! between states.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::reflect_velocity;
use super::movement::MovementBounds;
use super::state::AgentState;
use crate::consts::*;
use crate::settings::FlockSettings;
use crate::{random_in_range, random_unit_vector};

/// Behavior state of one flock member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BehaviorState {
    /// Standing still until the idle timer runs out
    #[default]
    Idle,
    /// Walking along `wander_direction` until the wander timer runs out
    Wander,
    /// Running directly away from the herder
    Flee,
}

/// State machine owned by a single flock member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlockBehavior {
    pub state: BehaviorState,
    /// Seconds left in Idle/Wander (unused while fleeing)
    pub state_timer: f32,
    /// Unit heading used while wandering
    pub wander_direction: Vec2,
}

impl FlockBehavior {
    /// Fresh behavior, starting Idle with a random idle timer
    pub fn new<R: Rng + ?Sized>(settings: &FlockSettings, rng: &mut R) -> Self {
        let mut behavior = Self {
            state: BehaviorState::Idle,
            state_timer: 0.0,
            wander_direction: Vec2::X,
        };
        behavior.enter(BehaviorState::Idle, settings, rng);
        behavior
    }

    /// Back to Idle with a fresh idle timer
    pub fn reset<R: Rng + ?Sized>(&mut self, settings: &FlockSettings, rng: &mut R) {
        self.enter(BehaviorState::Idle, settings, rng);
    }

    /// Apply the entry effect of `next` unconditionally
    fn enter<R: Rng + ?Sized>(&mut self, next: BehaviorState, settings: &FlockSettings, rng: &mut R) {
        self.state = next;
        match next {
            BehaviorState::Idle => {
                self.state_timer = random_in_range(rng, settings.idle_duration);
            }
            BehaviorState::Wander => {
                self.state_timer = random_in_range(rng, settings.wander_duration);
                self.wander_direction = random_unit_vector(rng);
            }
            BehaviorState::Flee => {
                self.state_timer = 0.0;
            }
        }
    }

    /// Switch state; staying in the same state keeps its timer
    fn transition<R: Rng + ?Sized>(
        &mut self,
        next: BehaviorState,
        settings: &FlockSettings,
        rng: &mut R,
    ) {
        if self.state != next {
            self.enter(next, settings, rng);
        }
    }

    /// Run the transition rules for this tick
    pub fn think<R: Rng + ?Sized>(
        &mut self,
        distance_to_herder: f32,
        dt: f32,
        settings: &FlockSettings,
        rng: &mut R,
    ) {
        if distance_to_herder <= settings.fear_radius {
            self.transition(BehaviorState::Flee, settings, rng);
        } else if self.state == BehaviorState::Flee
            && distance_to_herder > settings.fear_radius * FLEE_EXIT_FACTOR
        {
            self.transition(BehaviorState::Wander, settings, rng);
        }

        if self.state != BehaviorState::Flee {
            self.state_timer -= dt;
            if self.state_timer <= 0.0 {
                let next = match self.state {
                    BehaviorState::Idle => BehaviorState::Wander,
                    _ => BehaviorState::Idle,
                };
                self.transition(next, settings, rng);
            }
        }
    }

    /// Velocity this state wants right now
    pub fn desired_velocity<R: Rng + ?Sized>(
        &self,
        position: Vec2,
        herder: Vec2,
        settings: &FlockSettings,
        rng: &mut R,
    ) -> Vec2 {
        match self.state {
            BehaviorState::Idle => Vec2::ZERO,
            BehaviorState::Wander => self.wander_direction * settings.wander_speed,
            BehaviorState::Flee => {
                let away = (position - herder)
                    .try_normalize()
                    .unwrap_or_else(|| random_unit_vector(rng));
                away * settings.flee_speed
            }
        }
    }

    /// Full behavior step: transitions, steering, integration, world clamp
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        agent: &mut AgentState,
        herder: Vec2,
        dt: f32,
        settings: &FlockSettings,
        bounds: &MovementBounds,
        rng: &mut R,
    ) {
        self.think(agent.position.distance(herder), dt, settings, rng);

        let desired = self.desired_velocity(agent.position, herder, settings, rng);
        let blend = (FLOCK_RESPONSIVENESS * dt).min(1.0);
        agent.velocity = agent.velocity.lerp(desired, blend);
        agent.advance(dt);
        agent.position = bounds.clamp(agent.position);
    }

    /// React to hitting a fence with contact normal `normal`.
    ///
    /// Always ends in Wander, even mid-flee, so a fleeing agent can't keep
    /// driving itself into the same wall.
    pub fn bounce<R: Rng + ?Sized>(
        &mut self,
        agent: &mut AgentState,
        normal: Vec2,
        settings: &FlockSettings,
        rng: &mut R,
    ) {
        let incident = if agent.velocity.length_squared() > HEADING_EPSILON {
            agent.velocity
        } else {
            self.wander_direction
        };
        let incident = incident
            .try_normalize()
            .unwrap_or_else(|| random_unit_vector(rng));
        let reflected = reflect_velocity(incident, normal)
            .try_normalize()
            .unwrap_or(normal);

        self.wander_direction = reflected;
        self.state = BehaviorState::Wander;
        self.state_timer = random_in_range(rng, settings.wander_duration);
        agent.velocity = reflected * settings.wander_speed * BOUNCE_SPEED_FACTOR;
    }
}
