//! Session state and the data handed to renderers
//!
//! Everything here is plain data: the tick owns and mutates it, collaborators
//! only ever see copies.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::behavior::BehaviorState;
use crate::planar_heading;

/// Current phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Start screen up, simulation frozen, agents hidden
    #[default]
    Waiting,
    /// Timer running, input accepted
    Playing,
    /// Every flock member ended up in the pen
    Won,
    /// Timer expired first
    Lost,
}

impl GamePhase {
    /// Won or Lost
    pub fn is_finished(self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }
}

/// Position and motion of one agent (herder or flock member)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentState {
    /// Planar position (world x in `.x`, world z in `.y`)
    pub position: Vec2,
    pub velocity: Vec2,
    /// Facing about the vertical axis, kept while the agent stands still
    pub heading: f32,
}

impl AgentState {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Integrate position and refresh heading from the current velocity
    pub fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        if let Some(heading) = planar_heading(self.velocity) {
            self.heading = heading;
        }
    }
}

/// Level-wide bookkeeping that outlives restarts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: GamePhase,
    /// Seconds left on the countdown, in `[0, level_timer_seconds]`
    pub remaining_time: f32,
    /// Flock members inside the pen rectangle, counted before this tick's
    /// motion (a sheep that steps in during the tick is counted next tick)
    pub sheep_inside: usize,
    pub total_sheep: usize,
    /// Seconds of play since the last (re)start
    pub elapsed: f32,
}

impl SessionState {
    pub fn new(level_timer_seconds: f32, total_sheep: usize) -> Self {
        Self {
            phase: GamePhase::Waiting,
            remaining_time: level_timer_seconds,
            sheep_inside: 0,
            total_sheep,
            elapsed: 0.0,
        }
    }

    /// True when the whole (non-empty) flock is penned
    pub fn all_penned(&self) -> bool {
        self.total_sheep > 0 && self.sheep_inside == self.total_sheep
    }
}

/// Discrete notifications for HUD, overlays and audio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The level entered a new phase
    PhaseChanged(GamePhase),
    /// Pen count changed by `delta` since the previous tick
    PenProgressChanged { delta: i32, inside: usize },
}

/// Per-flock-member render data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub position: Vec2,
    pub heading: f32,
    pub state: BehaviorState,
}

/// Read-only view of the simulation after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub herder_position: Vec2,
    pub herder_heading: f32,
    pub flock: Vec<AgentSnapshot>,
    /// Pen count taken at the start of the last tick, so it can lag `flock`
    /// positions by one frame
    pub sheep_inside: usize,
    pub total_sheep: usize,
    pub remaining_time: f32,
    pub phase: GamePhase,
    /// Agents are hidden while the start screen is up
    pub agents_visible: bool,
    /// Pen highlight intensity (0-1), pulses when a sheep is penned
    pub pen_highlight: f32,
    pub elapsed: f32,
}

impl Snapshot {
    /// Whole seconds shown on the countdown
    pub fn timer_display_seconds(&self) -> u32 {
        self.remaining_time.max(0.0).ceil() as u32
    }
}
