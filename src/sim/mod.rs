//! Herding simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering,
//! audio and input-device concerns:
//! - One synchronous tick per frame, clamped delta time
//! - Injected RNG only (seedable for tests and replays)
//! - Stable iteration order (flock members by index)
//! - Collaborators read snapshots and events, never mutate state

pub mod behavior;
pub mod collision;
pub mod flock;
pub mod movement;
pub mod pen;
pub mod session;
pub mod state;
pub mod tick;

pub use behavior::{BehaviorState, FlockBehavior};
pub use collision::{CollisionResult, circle_fence_collision, reflect_velocity};
pub use flock::{Flock, Sheep};
pub use movement::{Herder, MoveIntent, MovementBounds};
pub use pen::{BoundarySegment, PenDefinition, PenProgress};
pub use session::LevelSession;
pub use state::{AgentSnapshot, AgentState, GameEvent, GamePhase, SessionState, Snapshot};
pub use tick::{TickInput, clamp_dt};
