//! Shepherd's Path - a herding simulation core
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (herder motion, flock behavior, pen collisions, level session)
//! - `settings`: Data-driven tuning and validation

pub mod settings;
pub mod sim;

pub use settings::{ConfigError, Settings};

use glam::Vec2;
use rand::Rng;

/// Simulation constants shared by every level
pub mod consts {
    /// Largest frame delta accepted by a tick (stalled frames are clamped to this)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Collision radius of the herder
    pub const HERDER_RADIUS: f32 = 0.45;
    /// Collision radius of a flock member
    pub const SHEEP_RADIUS: f32 = 0.35;

    /// Flee ends once the herder is farther than fear radius times this factor
    pub const FLEE_EXIT_FACTOR: f32 = 1.3;
    /// Velocity lerp rate for flock members (per second)
    pub const FLOCK_RESPONSIVENESS: f32 = 3.0;
    /// Fraction of wander speed a flock member keeps right after a bounce
    pub const BOUNCE_SPEED_FACTOR: f32 = 0.5;

    /// Squared speed below which heading is left untouched
    pub const HEADING_EPSILON: f32 = 1.0e-4;
    /// Extra push-out distance after resolving a wall contact
    pub const COLLISION_SKIN: f32 = 0.01;

    /// Pen highlight decay rate (intensity per second)
    pub const PEN_PULSE_DECAY: f32 = 2.0;
}

/// Heading (radians about the vertical axis) for a planar velocity.
///
/// Planar vectors store world x in `.x` and world z in `.y`, so this is
/// `atan2(vx, vz)`. Returns `None` when the agent is effectively stationary.
#[inline]
pub fn planar_heading(velocity: Vec2) -> Option<f32> {
    if velocity.length_squared() > consts::HEADING_EPSILON {
        Some(velocity.x.atan2(velocity.y))
    } else {
        None
    }
}

/// Uniformly random unit vector
#[inline]
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let angle = rng.random::<f32>() * std::f32::consts::TAU;
    Vec2::new(angle.cos(), angle.sin())
}

/// Uniform sample from an inclusive `[min, max]` range (min == max is allowed)
#[inline]
pub fn random_in_range<R: Rng + ?Sized>(rng: &mut R, [min, max]: [f32; 2]) -> f32 {
    min + rng.random::<f32>() * (max - min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_planar_heading() {
        // Moving toward +z faces zero, toward +x faces a quarter turn
        assert!(planar_heading(Vec2::new(0.0, 2.0)).unwrap().abs() < 1e-6);
        let east = planar_heading(Vec2::new(3.0, 0.0)).unwrap();
        assert!((east - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!(planar_heading(Vec2::new(0.001, 0.0)).is_none());
    }

    #[test]
    fn test_random_helpers() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            let dir = random_unit_vector(&mut rng);
            assert!((dir.length() - 1.0).abs() < 1e-4);

            let t = random_in_range(&mut rng, [1.2, 2.6]);
            assert!((1.2..=2.6).contains(&t));
        }
        assert_eq!(random_in_range(&mut rng, [3.0, 3.0]), 3.0);
    }
}
