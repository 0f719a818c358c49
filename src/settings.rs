//! Level settings and tuning
//!
//! Loaded from JSON (or taken from defaults) and validated once, before any
//! simulation state exists.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building or loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Gate is as wide as (or wider than) the pen edge it sits in
    #[error("gate width {gate_width} must be smaller than pen width {pen_width}")]
    GateTooWide { gate_width: f32, pen_width: f32 },
    /// A size, speed, radius or duration that must be strictly positive
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    /// Flock has nobody to herd
    #[error("flock needs at least one spawn point")]
    NoSpawnPoints,
    /// A `[min, max]` duration range is inverted or negative
    #[error("{field} range [{min}, {max}] is invalid")]
    InvalidRange { field: &'static str, min: f32, max: f32 },
    /// Padding leaves no room to move
    #[error("{field} padding {padding} leaves no movable area (half extent {half_extent})")]
    PaddingTooLarge {
        field: &'static str,
        padding: f32,
        half_extent: f32,
    },
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Square play field the agents are clamped to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Edge length of the (square) terrain
    pub size: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self { size: 40.0 }
    }
}

/// Herder (player) tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HerderSettings {
    /// Top speed in units/second
    pub move_speed: f32,
    /// Velocity lerp rate (per second)
    pub acceleration: f32,
    /// Distance kept from the world edge
    pub bound_padding: f32,
    /// Where the herder appears on (re)start
    pub spawn: Vec2,
}

impl Default for HerderSettings {
    fn default() -> Self {
        Self {
            move_speed: 6.0,
            acceleration: 18.0,
            bound_padding: 0.75,
            spawn: Vec2::ZERO,
        }
    }
}

/// Flock tuning, shared by every member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockSettings {
    /// Herder distance that triggers fleeing
    pub fear_radius: f32,
    pub wander_speed: f32,
    pub flee_speed: f32,
    /// Seconds spent wandering, `[min, max]`
    pub wander_duration: [f32; 2],
    /// Seconds spent idle, `[min, max]`
    pub idle_duration: [f32; 2],
    /// Distance kept from the world edge
    pub bounds_padding: f32,
    /// One flock member per spawn point (planar x, z)
    pub spawn_points: Vec<Vec2>,
}

impl Default for FlockSettings {
    fn default() -> Self {
        Self {
            fear_radius: 6.0,
            wander_speed: 1.1,
            flee_speed: 3.8,
            wander_duration: [2.5, 4.5],
            idle_duration: [1.2, 2.6],
            bounds_padding: 1.2,
            spawn_points: vec![
                Vec2::new(-6.0, -5.0),
                Vec2::new(-2.0, 4.0),
                Vec2::new(3.0, -3.0),
                Vec2::new(6.0, 2.0),
                Vec2::new(0.0, 0.0),
            ],
        }
    }
}

/// Pen placement and size
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PenSettings {
    /// Extent along world x
    pub width: f32,
    /// Extent along world z
    pub height: f32,
    /// Pen center (planar x, z)
    pub position: Vec2,
    /// Opening centered in the front and back fences
    pub gate_width: f32,
}

impl Default for PenSettings {
    fn default() -> Self {
        Self {
            width: 12.0,
            height: 9.0,
            position: Vec2::new(12.0, -6.0),
            gate_width: 3.2,
        }
    }
}

/// Complete level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub world: WorldSettings,
    pub herder: HerderSettings,
    pub flock: FlockSettings,
    pub pen: PenSettings,
    /// Countdown for one attempt, in seconds
    pub level_timer_seconds: f32,
    /// RNG seed for the session (random when absent)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world: WorldSettings::default(),
            herder: HerderSettings::default(),
            flock: FlockSettings::default(),
            pen: PenSettings::default(),
            level_timer_seconds: 90.0,
            seed: None,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    // `!(value > 0.0)` also rejects NaN
    if !(value > 0.0) {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

fn duration_range(field: &'static str, [min, max]: [f32; 2]) -> Result<(), ConfigError> {
    if !(min >= 0.0 && max >= min) {
        return Err(ConfigError::InvalidRange { field, min, max });
    }
    Ok(())
}

fn padding(field: &'static str, padding: f32, half_extent: f32) -> Result<(), ConfigError> {
    if !(padding >= 0.0 && padding < half_extent) {
        return Err(ConfigError::PaddingTooLarge {
            field,
            padding,
            half_extent,
        });
    }
    Ok(())
}

impl Settings {
    /// Check every constraint the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("world.size", self.world.size)?;
        let half_world = self.world.size / 2.0;

        positive("herder.move_speed", self.herder.move_speed)?;
        positive("herder.acceleration", self.herder.acceleration)?;
        padding("herder.bound_padding", self.herder.bound_padding, half_world)?;

        positive("flock.fear_radius", self.flock.fear_radius)?;
        positive("flock.wander_speed", self.flock.wander_speed)?;
        positive("flock.flee_speed", self.flock.flee_speed)?;
        duration_range("flock.wander_duration", self.flock.wander_duration)?;
        duration_range("flock.idle_duration", self.flock.idle_duration)?;
        padding("flock.bounds_padding", self.flock.bounds_padding, half_world)?;
        if self.flock.spawn_points.is_empty() {
            return Err(ConfigError::NoSpawnPoints);
        }

        positive("pen.width", self.pen.width)?;
        positive("pen.height", self.pen.height)?;
        if !(self.pen.gate_width >= 0.0) {
            return Err(ConfigError::InvalidRange {
                field: "pen.gate_width",
                min: 0.0,
                max: self.pen.gate_width,
            });
        }
        if self.pen.gate_width >= self.pen.width {
            return Err(ConfigError::GateTooWide {
                gate_width: self.pen.gate_width,
                pen_width: self.pen.width,
            });
        }

        positive("level_timer_seconds", self.level_timer_seconds)?;
        Ok(())
    }

    /// Parse and validate settings from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json).inspect_err(|err| {
            log::warn!("Rejected settings from {}: {}", path.display(), err);
        })?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize to pretty JSON (for writing a starter config)
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Half extent of the world square
    pub fn half_world(&self) -> f32 {
        self.world.size / 2.0
    }

    /// Number of flock members the level spawns
    pub fn total_sheep(&self) -> usize {
        self.flock.spawn_points.len()
    }
}
