//! Shepherd's Path headless runner
//!
//! Plays one level at a fixed frame rate with a simple autopilot herder, logs
//! phase and pen events, and prints the final snapshot as JSON.
//!
//! Usage: `shepherds-path [settings.json]` (log level via `RUST_LOG`)

use std::process::ExitCode;

use glam::Vec2;
use shepherds_path::Settings;
use shepherds_path::sim::{GameEvent, LevelSession, MoveIntent, PenDefinition, Snapshot, TickInput};

/// Fixed frame rate for the headless run (60 Hz)
const FRAME_DT: f32 = 1.0 / 60.0;
/// How far behind its target sheep the autopilot lines up
const PUSH_DISTANCE: f32 = 3.0;
/// A sheep this close to a gate gets pushed on toward the pen center
const GATE_CAPTURE_RADIUS: f32 = 1.0;
/// Per-axis steering dead zone
const STEER_DEADZONE: f32 = 0.25;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Shepherd's Path (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };

    let mut level = match LevelSession::new(settings) {
        Ok(level) => level,
        Err(err) => {
            log::error!("Invalid settings: {err}");
            return ExitCode::FAILURE;
        }
    };

    level.start();
    let max_frames = (level.settings().level_timer_seconds / FRAME_DT).ceil() as u32 + 2;
    let pen = level.pen().clone();

    for frame in 0..max_frames {
        let intent = autopilot(&level.snapshot(), &pen);
        for event in level.tick(&TickInput::moving(intent), FRAME_DT) {
            match event {
                GameEvent::PhaseChanged(phase) => {
                    log::info!("[frame {frame}] phase -> {phase:?}")
                }
                GameEvent::PenProgressChanged { delta, inside } => {
                    log::info!("[frame {frame}] pen {delta:+} ({inside} inside)")
                }
            }
        }
        if level.phase().is_finished() {
            break;
        }
    }

    match serde_json::to_string_pretty(&level.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            log::error!("Failed to serialize snapshot: {err}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

/// Pick the stray sheep closest to a gate and walk to the far side of it
fn autopilot(snapshot: &Snapshot, pen: &PenDefinition) -> MoveIntent {
    let gates = [
        pen.position + Vec2::new(0.0, pen.half_height),
        pen.position - Vec2::new(0.0, pen.half_height),
    ];
    let nearest_gate = |p: Vec2| {
        gates
            .into_iter()
            .min_by(|a, b| a.distance(p).total_cmp(&b.distance(p)))
            .unwrap_or(pen.position)
    };

    let stray = snapshot
        .flock
        .iter()
        .map(|sheep| sheep.position)
        .filter(|&p| !pen.contains(p))
        .min_by(|a, b| {
            a.distance(nearest_gate(*a))
                .total_cmp(&b.distance(nearest_gate(*b)))
        });

    let Some(sheep) = stray else {
        return MoveIntent::default();
    };

    let gate = nearest_gate(sheep);
    let goal = if sheep.distance(gate) < GATE_CAPTURE_RADIUS {
        pen.position
    } else {
        gate
    };
    let behind = sheep - (goal - sheep).normalize_or_zero() * PUSH_DISTANCE;
    steer(snapshot.herder_position, behind)
}

/// Four-way intent that moves `from` toward `to`
fn steer(from: Vec2, to: Vec2) -> MoveIntent {
    let delta = to - from;
    MoveIntent {
        right: delta.x > STEER_DEADZONE,
        left: delta.x < -STEER_DEADZONE,
        backward: delta.y > STEER_DEADZONE,
        forward: delta.y < -STEER_DEADZONE,
    }
}
