//! Frame-driven simulation tick
//!
//! One call per rendered frame. While Playing:
//! 1. count down the timer
//! 2. recount the pen (before the timeout check, so a sheep that slips in on
//!    the final frame still counts)
//! 3. time up without a full pen -> Lost, nothing else moves
//! 4. herder motion + fence
//! 5. flock behavior + fence bounces
//! 6. full pen -> Won
//!
//! A frame whose start or restart press changes the level only applies the
//! trigger. An ignored start (already past Waiting) ticks as usual.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::movement::MoveIntent;
use super::session::LevelSession;
use super::state::{GameEvent, GamePhase};
use crate::consts::*;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Held movement directions
    pub intent: MoveIntent,
    /// Start button (one-shot)
    pub start: bool,
    /// Restart button (one-shot)
    pub restart: bool,
}

impl TickInput {
    pub fn moving(intent: MoveIntent) -> Self {
        Self {
            intent,
            ..Default::default()
        }
    }
}

/// Clamp a frame delta to `[0, MAX_FRAME_DT]`; NaN counts as zero
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_nan() {
        0.0
    } else {
        dt.clamp(0.0, MAX_FRAME_DT)
    }
}

impl<R: Rng> LevelSession<R> {
    /// Advance the level by one frame and report what happened
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> Vec<GameEvent> {
        // A trigger that changes the level takes the whole frame
        if input.restart {
            return self.restart();
        }
        if input.start {
            let events = self.start();
            if !events.is_empty() {
                return events;
            }
        }

        // Waiting, Won and Lost are frozen
        if self.session.phase != GamePhase::Playing {
            return Vec::new();
        }
        let mut events = Vec::new();
        let dt = clamp_dt(dt);

        self.session.remaining_time = (self.session.remaining_time - dt).max(0.0);
        self.session.elapsed += dt;

        let delta = self.progress.update(&self.pen, self.flock.positions(), dt);
        self.session.sheep_inside = self.progress.inside;
        if delta != 0 {
            log::debug!(
                "Pen progress {delta:+}: {}/{}",
                self.session.sheep_inside,
                self.session.total_sheep
            );
            events.push(GameEvent::PenProgressChanged {
                delta,
                inside: self.session.sheep_inside,
            });
        }

        if self.session.remaining_time <= 0.0 && !self.session.all_penned() {
            self.finish(GamePhase::Lost, &mut events);
            return events;
        }

        let previous = self.herder.position();
        self.herder
            .update(input.intent, dt, &self.settings.herder, &self.herder_bounds);
        let contact = self
            .pen
            .resolve(previous, &mut self.herder.agent.position, HERDER_RADIUS);
        // The push-out may land past the padded bounds when a fence runs close to them
        self.herder.agent.position = self.herder_bounds.clamp(self.herder.agent.position);
        if contact.hit {
            log::trace!("Herder against the fence at {}", contact.point);
            // Slide along the fence instead of pressing into it
            let velocity = &mut self.herder.agent.velocity;
            let into = velocity.dot(contact.normal);
            if into < 0.0 {
                *velocity -= contact.normal * into;
            }
        }

        let bounces = self.flock.update(
            self.herder.position(),
            dt,
            &self.settings.flock,
            &self.flock_bounds,
            &self.pen,
            &mut self.rng,
        );
        if bounces > 0 {
            log::trace!("{bounces} fence bounce(s)");
        }

        if self.session.all_penned() {
            self.finish(GamePhase::Won, &mut events);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::behavior::BehaviorState;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FRAME: f32 = 1.0 / 60.0;

    fn session(settings: Settings) -> LevelSession<Pcg32> {
        LevelSession::with_rng(settings, Pcg32::seed_from_u64(1234)).unwrap()
    }

    /// Flock spawned well inside the pen, herder far away
    fn penned_settings() -> Settings {
        let mut settings = Settings::default();
        settings.flock.spawn_points = vec![Vec2::new(11.0, -6.0), Vec2::new(13.0, -7.0)];
        settings.herder.spawn = Vec2::new(-15.0, 15.0);
        settings
    }

    /// One sheep outside the pen, one inside
    fn split_settings() -> Settings {
        let mut settings = penned_settings();
        settings.flock.spawn_points[0] = Vec2::new(-10.0, 10.0);
        settings.herder.spawn = Vec2::new(-15.0, -15.0);
        settings
    }

    #[test]
    fn test_waiting_is_frozen() {
        let mut level = session(Settings::default());
        let before = level.snapshot();
        assert_eq!(before.phase, GamePhase::Waiting);
        assert!(!before.agents_visible);

        let input = TickInput::moving(MoveIntent {
            right: true,
            ..Default::default()
        });
        for _ in 0..30 {
            assert!(level.tick(&input, FRAME).is_empty());
        }
        assert_eq!(level.snapshot(), before);
    }

    #[test]
    fn test_start_then_play() {
        let mut level = session(Settings::default());
        let events = level.tick(
            &TickInput {
                start: true,
                ..Default::default()
            },
            FRAME,
        );
        assert_eq!(events, vec![GameEvent::PhaseChanged(GamePhase::Playing)]);
        assert!(level.snapshot().agents_visible);
        assert_eq!(level.state().remaining_time, 90.0);

        level.tick(&TickInput::default(), FRAME);
        assert!(level.state().remaining_time < 90.0);

        // A second start is ignored
        assert!(level.start().is_empty());
        assert_eq!(level.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_timer_counts_down_with_clamped_dt() {
        let mut level = session(Settings::default());
        level.start();
        level.tick(&TickInput::default(), 5.0);
        assert!((level.state().remaining_time - (90.0 - MAX_FRAME_DT)).abs() < 1e-4);

        level.tick(&TickInput::default(), -1.0);
        level.tick(&TickInput::default(), f32::NAN);
        assert!((level.state().remaining_time - (90.0 - MAX_FRAME_DT)).abs() < 1e-4);
        assert!((level.state().elapsed - MAX_FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_herder_moves_with_intent() {
        let mut level = session(Settings::default());
        level.start();
        let input = TickInput::moving(MoveIntent {
            backward: true,
            ..Default::default()
        });
        for _ in 0..30 {
            level.tick(&input, FRAME);
        }
        let snapshot = level.snapshot();
        assert!(snapshot.herder_position.y > 1.0);
        assert!(snapshot.herder_heading.abs() < 1e-4);
    }

    #[test]
    fn test_win_on_first_full_pen() {
        let mut level = session(penned_settings());
        level.start();
        let events = level.tick(&TickInput::default(), FRAME);

        assert_eq!(level.phase(), GamePhase::Won);
        assert!(events.contains(&GameEvent::PenProgressChanged {
            delta: 2,
            inside: 2
        }));
        assert_eq!(events.last(), Some(&GameEvent::PhaseChanged(GamePhase::Won)));

        // Frozen afterwards
        let frozen = level.snapshot();
        for _ in 0..10 {
            assert!(level.tick(&TickInput::default(), FRAME).is_empty());
        }
        assert_eq!(level.snapshot(), frozen);
        assert_eq!(level.phase(), GamePhase::Won);
    }

    #[test]
    fn test_lose_on_timeout() {
        let mut settings = split_settings();
        settings.level_timer_seconds = 0.05;
        let mut level = session(settings);
        level.start();

        let events = level.tick(&TickInput::default(), 0.1);
        assert_eq!(level.phase(), GamePhase::Lost);
        assert_eq!(level.state().remaining_time, 0.0);
        assert_eq!(level.state().sheep_inside, 1);
        assert_eq!(events.last(), Some(&GameEvent::PhaseChanged(GamePhase::Lost)));

        let frozen = level.snapshot();
        level.tick(&TickInput::default(), 0.1);
        assert_eq!(level.snapshot(), frozen);
    }

    #[test]
    fn test_full_pen_beats_timeout_on_same_tick() {
        let mut settings = penned_settings();
        settings.level_timer_seconds = 0.05;
        let mut level = session(settings);
        level.start();

        let events = level.tick(&TickInput::default(), 0.1);
        assert_eq!(level.phase(), GamePhase::Won);
        assert!(!events.contains(&GameEvent::PhaseChanged(GamePhase::Lost)));
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut settings = split_settings();
        settings.level_timer_seconds = 0.3;
        let timer = settings.level_timer_seconds;
        let mut level = session(settings);
        level.start();

        let input = TickInput::moving(MoveIntent {
            right: true,
            forward: true,
            ..Default::default()
        });
        while level.phase() == GamePhase::Playing {
            level.tick(&input, 0.05);
        }
        assert_eq!(level.phase(), GamePhase::Lost);

        let events = level.tick(
            &TickInput {
                restart: true,
                ..Default::default()
            },
            0.0,
        );
        assert_eq!(events, vec![GameEvent::PhaseChanged(GamePhase::Playing)]);

        let snapshot = level.snapshot();
        assert_eq!(snapshot.phase, GamePhase::Playing);
        assert_eq!(snapshot.remaining_time, timer);
        assert_eq!(snapshot.sheep_inside, 0);
        assert_eq!(snapshot.pen_highlight, 0.0);
        assert_eq!(snapshot.elapsed, 0.0);
        assert_eq!(snapshot.herder_position, level.herder().spawn);
        for (agent, sheep) in snapshot.flock.iter().zip(&level.flock().members) {
            assert_eq!(agent.position, sheep.spawn);
            assert_eq!(agent.state, BehaviorState::Idle);
            assert_eq!(sheep.agent.velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn test_restart_after_win_plays_again() {
        let mut level = session(penned_settings());
        level.start();
        level.tick(&TickInput::default(), FRAME);
        assert_eq!(level.phase(), GamePhase::Won);

        level.restart();
        assert_eq!(level.phase(), GamePhase::Playing);
        // Flock is still spawned in the pen, so the next tick wins again
        let events = level.tick(&TickInput::default(), FRAME);
        assert_eq!(events.last(), Some(&GameEvent::PhaseChanged(GamePhase::Won)));
    }

    #[test]
    fn test_restart_while_playing_is_silent() {
        let mut level = session(Settings::default());
        level.start();
        level.tick(&TickInput::default(), 0.1);
        assert!(level.restart().is_empty());
        assert_eq!(level.state().remaining_time, 90.0);
    }

    #[test]
    fn test_herder_blocked_by_fence() {
        let mut settings = Settings::default();
        // Just left of the pen's left wall (world x = 6), driving right
        settings.herder.spawn = Vec2::new(5.0, -6.0);
        let mut level = session(settings);
        level.start();

        let input = TickInput::moving(MoveIntent {
            right: true,
            ..Default::default()
        });
        for _ in 0..60 {
            level.tick(&input, FRAME);
            assert!(level.herder().position().x <= 6.0 - HERDER_RADIUS + 1e-3);
        }
    }

    #[test]
    fn test_fence_near_world_edge_keeps_herder_in_bounds() {
        let mut settings = Settings::default();
        // Right fence at world x = 19, inside the 19.25 herder limit
        settings.pen.position = Vec2::new(14.0, 0.0);
        settings.pen.width = 10.0;
        settings.herder.spawn = Vec2::new(19.2, 0.0);
        let mut level = session(settings);
        level.start();

        let input = TickInput::moving(MoveIntent {
            right: true,
            ..Default::default()
        });
        let bounds = *level.herder_bounds();
        for _ in 0..30 {
            level.tick(&input, FRAME);
            assert!(bounds.contains(level.herder().position()));
        }
    }

    #[test]
    fn test_held_start_does_not_stall_play() {
        let mut level = session(Settings::default());
        level.start();

        let input = TickInput {
            intent: MoveIntent {
                right: true,
                ..Default::default()
            },
            start: true,
            restart: false,
        };
        for _ in 0..60 {
            let events = level.tick(&input, FRAME);
            assert!(!events.contains(&GameEvent::PhaseChanged(GamePhase::Playing)));
        }
        assert_eq!(level.phase(), GamePhase::Playing);
        assert!(level.state().remaining_time < 89.5);
        assert!(level.herder().position().x > 1.0);
    }

    #[test]
    fn test_pen_pulse_in_snapshot() {
        let mut level = session(split_settings());
        level.start();
        level.tick(&TickInput::default(), FRAME);
        let snapshot = level.snapshot();
        assert_eq!(snapshot.sheep_inside, 1);
        assert_eq!(snapshot.pen_highlight, 1.0);
        assert_eq!(snapshot.timer_display_seconds(), 90);
    }

    #[test]
    fn test_clamp_dt() {
        assert_eq!(clamp_dt(0.016), 0.016);
        assert_eq!(clamp_dt(2.0), MAX_FRAME_DT);
        assert_eq!(clamp_dt(-0.5), 0.0);
        assert_eq!(clamp_dt(f32::NAN), 0.0);
    }
}
