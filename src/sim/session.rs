//! Level session: owns every piece of simulation state for one level
//!
//! Phases run Waiting -> Playing -> Won | Lost. `restart` goes straight back
//! to Playing after a full reset. The per-tick work lives in `tick.rs`.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::flock::Flock;
use super::movement::{Herder, MovementBounds};
use super::pen::{PenDefinition, PenProgress};
use super::state::{GameEvent, GamePhase, SessionState, Snapshot};
use crate::settings::{ConfigError, Settings};

/// One playable level and its random source.
///
/// Generic over the RNG so tests (and replays) can inject a seeded generator.
#[derive(Debug, Clone)]
pub struct LevelSession<R: Rng = Pcg32> {
    pub(super) settings: Settings,
    pub(super) herder_bounds: MovementBounds,
    pub(super) flock_bounds: MovementBounds,
    pub(super) pen: PenDefinition,
    pub(super) herder: Herder,
    pub(super) flock: Flock,
    pub(super) progress: PenProgress,
    pub(super) session: SessionState,
    pub(super) rng: R,
}

impl LevelSession<Pcg32> {
    /// Build a session seeded from `settings.seed` (random when unset)
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::debug!("Level seed: {seed}");
        Self::with_rng(settings, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> LevelSession<R> {
    /// Validate settings and build the level in its Waiting phase
    pub fn with_rng(settings: Settings, mut rng: R) -> Result<Self, ConfigError> {
        settings.validate()?;

        let half_world = settings.half_world();
        let herder_bounds = MovementBounds::square(half_world, settings.herder.bound_padding);
        let flock_bounds = MovementBounds::square(half_world, settings.flock.bounds_padding);
        let pen = PenDefinition::new(&settings.pen);
        let herder = Herder::new(settings.herder.spawn);
        let flock = Flock::spawn(&settings.flock, &mut rng);
        let session = SessionState::new(settings.level_timer_seconds, flock.len());

        Ok(Self {
            settings,
            herder_bounds,
            flock_bounds,
            pen,
            herder,
            flock,
            progress: PenProgress::default(),
            session,
            rng,
        })
    }

    /// Leave the start screen. Ignored outside Waiting.
    pub fn start(&mut self) -> Vec<GameEvent> {
        if self.session.phase != GamePhase::Waiting {
            log::debug!("start() ignored in {:?}", self.session.phase);
            return Vec::new();
        }
        log::info!(
            "Level started: {} sheep, {:.0}s on the clock",
            self.session.total_sheep,
            self.session.remaining_time
        );
        self.session.phase = GamePhase::Playing;
        vec![GameEvent::PhaseChanged(GamePhase::Playing)]
    }

    /// Reset every agent, the timer and the pen count, then play.
    ///
    /// Works from any phase; only an actual phase change is reported.
    pub fn restart(&mut self) -> Vec<GameEvent> {
        self.herder.reset();
        self.flock.reset(&self.settings.flock, &mut self.rng);
        self.progress.reset();

        let previous = self.session.phase;
        self.session = SessionState::new(self.settings.level_timer_seconds, self.flock.len());
        self.session.phase = GamePhase::Playing;
        log::info!("Level restarted (was {previous:?})");

        if previous == GamePhase::Playing {
            Vec::new()
        } else {
            vec![GameEvent::PhaseChanged(GamePhase::Playing)]
        }
    }

    /// Enter Won or Lost
    pub(super) fn finish(&mut self, phase: GamePhase, events: &mut Vec<GameEvent>) {
        debug_assert!(phase.is_finished());
        self.session.phase = phase;
        match phase {
            GamePhase::Won => log::info!(
                "Level won with {:.1}s remaining",
                self.session.remaining_time
            ),
            _ => log::info!(
                "Time up: {}/{} sheep penned",
                self.session.sheep_inside,
                self.session.total_sheep
            ),
        }
        events.push(GameEvent::PhaseChanged(phase));
    }

    /// Read-only view for renderers and HUDs
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            herder_position: self.herder.position(),
            herder_heading: self.herder.agent.heading,
            flock: self.flock.snapshots(),
            sheep_inside: self.session.sheep_inside,
            total_sheep: self.session.total_sheep,
            remaining_time: self.session.remaining_time,
            phase: self.session.phase,
            agents_visible: self.session.phase != GamePhase::Waiting,
            pen_highlight: self.progress.highlight,
            elapsed: self.session.elapsed,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn pen(&self) -> &PenDefinition {
        &self.pen
    }

    pub fn herder(&self) -> &Herder {
        &self.herder
    }

    pub fn flock(&self) -> &Flock {
        &self.flock
    }

    pub fn herder_bounds(&self) -> &MovementBounds {
        &self.herder_bounds
    }
}
