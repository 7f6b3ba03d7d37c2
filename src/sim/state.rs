//! Round state and the round state machine
//!
//! Everything one round mutates lives in [`RoundState`]. Status moves from
//! `Playing` to `Won` or `Lost` exactly once; [`RoundState::finish`] is the
//! only way out of `Playing`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::field::{SpawnBand, SpawnReport, SpawnRules, Target, TargetField, TargetId};
use super::hazard::HazardTimeline;
use super::input::FireControl;
use super::pool::{Projectile, ProjectilePool, SlotId};
use super::score::ScoreKeeper;
use super::timer::RepeatingTimer;
use crate::settings::Settings;

/// Terminal result of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Won,
    Lost,
}

/// Round status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStatus {
    Playing,
    Won,
    Lost,
}

impl RoundStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RoundStatus::Playing)
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        match self {
            RoundStatus::Playing => None,
            RoundStatus::Won => Some(RoundOutcome::Won),
            RoundStatus::Lost => Some(RoundOutcome::Lost),
        }
    }
}

impl From<RoundOutcome> for RoundStatus {
    fn from(outcome: RoundOutcome) -> Self {
        match outcome {
            RoundOutcome::Won => RoundStatus::Won,
            RoundOutcome::Lost => RoundStatus::Lost,
        }
    }
}

/// Why a target left the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    Hit,
    Hazard,
}

/// Things the renderer and host care about, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoundEvent {
    TargetSpawned {
        id: TargetId,
        pos: Vec2,
        radius: f32,
        color: u32,
    },
    TargetRemoved {
        id: TargetId,
        cause: RemovalCause,
    },
    ProjectileFired {
        slot: SlotId,
        pos: Vec2,
        color: u32,
    },
    ProjectileReleased {
        slot: SlotId,
    },
    HazardAdvanced {
        height: f32,
    },
    ScoreChanged {
        destroyed: u32,
    },
    RoundEnded {
        outcome: RoundOutcome,
    },
}

/// The player's bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    /// Center of the bar
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Horizontal velocity (units/s)
    pub vel_x: f32,
    pub shooter_size: f32,
}

impl Bar {
    pub fn new(settings: &Settings) -> Self {
        Self {
            pos: Vec2::new(
                settings.world_width / 2.0,
                settings.world_height - settings.bar_bottom_offset,
            ),
            width: settings.bar_width,
            height: settings.bar_height,
            vel_x: 0.0,
            shooter_size: settings.shooter_size,
        }
    }

    /// Top edge; the hazard line wins when it gets here
    pub fn top(&self) -> f32 {
        self.pos.y - self.height / 2.0
    }

    pub fn left_muzzle(&self) -> Vec2 {
        Vec2::new(
            self.pos.x - self.width / 2.0 + self.shooter_size / 2.0,
            self.pos.y - self.shooter_size,
        )
    }

    pub fn right_muzzle(&self) -> Vec2 {
        Vec2::new(
            self.pos.x + self.width / 2.0 - self.shooter_size / 2.0,
            self.pos.y - self.shooter_size,
        )
    }

    /// Move by velocity, staying inside the world
    pub fn integrate(&mut self, dt: f32, world_width: f32) {
        let half = self.width / 2.0;
        self.pos.x = (self.pos.x + self.vel_x * dt).clamp(half, world_width - half);
    }
}

/// Serializable view of a round for renderers and debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub time_ms: u64,
    pub status: RoundStatus,
    pub destroyed: u32,
    pub win_threshold: u32,
    pub hazard_height: f32,
    pub bar: Bar,
    pub projectiles: Vec<Projectile>,
    pub targets: Vec<Target>,
}

/// Complete round state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct RoundState {
    pub settings: Settings,
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Round time since start (ms)
    pub time_ms: u64,
    pub status: RoundStatus,
    pub bar: Bar,
    pub pool: ProjectilePool,
    pub targets: TargetField,
    pub hazard: HazardTimeline,
    pub score: ScoreKeeper,
    pub fire: FireControl,
    pub(crate) growth_timer: RepeatingTimer,
    events: Vec<RoundEvent>,
}

impl RoundState {
    /// Fresh round with the initial targets already spawned
    pub fn new(settings: Settings, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let pool = ProjectilePool::new(settings.pool_capacity, &mut rng);
        let mut state = Self {
            seed,
            rng,
            time_ms: 0,
            status: RoundStatus::Playing,
            bar: Bar::new(&settings),
            pool,
            targets: TargetField::new(),
            hazard: HazardTimeline::new(
                settings.hazard_start_delay_ms,
                settings.hazard_step_interval_ms,
                settings.hazard_increment,
            ),
            score: ScoreKeeper::new(settings.win_threshold),
            fire: FireControl::new(settings.fire_cooldown_ms),
            growth_timer: RepeatingTimer::new(
                settings.growth_interval_ms,
                settings.growth_interval_ms,
            ),
            events: Vec::new(),
            settings,
        };

        let initial = state.settings.initial_targets;
        state.spawn_targets(initial);
        state
    }

    pub fn world(&self) -> Vec2 {
        Vec2::new(self.settings.world_width, self.settings.world_height)
    }

    pub fn is_playing(&self) -> bool {
        self.status == RoundStatus::Playing
    }

    pub(crate) fn push_event(&mut self, event: RoundEvent) {
        self.events.push(event);
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[RoundEvent] {
        &self.events
    }

    /// Spawn targets below the hazard line. No-op once the round is over.
    pub fn spawn_targets(&mut self, count: u32) -> SpawnReport {
        if !self.is_playing() {
            return SpawnReport::default();
        }

        let band = SpawnBand::below_hazard(
            self.world(),
            self.hazard.height(),
            self.settings.target_radius,
            self.settings.spawn_bottom_margin,
        );
        let rules = SpawnRules {
            radius: self.settings.target_radius,
            max_speed: self.settings.target_max_speed,
            max_attempts: self.settings.spawn_max_attempts,
            fallback: self.settings.spawn_fallback,
        };
        let report = self.targets.spawn(count, &band, &rules, &mut self.rng);

        for &id in &report.spawned {
            if let Some(t) = self.targets.get(id) {
                let event = RoundEvent::TargetSpawned {
                    id,
                    pos: t.pos,
                    radius: t.radius,
                    color: t.color,
                };
                self.events.push(event);
            }
        }
        report
    }

    /// Enter a terminal state. Returns false if the round was already over.
    ///
    /// Stops the hazard and growth timers and records `RoundEnded`.
    pub fn finish(&mut self, outcome: RoundOutcome) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.status = outcome.into();
        self.hazard.cancel();
        self.growth_timer.cancel();
        self.push_event(RoundEvent::RoundEnded { outcome });
        log::info!(
            "Round over: {:?} at {} ms ({} / {} destroyed, hazard at {})",
            outcome,
            self.time_ms,
            self.score.destroyed,
            self.score.threshold,
            self.hazard.height()
        );
        true
    }

    /// Cancel timers and clear entities (teardown)
    pub fn shut_down(&mut self) {
        self.hazard.cancel();
        self.growth_timer.cancel();
        self.pool.clear();
        self.targets.clear();
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            time_ms: self.time_ms,
            status: self.status,
            destroyed: self.score.destroyed,
            win_threshold: self.score.threshold,
            hazard_height: self.hazard.height(),
            bar: self.bar.clone(),
            projectiles: self.pool.iter_active().cloned().collect(),
            targets: self.targets.all().to_vec(),
        }
    }
}
