//! Round settings
//!
//! Every tunable of a round in one serializable struct. Defaults reproduce the
//! fixed schedule; a JSON file can override individual fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::RoundError;

/// What to do when target placement runs out of attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpawnFallback {
    /// Place the last candidate even though it overlaps
    #[default]
    AcceptOverlap,
    /// Drop this spawn entirely
    Skip,
}

/// Round settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === World ===
    pub world_width: f32,
    pub world_height: f32,

    // === Bar ===
    pub bar_width: f32,
    pub bar_height: f32,
    /// Distance from the bottom edge to the bar center
    pub bar_bottom_offset: f32,
    pub bar_accel: f32,
    pub shooter_size: f32,

    // === Projectiles ===
    pub pool_capacity: usize,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub recycle_top: f32,
    pub fire_cooldown_ms: u64,

    // === Targets ===
    pub target_radius: f32,
    pub target_max_speed: f32,
    pub initial_targets: u32,
    pub growth_count: u32,
    pub growth_interval_ms: u64,
    pub spawn_max_attempts: u32,
    pub spawn_bottom_margin: f32,
    pub spawn_fallback: SpawnFallback,

    // === Hazard ===
    pub hazard_start_delay_ms: u64,
    pub hazard_step_interval_ms: u64,
    pub hazard_increment: f32,

    // === Scoring ===
    pub win_threshold: u32,

    // === Host ===
    /// Move entities and detect contacts inside `tick`. Turn off when the
    /// host runs its own physics and reports contacts through `on_contact`.
    pub builtin_physics: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,

            bar_width: BAR_WIDTH,
            bar_height: BAR_HEIGHT,
            bar_bottom_offset: BAR_BOTTOM_OFFSET,
            bar_accel: BAR_ACCEL,
            shooter_size: SHOOTER_SIZE,

            pool_capacity: POOL_CAPACITY,
            projectile_speed: PROJECTILE_SPEED,
            projectile_radius: PROJECTILE_RADIUS,
            recycle_top: RECYCLE_TOP,
            fire_cooldown_ms: FIRE_COOLDOWN_MS,

            target_radius: TARGET_RADIUS,
            target_max_speed: TARGET_MAX_SPEED,
            initial_targets: INITIAL_TARGETS,
            growth_count: GROWTH_COUNT,
            growth_interval_ms: GROWTH_INTERVAL_MS,
            spawn_max_attempts: SPAWN_MAX_ATTEMPTS,
            spawn_bottom_margin: SPAWN_BOTTOM_MARGIN,
            spawn_fallback: SpawnFallback::default(),

            hazard_start_delay_ms: HAZARD_START_DELAY_MS,
            hazard_step_interval_ms: HAZARD_STEP_INTERVAL_MS,
            hazard_increment: HAZARD_INCREMENT,

            win_threshold: WIN_THRESHOLD,

            builtin_physics: true,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, RoundError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and parse a settings file
    pub fn from_file(path: &Path) -> Result<Self, RoundError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from a file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Reject settings that would stall timers or make placement impossible
    pub fn validate(&self) -> Result<(), RoundError> {
        let invalid = |reason: &str| Err(RoundError::InvalidSettings(reason.to_string()));

        if self.pool_capacity == 0 {
            return invalid("pool_capacity must be at least 1");
        }
        if self.growth_interval_ms == 0 || self.hazard_step_interval_ms == 0 {
            return invalid("timer intervals must be non-zero");
        }
        if self.hazard_increment <= 0.0 {
            return invalid("hazard_increment must be positive");
        }
        if self.target_radius <= 0.0 {
            return invalid("target_radius must be positive");
        }
        if self.world_width < self.target_radius * 2.0
            || self.world_height < self.target_radius * 2.0
        {
            return invalid("world is smaller than a single target");
        }
        if self.world_width < self.bar_width {
            return invalid("world is narrower than the bar");
        }
        if self.spawn_max_attempts == 0 {
            return invalid("spawn_max_attempts must be at least 1");
        }
        if self.win_threshold == 0 {
            return invalid("win_threshold must be at least 1");
        }
        Ok(())
    }
}
