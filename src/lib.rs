//! Bubble Destroy - round simulation for a bar-vs-bubbles arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic round simulation (pool, targets, hazard, scoring)
//! - `round`: Host-facing lifecycle driver (start, tick, contact, teardown)
//! - `settings`: Round configuration with JSON loading
//! - `error`: Errors surfaced to the host

pub mod error;
pub mod round;
pub mod settings;
pub mod sim;

pub use error::RoundError;
pub use round::{InputSource, Round, RoundEnd, SceneHost};
pub use settings::{Settings, SpawnFallback};

/// Round configuration constants (defaults for [`Settings`])
pub mod consts {
    /// Fixed simulation step used by the headless runner (ms)
    pub const SIM_DT_MS: u64 = 16;

    /// Play area
    pub const WORLD_WIDTH: f32 = 1024.0;
    pub const WORLD_HEIGHT: f32 = 768.0;

    /// Bar sits near the bottom center
    pub const BAR_WIDTH: f32 = 150.0;
    pub const BAR_HEIGHT: f32 = 20.0;
    pub const BAR_BOTTOM_OFFSET: f32 = 10.0;
    /// Velocity added per tick while a direction is held
    pub const BAR_ACCEL: f32 = 10.0;
    pub const SHOOTER_SIZE: f32 = 20.0;

    /// Projectile pool
    pub const POOL_CAPACITY: usize = 30;
    pub const PROJECTILE_SPEED: f32 = 300.0;
    pub const PROJECTILE_RADIUS: f32 = 10.0;
    /// Projectiles above this y are recycled
    pub const RECYCLE_TOP: f32 = -50.0;
    pub const FIRE_COOLDOWN_MS: u64 = 200;

    /// Targets
    pub const TARGET_RADIUS: f32 = 15.0;
    /// Max speed per axis (units/s), sign unconstrained
    pub const TARGET_MAX_SPEED: f32 = 100.0;
    pub const INITIAL_TARGETS: u32 = 15;
    pub const GROWTH_COUNT: u32 = 5;
    pub const GROWTH_INTERVAL_MS: u64 = 3000;
    pub const SPAWN_MAX_ATTEMPTS: u32 = 100;
    /// Spawn band keeps this far above the bottom edge
    pub const SPAWN_BOTTOM_MARGIN: f32 = 50.0;

    /// Hazard line
    pub const HAZARD_START_DELAY_MS: u64 = 7000;
    pub const HAZARD_STEP_INTERVAL_MS: u64 = 1200;
    pub const HAZARD_INCREMENT: f32 = 20.0;

    pub const WIN_THRESHOLD: u32 = 75;
}
