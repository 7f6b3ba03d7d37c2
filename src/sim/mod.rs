//! Deterministic round simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Round time advances only through `tick`
//! - Seeded RNG only
//! - Stable iteration order (pool slot index, target id)
//! - No rendering or platform dependencies

pub mod collision;
pub mod field;
pub mod hazard;
pub mod input;
pub mod pool;
pub mod score;
pub mod state;
pub mod tick;
pub mod timer;

pub use collision::{ContactOutcome, EntityHandle, detect_contacts, resolve_contact};
pub use field::{SpawnBand, SpawnReport, SpawnRules, Target, TargetField, TargetId};
pub use hazard::HazardTimeline;
pub use input::{FireControl, TickInput, autopilot};
pub use pool::{Projectile, ProjectilePool, SlotId};
pub use score::ScoreKeeper;
pub use state::{
    Bar, RemovalCause, RoundEvent, RoundOutcome, RoundSnapshot, RoundState, RoundStatus,
};
pub use tick::tick;
pub use timer::RepeatingTimer;
