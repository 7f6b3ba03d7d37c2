//! Input translation: held directions become bar velocity, held fire becomes
//! projectile pairs gated by a cooldown.

use serde::{Deserialize, Serialize};

use super::state::{RoundEvent, RoundState};

/// Raw signals for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    /// Idle/demo mode - the autopilot plays the round
    pub idle_mode: bool,
}

/// Fire cooldown gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireControl {
    /// Round time of the last accepted fire
    pub last_fire_ms: Option<u64>,
    pub cooldown_ms: u64,
}

impl FireControl {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            last_fire_ms: None,
            cooldown_ms,
        }
    }

    /// Accept a fire request if strictly more than the cooldown has passed
    pub fn try_fire(&mut self, now_ms: u64) -> bool {
        if let Some(last) = self.last_fire_ms {
            if now_ms.saturating_sub(last) <= self.cooldown_ms {
                return false;
            }
        }
        self.last_fire_ms = Some(now_ms);
        true
    }
}

/// Accumulate held directions into horizontal velocity.
///
/// Holding a direction first kills any velocity the other way, then adds one
/// increment. Left is applied before right.
pub fn steer(vel_x: f32, input: &TickInput, accel: f32) -> f32 {
    let mut vel = vel_x;
    if input.left {
        if vel > 0.0 {
            vel = 0.0;
        }
        vel -= accel;
    }
    if input.right {
        if vel < 0.0 {
            vel = 0.0;
        }
        vel += accel;
    }
    vel
}

/// Apply one tick of input to the round. Returns how many projectiles fired.
pub fn apply_input(state: &mut RoundState, input: &TickInput) -> usize {
    state.bar.vel_x = steer(state.bar.vel_x, input, state.settings.bar_accel);

    if !input.fire || !state.fire.try_fire(state.time_ms) {
        return 0;
    }

    let speed = state.settings.projectile_speed;
    let mut fired = 0;
    for muzzle in [state.bar.left_muzzle(), state.bar.right_muzzle()] {
        // Exhausted pool: the shot is dropped
        let Some(slot) = state.pool.acquire() else {
            continue;
        };
        state.pool.fire(slot, muzzle, speed);
        let color = state.pool.get(slot).map_or(0, |p| p.color);
        state.push_event(RoundEvent::ProjectileFired {
            slot,
            pos: muzzle,
            color,
        });
        fired += 1;
    }
    if fired < 2 {
        log::debug!("Pool exhausted, {} of 2 shots fired", fired);
    }
    fired
}

/// Signals the autopilot would hold this tick: chase the nearest target's x
/// and keep firing.
pub fn autopilot(state: &RoundState) -> TickInput {
    let bar = &state.bar;
    let nearest = state.targets.all().iter().min_by(|a, b| {
        a.pos
            .distance_squared(bar.pos)
            .partial_cmp(&b.pos.distance_squared(bar.pos))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut input = TickInput {
        fire: true,
        ..Default::default()
    };
    let Some(target) = nearest else {
        return input;
    };

    // Lead the target by where it will be when a shot arrives
    let flight_secs = (bar.pos.y - target.pos.y).max(0.0) / state.settings.projectile_speed;
    let aim_x = target.pos.x + target.vel.x * flight_secs;
    let dx = aim_x - bar.pos.x;
    let dead_zone = bar.width / 4.0;
    let accel = state.settings.bar_accel;

    if dx < -dead_zone {
        input.left = true;
    } else if dx > dead_zone {
        input.right = true;
    } else if bar.vel_x > accel {
        // Tapping the opposite direction kills the residual velocity
        input.left = true;
    } else if bar.vel_x < -accel {
        input.right = true;
    }
    input
}
