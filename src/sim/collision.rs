//! Contact detection and response
//!
//! [`resolve_contact`] is the reaction half: it is what a host physics engine
//! calls from its contact callback. [`detect_contacts`] is a circle-overlap
//! pass so a round can run headless without an engine.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::field::{Target, TargetId};
use super::pool::SlotId;
use super::state::{RemovalCause, RoundEvent, RoundOutcome, RoundState};

/// One side of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityHandle {
    Projectile(SlotId),
    Target(TargetId),
}

/// What a contact did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// Projectile and target both consumed, score incremented
    Scored { destroyed: u32 },
    /// Two targets touched; bounce response belongs to the physics step
    Bounced,
    /// Stale handle, unsupported pair, or round already over
    Ignored,
}

/// React to a contact between two entities
pub fn resolve_contact(state: &mut RoundState, a: EntityHandle, b: EntityHandle) -> ContactOutcome {
    if !state.is_playing() {
        return ContactOutcome::Ignored;
    }

    match (a, b) {
        (EntityHandle::Projectile(slot), EntityHandle::Target(id))
        | (EntityHandle::Target(id), EntityHandle::Projectile(slot)) => {
            projectile_hit(state, slot, id)
        }
        (EntityHandle::Target(x), EntityHandle::Target(y)) if x != y => ContactOutcome::Bounced,
        _ => ContactOutcome::Ignored,
    }
}

fn projectile_hit(state: &mut RoundState, slot: SlotId, id: TargetId) -> ContactOutcome {
    // Either side may already be gone from an earlier contact this tick
    if !state.pool.is_active(slot) || state.targets.get(id).is_none() {
        return ContactOutcome::Ignored;
    }

    state.pool.release(slot);
    state.targets.remove(id);
    let won = state.score.record_hit();
    let destroyed = state.score.destroyed;

    state.push_event(RoundEvent::ProjectileReleased { slot });
    state.push_event(RoundEvent::TargetRemoved {
        id,
        cause: RemovalCause::Hit,
    });
    state.push_event(RoundEvent::ScoreChanged { destroyed });
    log::debug!("Target {:?} hit by slot {:?} ({} destroyed)", id, slot, destroyed);

    if won {
        state.finish(RoundOutcome::Won);
    }
    ContactOutcome::Scored { destroyed }
}

/// Find every overlapping projectile/target and target/target pair.
///
/// Each projectile reports at most one target (lowest id first); target
/// pairs are reported once with the lower id first.
pub fn detect_contacts(state: &RoundState) -> Vec<(EntityHandle, EntityHandle)> {
    let mut contacts = Vec::new();
    let projectile_radius = state.settings.projectile_radius;
    let targets = state.targets.all();

    for projectile in state.pool.iter_active() {
        let hit = targets
            .iter()
            .find(|t| circles_overlap(projectile.pos, projectile_radius, t.pos, t.radius));
        if let Some(target) = hit {
            contacts.push((
                EntityHandle::Projectile(projectile.slot),
                EntityHandle::Target(target.id),
            ));
        }
    }

    for (i, a) in targets.iter().enumerate() {
        for b in &targets[i + 1..] {
            if circles_overlap(a.pos, a.radius, b.pos, b.radius) {
                contacts.push((EntityHandle::Target(a.id), EntityHandle::Target(b.id)));
            }
        }
    }
    contacts
}

#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}

/// Equal-mass elastic bounce: swap the velocity components along the
/// contact normal and push the pair apart.
pub fn elastic_bounce(a: &mut Target, b: &mut Target) {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let normal = if dist > 1e-4 { delta / dist } else { Vec2::X };

    let approach = (a.vel - b.vel).dot(normal);
    if approach > 0.0 {
        a.vel -= normal * approach;
        b.vel += normal * approach;
    }

    let overlap = a.radius + b.radius - dist;
    if overlap > 0.0 {
        a.pos -= normal * (overlap / 2.0);
        b.pos += normal * (overlap / 2.0);
    }
}

/// Bounce a target pair in place by id
pub fn bounce_pair(state: &mut RoundState, x: TargetId, y: TargetId) {
    let targets = state.targets.all_mut();
    let Some(i) = targets.iter().position(|t| t.id == x) else {
        return;
    };
    let Some(j) = targets.iter().position(|t| t.id == y) else {
        return;
    };
    if i == j {
        return;
    }
    let (lo, hi) = (i.min(j), i.max(j));
    let (left, right) = targets.split_at_mut(hi);
    elastic_bounce(&mut left[lo], &mut right[0]);
}
