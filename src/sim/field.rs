//! Target field with overlap-avoiding spawn placement
//!
//! Placement is rejection sampling: draw a point in the spawn band, reject it
//! while it sits within one diameter of an existing target, give up after a
//! fixed number of attempts and apply the configured fallback.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::settings::SpawnFallback;

/// Unique target identifier (never reused within a round)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// A bubble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// 0xRRGGBB fill for the renderer
    pub color: u32,
}

/// Rectangle that candidate centers are drawn from (inclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnBand {
    pub min: Vec2,
    pub max: Vec2,
}

impl SpawnBand {
    /// Band below the hazard line, at most half a world tall.
    ///
    /// Collapses to a line at `hazard + radius` once the hazard has pushed
    /// past the lower limit.
    pub fn below_hazard(
        world: Vec2,
        hazard_height: f32,
        radius: f32,
        bottom_margin: f32,
    ) -> Self {
        let min_y = hazard_height + radius;
        let limit_y = world.y - bottom_margin - radius;
        let max_y = limit_y.min(min_y + world.y / 2.0 - radius).max(min_y);
        Self {
            min: Vec2::new(radius, min_y),
            max: Vec2::new((world.x - radius).max(radius), max_y),
        }
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            rng.random_range(self.min.x..=self.max.x),
            rng.random_range(self.min.y..=self.max.y),
        )
    }
}

/// Per-spawn parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRules {
    pub radius: f32,
    /// Velocity is uniform in [-max_speed, max_speed] on each axis
    pub max_speed: f32,
    pub max_attempts: u32,
    pub fallback: SpawnFallback,
}

/// What a spawn call actually did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnReport {
    pub spawned: Vec<TargetId>,
    /// Placed through the accept-overlap fallback
    pub overlapping: u32,
    /// Dropped through the skip fallback
    pub skipped: u32,
}

#[derive(Debug, Clone, Default)]
pub struct TargetField {
    /// Sorted by id (ids are allocated increasing)
    targets: Vec<Target>,
    next_id: u32,
}

impl TargetField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn all(&self) -> &[Target] {
        &self.targets
    }

    /// Mutable view for physics integration
    pub fn all_mut(&mut self) -> &mut [Target] {
        &mut self.targets
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.index_of(id).map(|i| &self.targets[i])
    }

    fn index_of(&self, id: TargetId) -> Option<usize> {
        self.targets.binary_search_by_key(&id, |t| t.id).ok()
    }

    fn allocate_id(&mut self) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a target at an exact position, bypassing placement rules
    pub fn place(&mut self, pos: Vec2, vel: Vec2, radius: f32, color: u32) -> TargetId {
        let id = self.allocate_id();
        self.targets.push(Target {
            id,
            pos,
            vel,
            radius,
            color,
        });
        id
    }

    /// True if a target centered at `pos` would sit closer than `min_dist` to any other
    pub fn is_crowded(&self, pos: Vec2, min_dist: f32) -> bool {
        let min_dist_sq = min_dist * min_dist;
        self.targets
            .iter()
            .any(|t| t.pos.distance_squared(pos) < min_dist_sq)
    }

    /// Spawn `count` targets inside `band`
    pub fn spawn<R: Rng>(
        &mut self,
        count: u32,
        band: &SpawnBand,
        rules: &SpawnRules,
        rng: &mut R,
    ) -> SpawnReport {
        let diameter = rules.radius * 2.0;
        let mut report = SpawnReport::default();

        for _ in 0..count {
            let mut pos = band.sample(rng);
            let mut attempts = 1;
            while self.is_crowded(pos, diameter) && attempts < rules.max_attempts {
                pos = band.sample(rng);
                attempts += 1;
            }

            if self.is_crowded(pos, diameter) {
                match rules.fallback {
                    SpawnFallback::AcceptOverlap => report.overlapping += 1,
                    SpawnFallback::Skip => {
                        report.skipped += 1;
                        continue;
                    }
                }
            }

            let vel = Vec2::new(
                rng.random_range(-rules.max_speed..=rules.max_speed),
                rng.random_range(-rules.max_speed..=rules.max_speed),
            );
            let color = random_color(rng);
            report
                .spawned
                .push(self.place(pos, vel, rules.radius, color));
        }

        if report.overlapping > 0 || report.skipped > 0 {
            log::debug!(
                "Spawn crowded: {} overlapping, {} skipped ({} targets)",
                report.overlapping,
                report.skipped,
                self.targets.len()
            );
        }
        report
    }

    pub fn remove(&mut self, id: TargetId) -> Option<Target> {
        self.index_of(id).map(|i| self.targets.remove(i))
    }

    /// Remove every target at or above the hazard line
    pub fn purge_behind(&mut self, hazard_height: f32) -> Vec<TargetId> {
        let mut purged = Vec::new();
        self.targets.retain(|t| {
            let behind = t.pos.y <= hazard_height;
            if behind {
                purged.push(t.id);
            }
            !behind
        });
        purged
    }

    /// Move targets and bounce them off the world edges
    pub fn integrate(&mut self, dt: f32, world: Vec2) {
        for target in &mut self.targets {
            target.pos += target.vel * dt;

            let r = target.radius;
            if target.pos.x < r {
                target.pos.x = r;
                target.vel.x = target.vel.x.abs();
            } else if target.pos.x > world.x - r {
                target.pos.x = world.x - r;
                target.vel.x = -target.vel.x.abs();
            }
            if target.pos.y < r {
                target.pos.y = r;
                target.vel.y = target.vel.y.abs();
            } else if target.pos.y > world.y - r {
                target.pos.y = world.y - r;
                target.vel.y = -target.vel.y.abs();
            }
        }
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }
}

/// Random fill color, avoiding very dark blues
pub fn random_color<R: Rng>(rng: &mut R) -> u32 {
    loop {
        let color = rng.random_range(0x111111u32..=0xffffff);
        if color & 0x0000ff >= 0x22 {
            return color;
        }
    }
}
