//! Fixed-capacity projectile pool
//!
//! Slots are allocated once and recycled forever. A free list hands out the
//! lowest free index first so iteration and reuse stay deterministic. Each
//! slot draws its color once, so a reused slot keeps its look.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::field::random_color;

/// Handle to one pool slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub usize);

/// A projectile slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub slot: SlotId,
    pub pos: Vec2,
    /// Vertical velocity (negative is up)
    pub vel_y: f32,
    pub active: bool,
    /// Whether the renderer should draw it
    pub visible: bool,
    /// Fixed for the lifetime of the slot
    pub color: u32,
}

impl Projectile {
    fn idle(slot: usize, color: u32) -> Self {
        Self {
            slot: SlotId(slot),
            pos: Vec2::ZERO,
            vel_y: 0.0,
            active: false,
            visible: false,
            color,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProjectilePool {
    slots: Vec<Projectile>,
    /// Inactive slot indices, lowest on top
    free: Vec<usize>,
}

impl ProjectilePool {
    pub fn new<R: Rng>(capacity: usize, rng: &mut R) -> Self {
        Self {
            slots: (0..capacity)
                .map(|slot| Projectile::idle(slot, random_color(rng)))
                .collect(),
            free: (0..capacity).rev().collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_active(&self, slot: SlotId) -> bool {
        self.slots.get(slot.0).is_some_and(|p| p.active)
    }

    pub fn get(&self, slot: SlotId) -> Option<&Projectile> {
        self.slots.get(slot.0)
    }

    /// Claim an inactive slot. `None` when every slot is in flight.
    pub fn acquire(&mut self) -> Option<SlotId> {
        let index = self.free.pop()?;
        let projectile = &mut self.slots[index];
        debug_assert!(!projectile.active);
        projectile.active = true;
        Some(SlotId(index))
    }

    /// Launch an acquired slot straight up from `pos`
    pub fn fire(&mut self, slot: SlotId, pos: Vec2, speed: f32) {
        if let Some(projectile) = self.slots.get_mut(slot.0).filter(|p| p.active) {
            projectile.pos = pos;
            projectile.vel_y = -speed.abs();
            projectile.visible = true;
        }
    }

    /// Return a slot to the pool. Releasing an inactive slot is a no-op;
    /// returns whether anything changed.
    pub fn release(&mut self, slot: SlotId) -> bool {
        match self.slots.get_mut(slot.0) {
            Some(projectile) if projectile.active => {
                projectile.active = false;
                projectile.visible = false;
                projectile.vel_y = 0.0;
                self.free.push(slot.0);
                true
            }
            _ => false,
        }
    }

    /// Release every active projectile that has flown above `bounds_top`
    pub fn recycle(&mut self, bounds_top: f32) -> Vec<SlotId> {
        self.release_where(|p| p.pos.y < bounds_top)
    }

    /// Release every active projectile at or above the hazard line
    pub fn release_behind(&mut self, hazard_height: f32) -> Vec<SlotId> {
        self.release_where(|p| p.pos.y <= hazard_height)
    }

    fn release_where(&mut self, pred: impl Fn(&Projectile) -> bool) -> Vec<SlotId> {
        let doomed: Vec<SlotId> = self
            .slots
            .iter()
            .filter(|p| p.active && pred(p))
            .map(|p| p.slot)
            .collect();
        for &slot in &doomed {
            self.release(slot);
        }
        doomed
    }

    /// Move active projectiles by their velocity
    pub fn integrate(&mut self, dt: f32) {
        for projectile in self.slots.iter_mut().filter(|p| p.active) {
            projectile.pos.y += projectile.vel_y * dt;
        }
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Projectile> {
        self.slots.iter().filter(|p| p.active)
    }

    /// Release everything (teardown). Slot colors survive.
    pub fn clear(&mut self) {
        for projectile in &mut self.slots {
            *projectile = Projectile::idle(projectile.slot.0, projectile.color);
        }
        self.free = (0..self.slots.len()).rev().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pool(capacity: usize) -> ProjectilePool {
        ProjectilePool::new(capacity, &mut Pcg32::seed_from_u64(7))
    }

    #[test]
    fn test_acquire_until_exhausted() {
        let mut pool = pool(3);
        assert_eq!(pool.acquire(), Some(SlotId(0)));
        assert_eq!(pool.acquire(), Some(SlotId(1)));
        assert_eq!(pool.acquire(), Some(SlotId(2)));
        assert_eq!(pool.acquire(), None);
        assert_eq!(pool.active_count(), 3);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut pool = pool(2);
        let slot = pool.acquire().unwrap();
        assert!(pool.release(slot));
        assert!(!pool.release(slot));
        assert_eq!(pool.active_count(), 0);

        // A double release must not hand the slot out twice
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.acquire(), None);
    }

    #[test]
    fn test_fire_sets_upward_velocity() {
        let mut pool = pool(1);
        let slot = pool.acquire().unwrap();
        pool.fire(slot, Vec2::new(100.0, 700.0), 300.0);
        let p = pool.get(slot).unwrap();
        assert_eq!(p.pos, Vec2::new(100.0, 700.0));
        assert_eq!(p.vel_y, -300.0);
        assert!(p.visible);
    }

    #[test]
    fn test_fire_on_inactive_slot_is_ignored() {
        let mut pool = pool(1);
        pool.fire(SlotId(0), Vec2::new(5.0, 5.0), 300.0);
        assert!(!pool.get(SlotId(0)).unwrap().visible);
    }

    #[test]
    fn test_recycle_above_top() {
        let mut pool = pool(2);
        let high = pool.acquire().unwrap();
        let low = pool.acquire().unwrap();
        pool.fire(high, Vec2::new(0.0, -60.0), 300.0);
        pool.fire(low, Vec2::new(0.0, 400.0), 300.0);

        let released = pool.recycle(-50.0);
        assert_eq!(released, vec![high]);
        assert!(pool.is_active(low));
        assert!(!pool.is_active(high));
    }

    #[test]
    fn test_release_behind_hazard() {
        let mut pool = pool(2);
        let slot = pool.acquire().unwrap();
        pool.fire(slot, Vec2::new(0.0, 40.0), 300.0);
        assert!(pool.release_behind(39.0).is_empty());
        assert_eq!(pool.release_behind(40.0), vec![slot]);
    }

    #[test]
    fn test_integrate_moves_up() {
        let mut pool = pool(1);
        let slot = pool.acquire().unwrap();
        pool.fire(slot, Vec2::new(0.0, 300.0), 300.0);
        pool.integrate(0.5);
        assert!((pool.get(slot).unwrap().pos.y - 150.0).abs() < 1e-4);
    }

    #[test]
    fn test_slot_color_survives_reuse_and_clear() {
        let mut pool = pool(4);
        let colors: Vec<u32> = pool.slots.iter().map(|p| p.color).collect();
        assert!(colors.iter().all(|&c| (0x111111..=0xffffff).contains(&c)));
        assert!(colors.iter().all(|&c| c & 0xff >= 0x22));

        let slot = pool.acquire().unwrap();
        pool.fire(slot, Vec2::new(10.0, 10.0), 300.0);
        pool.release(slot);
        assert_eq!(pool.acquire(), Some(slot));
        assert_eq!(pool.get(slot).unwrap().color, colors[slot.0]);

        pool.clear();
        let after: Vec<u32> = pool.slots.iter().map(|p| p.color).collect();
        assert_eq!(after, colors);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_same_seed_same_colors() {
        let a: Vec<u32> = pool(6).slots.iter().map(|p| p.color).collect();
        let b: Vec<u32> = pool(6).slots.iter().map(|p| p.color).collect();
        assert_eq!(a, b);
    }
}
