//! Per-tick round update
//!
//! Fixed order within a tick:
//! 1. integrate motion from the last step (built-in physics only)
//! 2. hazard steps (lose check after each)
//! 3. hazard purge of targets and projectiles
//! 4. target growth
//! 5. projectile recycling
//! 6. input and firing
//! 7. contacts (win check after each score; built-in physics only)
//!
//! The hazard runs before contacts, so anything caught behind the line is
//! destroyed rather than scored.

use super::collision::{ContactOutcome, EntityHandle, bounce_pair, detect_contacts, resolve_contact};
use super::input::{TickInput, apply_input, autopilot};
use super::state::{RemovalCause, RoundEvent, RoundOutcome, RoundState};

/// Advance the round by `dt_ms` of round time
pub fn tick(state: &mut RoundState, input: &TickInput, dt_ms: u64) {
    // Nothing moves once the round is decided
    if !state.is_playing() {
        return;
    }

    state.time_ms += dt_ms;
    let dt = dt_ms as f32 / 1000.0;

    let input = if input.idle_mode {
        autopilot(state)
    } else {
        *input
    };

    // Physics step; a host running its own physics moves entities itself
    let builtin_physics = state.settings.builtin_physics;
    if builtin_physics {
        let world = state.world();
        state.bar.integrate(dt, world.x);
        state.pool.integrate(dt);
        state.targets.integrate(dt, world);
    }

    advance_hazard(state);
    if !state.is_playing() {
        return;
    }
    purge_behind_hazard(state);

    while state.growth_timer.fire_due(state.time_ms) {
        let report = state.spawn_targets(state.settings.growth_count);
        log::debug!(
            "Growth at {} ms: +{} targets ({} on field)",
            state.time_ms,
            report.spawned.len(),
            state.targets.len()
        );
    }

    for slot in state.pool.recycle(state.settings.recycle_top) {
        state.push_event(RoundEvent::ProjectileReleased { slot });
    }

    apply_input(state, &input);

    // Host physics reports contacts through `Round::on_contact` instead
    if builtin_physics {
        resolve_contacts(state);
    }
}

fn advance_hazard(state: &mut RoundState) {
    while let Some(height) = state.hazard.step_due(state.time_ms) {
        state.push_event(RoundEvent::HazardAdvanced { height });
        log::debug!("Hazard advanced to {} at {} ms", height, state.time_ms);

        if height >= state.bar.top() {
            purge_behind_hazard(state);
            state.finish(RoundOutcome::Lost);
            return;
        }
    }
}

fn purge_behind_hazard(state: &mut RoundState) {
    let height = state.hazard.height();
    for id in state.targets.purge_behind(height) {
        state.push_event(RoundEvent::TargetRemoved {
            id,
            cause: RemovalCause::Hazard,
        });
    }
    for slot in state.pool.release_behind(height) {
        state.push_event(RoundEvent::ProjectileReleased { slot });
    }
}

fn resolve_contacts(state: &mut RoundState) {
    for (a, b) in detect_contacts(state) {
        match resolve_contact(state, a, b) {
            ContactOutcome::Bounced => {
                if let (EntityHandle::Target(x), EntityHandle::Target(y)) = (a, b) {
                    bounce_pair(state, x, y);
                }
            }
            ContactOutcome::Scored { .. } | ContactOutcome::Ignored => {}
        }
        if !state.is_playing() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::RoundStatus;
    use glam::Vec2;
    use proptest::prelude::*;

    fn quiet_settings() -> Settings {
        Settings {
            initial_targets: 0,
            growth_count: 0,
            ..Default::default()
        }
    }

    fn run_idle(state: &mut RoundState, until_ms: u64, dt_ms: u64) {
        let input = TickInput::default();
        while state.time_ms < until_ms && state.is_playing() {
            tick(state, &input, dt_ms);
        }
    }

    #[test]
    fn test_hazard_first_step_timing() {
        let mut state = RoundState::new(quiet_settings(), 1);
        run_idle(&mut state, 8192, 16);
        assert_eq!(state.hazard.height(), 0.0);
        run_idle(&mut state, 8208, 16);
        assert_eq!(state.hazard.height(), 20.0);
    }

    #[test]
    fn test_growth_schedule() {
        let settings = Settings {
            initial_targets: 0,
            ..Default::default()
        };
        let mut state = RoundState::new(settings, 2);
        run_idle(&mut state, 2992, 16);
        assert_eq!(state.targets.len(), 0);
        run_idle(&mut state, 3008, 16);
        assert_eq!(state.targets.len(), 5);
        run_idle(&mut state, 6000, 16);
        assert_eq!(state.targets.len(), 10);
    }

    #[test]
    fn test_hazard_beats_scoring() {
        let settings = Settings {
            hazard_start_delay_ms: 0,
            hazard_step_interval_ms: 100,
            hazard_increment: 200.0,
            ..quiet_settings()
        };
        let mut state = RoundState::new(settings, 3);
        let id = state.targets.place(Vec2::new(300.0, 150.0), Vec2::ZERO, 15.0, 0);
        let slot = state.pool.acquire().unwrap();
        state.pool.fire(slot, Vec2::new(300.0, 170.0), 300.0);

        tick(&mut state, &TickInput::default(), 100);

        assert_eq!(state.hazard.height(), 200.0);
        assert!(state.targets.get(id).is_none());
        assert!(!state.pool.is_active(slot));
        assert_eq!(state.score.destroyed, 0);
        assert!(state.drain_events().contains(&RoundEvent::TargetRemoved {
            id,
            cause: RemovalCause::Hazard
        }));
    }

    #[test]
    fn test_hazard_reaching_bar_loses() {
        let settings = Settings {
            hazard_start_delay_ms: 0,
            hazard_step_interval_ms: 100,
            hazard_increment: 800.0,
            ..quiet_settings()
        };
        let mut state = RoundState::new(settings, 4);
        tick(&mut state, &TickInput::default(), 100);
        assert_eq!(state.status, RoundStatus::Lost);
        assert!(!state.hazard.is_running());
    }

    #[test]
    fn test_loss_beats_win_in_same_tick() {
        // One hit would win, but the hazard reaches the bar first
        let settings = Settings {
            win_threshold: 1,
            hazard_start_delay_ms: 0,
            hazard_step_interval_ms: 100,
            hazard_increment: 800.0,
            ..quiet_settings()
        };
        let mut state = RoundState::new(settings, 31);
        let id = state.targets.place(Vec2::new(300.0, 400.0), Vec2::ZERO, 15.0, 0);
        let slot = state.pool.acquire().unwrap();
        // Ends the step at y = 380, still overlapping the target
        state.pool.fire(slot, Vec2::new(300.0, 410.0), 300.0);

        tick(&mut state, &TickInput::default(), 100);

        assert_eq!(state.status, RoundStatus::Lost);
        assert_eq!(state.score.destroyed, 0);
        assert!(state.targets.get(id).is_none());
        let events = state.drain_events();
        let ends: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, RoundEvent::RoundEnded { .. }))
            .collect();
        assert_eq!(
            ends,
            vec![&RoundEvent::RoundEnded {
                outcome: RoundOutcome::Lost
            }]
        );
        assert!(!events.contains(&RoundEvent::ScoreChanged { destroyed: 1 }));
    }

    #[test]
    fn test_host_physics_leaves_positions_alone() {
        let settings = Settings {
            builtin_physics: false,
            ..quiet_settings()
        };
        let mut state = RoundState::new(settings, 32);
        let moving = state
            .targets
            .place(Vec2::new(300.0, 400.0), Vec2::new(100.0, 0.0), 15.0, 0);
        let resting = state.targets.place(Vec2::new(310.0, 400.0), Vec2::ZERO, 15.0, 0);
        let slot = state.pool.acquire().unwrap();
        state.pool.fire(slot, Vec2::new(300.0, 405.0), 300.0);
        let bar_x = state.bar.pos.x;

        let steer = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut state, &steer, 1000);

        // Overlapping entities stay put and nothing scores or bounces
        assert_eq!(state.targets.get(moving).unwrap().pos, Vec2::new(300.0, 400.0));
        assert_eq!(state.targets.get(moving).unwrap().vel, Vec2::new(100.0, 0.0));
        assert_eq!(state.targets.get(resting).unwrap().pos, Vec2::new(310.0, 400.0));
        assert_eq!(state.pool.get(slot).unwrap().pos, Vec2::new(300.0, 405.0));
        assert_eq!(state.bar.pos.x, bar_x);
        assert_eq!(state.score.destroyed, 0);

        // Timers still run on round time
        assert_eq!(state.time_ms, 1000);
    }

    #[test]
    fn test_fire_and_score_through_tick() {
        let mut state = RoundState::new(quiet_settings(), 5);
        let muzzle = state.bar.left_muzzle();
        let id = state
            .targets
            .place(muzzle - Vec2::new(0.0, 100.0), Vec2::ZERO, 15.0, 0);

        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &fire, 16);
        assert_eq!(state.pool.active_count(), 2);

        run_idle(&mut state, 500, 16);
        assert!(state.targets.get(id).is_none());
        assert_eq!(state.score.destroyed, 1);
    }

    #[test]
    fn test_nothing_changes_after_terminal() {
        let mut state = RoundState::new(Settings::default(), 6);
        state.finish(RoundOutcome::Won);
        let targets = state.targets.len();
        let time = state.time_ms;

        let fire = TickInput {
            fire: true,
            left: true,
            ..Default::default()
        };
        for _ in 0..1000 {
            tick(&mut state, &fire, 16);
        }
        assert_eq!(state.time_ms, time);
        assert_eq!(state.targets.len(), targets);
        assert_eq!(state.pool.active_count(), 0);
        assert_eq!(state.bar.vel_x, 0.0);
    }

    #[test]
    fn test_determinism() {
        // Same seed and inputs give identical rounds
        let mut state1 = RoundState::new(Settings::default(), 99999);
        let mut state2 = RoundState::new(Settings::default(), 99999);

        let inputs = [
            TickInput {
                left: true,
                ..Default::default()
            },
            TickInput {
                fire: true,
                ..Default::default()
            },
            TickInput {
                idle_mode: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..200 {
            for input in &inputs {
                tick(&mut state1, input, 16);
                tick(&mut state2, input, 16);
            }
        }

        let a = serde_json::to_string(&state1.snapshot()).unwrap();
        let b = serde_json::to_string(&state2.snapshot()).unwrap();
        assert_eq!(a, b);
    }

    fn input_stream() -> impl Strategy<Value = Vec<(TickInput, u64)>> {
        prop::collection::vec(
            (any::<bool>(), any::<bool>(), any::<bool>(), 1u64..50).prop_map(
                |(left, right, fire, dt)| {
                    (
                        TickInput {
                            left,
                            right,
                            fire,
                            idle_mode: false,
                        },
                        dt,
                    )
                },
            ),
            1..400,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_round_invariants(seed in any::<u64>(), inputs in input_stream()) {
            let settings = Settings {
                pool_capacity: 6,
                win_threshold: 8,
                hazard_start_delay_ms: 500,
                hazard_step_interval_ms: 150,
                hazard_increment: 40.0,
                ..Default::default()
            };
            let delay = settings.hazard_start_delay_ms + settings.hazard_step_interval_ms;
            let increment = settings.hazard_increment;
            let capacity = settings.pool_capacity;
            let mut state = RoundState::new(settings, seed);

            let mut last_height = 0.0;
            let mut terminal: Option<(RoundStatus, u32, usize)> = None;

            for (input, dt) in &inputs {
                tick(&mut state, input, *dt);

                // Pool bounds and slot uniqueness
                let mut slots: Vec<_> = state.pool.iter_active().map(|p| p.slot).collect();
                prop_assert!(slots.len() <= capacity);
                slots.dedup();
                prop_assert_eq!(slots.len(), state.pool.active_count());

                // Hazard is a step sequence that starts after the delay
                let height = state.hazard.height();
                let diff = height - last_height;
                prop_assert!(diff == 0.0 || (diff - increment).abs() < 1e-3);
                if height > 0.0 {
                    prop_assert!(state.time_ms >= delay);
                }
                last_height = height;

                // Terminal exactly once, nothing moves afterwards
                match terminal {
                    None if state.status.is_terminal() => {
                        terminal = Some((
                            state.status,
                            state.score.destroyed,
                            state.targets.len(),
                        ));
                    }
                    None => {}
                    Some((status, destroyed, targets)) => {
                        prop_assert_eq!(state.status, status);
                        prop_assert_eq!(state.score.destroyed, destroyed);
                        prop_assert_eq!(state.targets.len(), targets);
                    }
                }
            }
        }
    }
}
