//! Bubble Destroy headless runner
//!
//! Plays one round on the autopilot with a fixed timestep and logs the
//! result. Usage: `bubble-destroy [settings.json] [seed]`

use std::path::Path;

use bubble_destroy::consts::SIM_DT_MS;
use bubble_destroy::sim::{RoundEvent, TickInput};
use bubble_destroy::{Round, RoundEnd, SceneHost, Settings};

/// Hard stop in case a custom settings file never ends the round
const MAX_ROUND_MS: u64 = 10 * 60 * 1000;

#[derive(Default)]
struct ConsoleHost {
    result: Option<RoundEnd>,
}

impl SceneHost for ConsoleHost {
    fn round_ready(&mut self) {
        log::info!("Round ready");
    }

    fn transition_to(&mut self, payload: RoundEnd) {
        log::info!("Transition to game over: {:?}", payload.result);
        self.result = Some(payload);
    }
}

struct Autopilot;

impl bubble_destroy::InputSource for Autopilot {
    fn poll(&mut self) -> TickInput {
        TickInput {
            idle_mode: true,
            ..Default::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bubble Destroy (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = args
        .next()
        .map(|path| Settings::load(Path::new(&path)))
        .unwrap_or_default();
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x0B0B_B1E5);

    let mut round = Round::new(settings, seed, ConsoleHost::default(), Some(Autopilot));
    if let Err(e) = round.on_round_start() {
        log::error!("Round failed to start: {e}");
        std::process::exit(1);
    }

    let mut elapsed = 0;
    let mut shots = 0u32;
    while !round.is_over() && elapsed < MAX_ROUND_MS {
        round.on_tick(SIM_DT_MS);
        elapsed += SIM_DT_MS;
        shots += round
            .drain_events()
            .iter()
            .filter(|e| matches!(e, RoundEvent::ProjectileFired { .. }))
            .count() as u32;
    }

    if let Some(state) = round.state() {
        match serde_json::to_string_pretty(&state.snapshot()) {
            Ok(json) => log::debug!("Final snapshot:\n{json}"),
            Err(e) => log::warn!("Snapshot failed: {e}"),
        }
        println!(
            "{:?} after {:.1}s: {} destroyed, {} shots, hazard at {}",
            state.status,
            state.time_ms as f64 / 1000.0,
            state.score.destroyed,
            shots,
            state.hazard.height()
        );
    }
    round.on_teardown();

    if round.host().result.is_none() {
        log::warn!("Round did not finish within {} ms", MAX_ROUND_MS);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host drives `Round` directly
}
