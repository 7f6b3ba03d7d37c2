//! Host-facing round driver
//!
//! The host engine owns the clock, the input devices and the scenes. It drives
//! a [`Round`] through plain hooks and receives readiness and the round result
//! through the [`SceneHost`] it supplied at construction.

use serde::{Deserialize, Serialize};

use crate::error::RoundError;
use crate::settings::Settings;
use crate::sim::{
    ContactOutcome, EntityHandle, RoundEvent, RoundOutcome, RoundState, TickInput,
    resolve_contact, tick,
};

/// Payload handed to the scene transition when a round ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundEnd {
    pub result: RoundOutcome,
}

/// Scene-side callbacks
pub trait SceneHost {
    /// Initialization finished; the round will accept ticks
    fn round_ready(&mut self) {}

    /// The round is over; move on to the next screen
    fn transition_to(&mut self, payload: RoundEnd);
}

/// Raw input, polled once per tick
pub trait InputSource {
    fn poll(&mut self) -> TickInput;
}

impl<F: FnMut() -> TickInput> InputSource for F {
    fn poll(&mut self) -> TickInput {
        self()
    }
}

pub struct Round<H: SceneHost, I: InputSource> {
    settings: Settings,
    seed: u64,
    host: H,
    input: Option<I>,
    state: Option<RoundState>,
    /// The result has been handed to the host
    ended: bool,
}

impl<H: SceneHost, I: InputSource> Round<H, I> {
    /// `input` is `None` when the host has no input device to offer; the
    /// round then refuses to start.
    pub fn new(settings: Settings, seed: u64, host: H, input: Option<I>) -> Self {
        Self {
            settings,
            seed,
            host,
            input,
            state: None,
            ended: false,
        }
    }

    /// Build a fresh round (also used to play again after a result)
    pub fn on_round_start(&mut self) -> Result<(), RoundError> {
        if self.input.is_none() {
            return Err(RoundError::InputUnavailable);
        }
        self.settings.validate()?;

        if let Some(mut old) = self.state.take() {
            old.shut_down();
        }
        let state = RoundState::new(self.settings.clone(), self.seed);
        log::info!(
            "Round started (seed {}, {} targets, win at {})",
            self.seed,
            state.targets.len(),
            state.score.threshold
        );
        self.state = Some(state);
        self.ended = false;
        // Next play-again round gets a different layout
        self.seed = self.seed.wrapping_add(1);

        self.host.round_ready();
        Ok(())
    }

    /// Advance by `dt_ms`. Does nothing before start or after teardown.
    pub fn on_tick(&mut self, dt_ms: u64) {
        let (Some(state), Some(input)) = (self.state.as_mut(), self.input.as_mut()) else {
            return;
        };
        let polled = input.poll();
        tick(state, &polled, dt_ms);
        self.report_end();
    }

    /// Contact reported by the host physics engine
    pub fn on_contact(&mut self, a: EntityHandle, b: EntityHandle) -> ContactOutcome {
        let Some(state) = self.state.as_mut() else {
            return ContactOutcome::Ignored;
        };
        let outcome = resolve_contact(state, a, b);
        self.report_end();
        outcome
    }

    /// Cancel timers and drop the round; later ticks are ignored
    pub fn on_teardown(&mut self) {
        if let Some(mut state) = self.state.take() {
            state.shut_down();
            log::info!("Round torn down at {} ms", state.time_ms);
        }
    }

    fn report_end(&mut self) {
        if self.ended {
            return;
        }
        let Some(outcome) = self.state.as_ref().and_then(|s| s.status.outcome()) else {
            return;
        };
        self.ended = true;
        self.host.transition_to(RoundEnd { result: outcome });
    }

    /// Render intents recorded since the last call
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        self.state
            .as_mut()
            .map(RoundState::drain_events)
            .unwrap_or_default()
    }

    pub fn state(&self) -> Option<&RoundState> {
        self.state.as_ref()
    }

    /// Direct access for hosts that place entities themselves
    pub fn state_mut(&mut self) -> Option<&mut RoundState> {
        self.state.as_mut()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_over(&self) -> bool {
        self.ended
    }
}
