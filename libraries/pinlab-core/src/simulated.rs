//! In-memory pin driver
//!
//! `SimulatedBoard` stands in for the physical header. It is shared (cheap
//! to clone) and outlives the drivers created from it, so a test can hand a
//! driver to an exercise, drop the exercise, and then inspect what the pins
//! were left at. The `--simulate` flag of the binaries uses it too; every
//! pin change is logged.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

use crate::error::{PinError, Result};
use crate::traits::PinDriver;
use crate::types::{DutyCycle, Level, PinId};

/// Running PWM parameters of a simulated pin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PwmState {
    pub frequency_hz: f64,
    pub duty: DutyCycle,
}

/// Observable state of one simulated pin
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PinState {
    pub level: Level,
    pub pwm: Option<PwmState>,
    pub claimed: bool,
    /// Number of level writes, including the initial one at claim time
    pub writes: usize,
}

#[derive(Debug, Default)]
struct BoardState {
    pins: BTreeMap<PinId, PinState>,
    /// Driver that claimed each pin most recently
    owners: BTreeMap<PinId, u64>,
    next_driver_id: u64,
    fail_next: Option<String>,
}

/// Shared simulated GPIO header
#[derive(Debug, Clone, Default)]
pub struct SimulatedBoard {
    state: Arc<Mutex<BoardState>>,
}

impl SimulatedBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a driver that claims pins on this board
    pub fn driver(&self) -> SimulatedDriver {
        let id = {
            let mut state = self.lock();
            state.next_driver_id += 1;
            state.next_driver_id
        };

        SimulatedDriver {
            board: self.clone(),
            id,
            owned: BTreeSet::new(),
        }
    }

    /// Make the next driver call fail with `message`
    pub fn fail_next_operation(&self, message: impl Into<String>) {
        self.lock().fail_next = Some(message.into());
    }

    pub fn pin_state(&self, pin: PinId) -> Option<PinState> {
        self.lock().pins.get(&pin).cloned()
    }

    /// Last level written to a pin, if it was ever claimed
    pub fn level(&self, pin: PinId) -> Option<Level> {
        self.lock().pins.get(&pin).map(|state| state.level)
    }

    /// Duty cycle of a pin currently running PWM
    pub fn duty_cycle(&self, pin: PinId) -> Option<DutyCycle> {
        self.lock()
            .pins
            .get(&pin)
            .and_then(|state| state.pwm)
            .map(|pwm| pwm.duty)
    }

    pub fn is_claimed(&self, pin: PinId) -> bool {
        self.lock()
            .pins
            .get(&pin)
            .is_some_and(|state| state.claimed)
    }

    pub fn claimed_pins(&self) -> Vec<PinId> {
        self.lock()
            .pins
            .iter()
            .filter(|(_, state)| state.claimed)
            .map(|(pin, _)| *pin)
            .collect()
    }

    /// Pins currently driven high
    pub fn high_pins(&self) -> Vec<PinId> {
        self.lock()
            .pins
            .iter()
            .filter(|(_, state)| state.level.is_high())
            .map(|(pin, _)| *pin)
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pin driver backed by a [`SimulatedBoard`]
#[derive(Debug)]
pub struct SimulatedDriver {
    board: SimulatedBoard,
    id: u64,
    owned: BTreeSet<PinId>,
}

impl SimulatedDriver {
    pub fn board(&self) -> &SimulatedBoard {
        &self.board
    }

    fn check_failure(state: &mut BoardState) -> Result<()> {
        match state.fail_next.take() {
            Some(message) => Err(PinError::Driver(message)),
            None => Ok(()),
        }
    }

    fn ensure_owned(&self, pin: PinId) -> Result<()> {
        if self.owned.contains(&pin) {
            Ok(())
        } else {
            Err(PinError::NotClaimed(pin))
        }
    }
}

impl PinDriver for SimulatedDriver {
    fn claim_output(&mut self, pin: PinId, initial: Level) -> Result<()> {
        let mut state = self.board.lock();
        Self::check_failure(&mut state)?;

        let entry = state.pins.entry(pin).or_default();
        if entry.claimed && !self.owned.contains(&pin) {
            warn!(pin = %pin, "Pin is already in use, continuing anyway");
        }
        entry.claimed = true;
        entry.level = initial;
        entry.pwm = None;
        entry.writes += 1;
        state.owners.insert(pin, self.id);
        drop(state);

        self.owned.insert(pin);
        info!(pin = %pin, level = %initial, "[sim] claimed output");
        Ok(())
    }

    fn set_level(&mut self, pin: PinId, level: Level) -> Result<()> {
        self.ensure_owned(pin)?;
        let mut state = self.board.lock();
        Self::check_failure(&mut state)?;

        let entry = state.pins.entry(pin).or_default();
        entry.level = level;
        entry.writes += 1;
        info!(pin = %pin, level = %level, "[sim] set level");
        Ok(())
    }

    fn start_pwm(&mut self, pin: PinId, frequency_hz: f64, duty: DutyCycle) -> Result<()> {
        self.ensure_owned(pin)?;
        let mut state = self.board.lock();
        Self::check_failure(&mut state)?;

        state.pins.entry(pin).or_default().pwm = Some(PwmState { frequency_hz, duty });
        info!(pin = %pin, frequency_hz, duty = %duty, "[sim] started PWM");
        Ok(())
    }

    fn set_duty_cycle(&mut self, pin: PinId, duty: DutyCycle) -> Result<()> {
        self.ensure_owned(pin)?;
        let mut state = self.board.lock();
        Self::check_failure(&mut state)?;

        match state.pins.get_mut(&pin).and_then(|entry| entry.pwm.as_mut()) {
            Some(pwm) => {
                pwm.duty = duty;
                info!(pin = %pin, duty = %duty, "[sim] set duty cycle");
                Ok(())
            }
            None => Err(PinError::PwmNotStarted(pin)),
        }
    }

    fn stop_pwm(&mut self, pin: PinId) -> Result<()> {
        self.ensure_owned(pin)?;
        let mut state = self.board.lock();
        Self::check_failure(&mut state)?;

        if let Some(entry) = state.pins.get_mut(&pin) {
            if entry.pwm.take().is_some() {
                info!(pin = %pin, "[sim] stopped PWM");
            }
        }
        Ok(())
    }

    fn release_all(&mut self) -> Result<()> {
        let mut state = self.board.lock();
        Self::check_failure(&mut state)?;

        // A pin taken over by another driver stays with that driver
        for pin in &self.owned {
            if state.owners.get(pin) != Some(&self.id) {
                continue;
            }
            state.owners.remove(pin);
            if let Some(entry) = state.pins.get_mut(pin) {
                entry.claimed = false;
                entry.pwm = None;
            }
        }
        drop(state);

        info!(pins = self.owned.len(), "[sim] released pins");
        self.owned.clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
