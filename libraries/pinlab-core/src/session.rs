//! Scoped pin ownership
//!
//! A `PinSession` is the explicit handle for every pin an exercise uses.
//! Pins are claimed through it and released when it is dropped, so cleanup
//! runs on every exit path that unwinds: normal return, `?` propagation,
//! panics, and GUI state being torn down on window close.
//!
//! Release puts each pin in its safe state first (PWM stopped, level low)
//! and then hands everything back to the driver.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::error::{PinError, Result};
use crate::traits::PinDriver;
use crate::types::{DutyCycle, Level, PinId};

/// What a claimed pin is currently doing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinMode {
    /// Plain output at a fixed level
    Digital(Level),
    /// Software/hardware PWM
    Pwm { frequency_hz: f64, duty: DutyCycle },
}

/// Owner of every pin claimed by one exercise
pub struct PinSession<D: PinDriver> {
    driver: D,
    pins: BTreeMap<PinId, PinMode>,
    released: bool,
}

impl<D: PinDriver> PinSession<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            pins: BTreeMap::new(),
            released: false,
        }
    }

    /// Claim a pin as output at `initial`
    pub fn claim_output(&mut self, pin: PinId, initial: Level) -> Result<()> {
        self.driver.claim_output(pin, initial)?;
        self.pins.insert(pin, PinMode::Digital(initial));
        self.released = false;
        debug!(pin = %pin, level = %initial, "Claimed output pin");
        Ok(())
    }

    /// Claim several pins, all low
    pub fn claim_all(&mut self, pins: impl IntoIterator<Item = PinId>) -> Result<()> {
        for pin in pins {
            self.claim_output(pin, Level::Low)?;
        }
        Ok(())
    }

    /// Drive a claimed pin to `level`, stopping PWM first if it is running
    pub fn set_level(&mut self, pin: PinId, level: Level) -> Result<()> {
        let mode = self.mode(pin).ok_or(PinError::NotClaimed(pin))?;
        if let PinMode::Pwm { .. } = mode {
            self.driver.stop_pwm(pin)?;
        }
        self.driver.set_level(pin, level)?;
        self.pins.insert(pin, PinMode::Digital(level));
        Ok(())
    }

    /// Switch a claimed pin to PWM
    pub fn start_pwm(&mut self, pin: PinId, frequency_hz: f64, duty: DutyCycle) -> Result<()> {
        if !self.pins.contains_key(&pin) {
            return Err(PinError::NotClaimed(pin));
        }
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(PinError::InvalidFrequency(frequency_hz));
        }
        self.driver.start_pwm(pin, frequency_hz, duty)?;
        self.pins.insert(pin, PinMode::Pwm { frequency_hz, duty });
        debug!(pin = %pin, frequency_hz, duty = %duty, "Started PWM");
        Ok(())
    }

    /// Change the duty cycle of a pin running PWM
    pub fn set_duty_cycle(&mut self, pin: PinId, duty: DutyCycle) -> Result<()> {
        match self.mode(pin) {
            None => Err(PinError::NotClaimed(pin)),
            Some(PinMode::Digital(_)) => Err(PinError::PwmNotStarted(pin)),
            Some(PinMode::Pwm { frequency_hz, .. }) => {
                self.driver.set_duty_cycle(pin, duty)?;
                self.pins.insert(pin, PinMode::Pwm { frequency_hz, duty });
                Ok(())
            }
        }
    }

    pub fn mode(&self, pin: PinId) -> Option<PinMode> {
        self.pins.get(&pin).copied()
    }

    /// Current level of a digital pin; `None` for unclaimed or PWM pins
    pub fn level(&self, pin: PinId) -> Option<Level> {
        match self.mode(pin)? {
            PinMode::Digital(level) => Some(level),
            PinMode::Pwm { .. } => None,
        }
    }

    /// Current duty cycle of a PWM pin
    pub fn duty_cycle(&self, pin: PinId) -> Option<DutyCycle> {
        match self.mode(pin)? {
            PinMode::Pwm { duty, .. } => Some(duty),
            PinMode::Digital(_) => None,
        }
    }

    pub fn claimed_pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.pins.keys().copied()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Release every claimed pin now, reporting the first failure
    ///
    /// Dropping the session does the same thing but can only log failures.
    pub fn release(mut self) -> Result<()> {
        self.release_pins()
    }

    fn release_pins(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        let mut first_error: Option<PinError> = None;

        for (pin, mode) in &self.pins {
            if let PinMode::Pwm { .. } = mode {
                if let Err(e) = self.driver.stop_pwm(*pin) {
                    warn!(pin = %pin, error = %e, "Failed to stop PWM during cleanup");
                    first_error.get_or_insert(e);
                }
            }
            if let Err(e) = self.driver.set_level(*pin, Level::Low) {
                warn!(pin = %pin, error = %e, "Failed to drive pin low during cleanup");
                first_error.get_or_insert(e);
            }
        }

        if let Err(e) = self.driver.release_all() {
            warn!(error = %e, "Failed to release pins");
            first_error.get_or_insert(e);
        }

        info!(
            driver = self.driver.name(),
            pins = self.pins.len(),
            "Released GPIO pins"
        );
        self.pins.clear();

        first_error.map_or(Ok(()), Err)
    }
}

impl<D: PinDriver> Drop for PinSession<D> {
    fn drop(&mut self) {
        if let Err(e) = self.release_pins() {
            warn!(error = %e, "GPIO cleanup finished with errors");
        }
    }
}
