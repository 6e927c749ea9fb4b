//! PWM brightness control, one slider per LED
//!
//! Every mapped pin runs PWM from the start at 0 %. A slider move sets that
//! LED's duty cycle to exactly the slider value; controls are independent,
//! so the final duty of each LED depends only on its own last move.

use tracing::debug;

use crate::error::{PinError, Result};
use crate::session::PinSession;
use crate::traits::PinDriver;
use crate::types::{DutyCycle, LedMap, Level};

/// PWM frequency used when none is configured
pub const DEFAULT_PWM_FREQUENCY_HZ: f64 = 1000.0;

pub struct Dimmer<D: PinDriver> {
    session: PinSession<D>,
    leds: LedMap,
    frequency_hz: f64,
}

impl<D: PinDriver> Dimmer<D> {
    /// Claim every mapped pin and start PWM at 0 %
    pub fn new(driver: D, leds: LedMap, frequency_hz: f64) -> Result<Self> {
        let mut session = PinSession::new(driver);
        for pin in leds.pins() {
            session.claim_output(pin, Level::Low)?;
            session.start_pwm(pin, frequency_hz, DutyCycle::OFF)?;
        }

        Ok(Self {
            session,
            leds,
            frequency_hz,
        })
    }

    /// Apply a slider value to the LED at `control`
    ///
    /// # Errors
    /// `UnknownControl` for an index outside the map, `InvalidDutyCycle` for
    /// values outside 0-100. Neither changes any pin.
    pub fn set_duty(&mut self, control: usize, percent: f64) -> Result<DutyCycle> {
        let pin = self
            .leds
            .binding(control)
            .map(|binding| binding.pin)
            .ok_or(PinError::UnknownControl(control))?;
        let duty = DutyCycle::new(percent)?;

        self.session.set_duty_cycle(pin, duty)?;
        debug!(control, pin = %pin, duty = %duty, "Slider moved");
        Ok(duty)
    }

    pub fn duty(&self, control: usize) -> Option<DutyCycle> {
        let binding = self.leds.binding(control)?;
        self.session.duty_cycle(binding.pin)
    }

    /// Duty cycles in control order
    pub fn duties(&self) -> Vec<DutyCycle> {
        self.leds
            .iter()
            .map(|binding| self.session.duty_cycle(binding.pin).unwrap_or_default())
            .collect()
    }

    pub fn leds(&self) -> &LedMap {
        &self.leds
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    /// Stop PWM on every LED and release the pins
    pub fn release(self) -> Result<()> {
        self.session.release()
    }
}
