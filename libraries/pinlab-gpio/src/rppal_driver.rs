// pinlab-gpio/src/rppal_driver.rs
//
// Raspberry Pi pins through rppal (BCM numbering)

use std::collections::BTreeMap;

use pinlab_core::{DutyCycle, Level, PinDriver, PinError, PinId, Result};
use rppal::gpio::{Gpio, OutputPin};
use tracing::{debug, warn};

/// A claimed rppal output and its software PWM frequency, if running
struct ClaimedPin {
    output: OutputPin,
    pwm_frequency_hz: Option<f64>,
}

/// rppal-backed pin driver
///
/// Dropping an `OutputPin` resets the line to the mode it had before it was
/// claimed, so releasing is just dropping the outputs.
pub struct RppalDriver {
    gpio: Gpio,
    pins: BTreeMap<PinId, ClaimedPin>,
}

impl RppalDriver {
    /// Open the GPIO peripheral
    pub fn new() -> Result<Self> {
        let gpio = Gpio::new().map_err(driver_error)?;
        Ok(Self {
            gpio,
            pins: BTreeMap::new(),
        })
    }

    fn claimed(&mut self, pin: PinId) -> Result<&mut ClaimedPin> {
        self.pins.get_mut(&pin).ok_or(PinError::NotClaimed(pin))
    }
}

impl PinDriver for RppalDriver {
    fn claim_output(&mut self, pin: PinId, initial: Level) -> Result<()> {
        if let Some(claimed) = self.pins.get_mut(&pin) {
            warn!(pin = %pin, "Pin is already in use, continuing anyway");
            if claimed.pwm_frequency_hz.take().is_some() {
                claimed.output.clear_pwm().map_err(driver_error)?;
            }
            claimed.output.write(to_rppal(initial));
            return Ok(());
        }

        let raw = self.gpio.get(pin.number()).map_err(driver_error)?;
        let mut output = match initial {
            Level::Low => raw.into_output_low(),
            Level::High => raw.into_output_high(),
        };
        output.set_reset_on_drop(true);

        self.pins.insert(
            pin,
            ClaimedPin {
                output,
                pwm_frequency_hz: None,
            },
        );
        debug!(pin = %pin, level = %initial, "rppal: claimed output");
        Ok(())
    }

    fn set_level(&mut self, pin: PinId, level: Level) -> Result<()> {
        self.claimed(pin)?.output.write(to_rppal(level));
        Ok(())
    }

    fn start_pwm(&mut self, pin: PinId, frequency_hz: f64, duty: DutyCycle) -> Result<()> {
        let claimed = self.claimed(pin)?;
        claimed
            .output
            .set_pwm_frequency(frequency_hz, duty.as_fraction())
            .map_err(driver_error)?;
        claimed.pwm_frequency_hz = Some(frequency_hz);
        Ok(())
    }

    fn set_duty_cycle(&mut self, pin: PinId, duty: DutyCycle) -> Result<()> {
        let claimed = self.claimed(pin)?;
        let frequency_hz = claimed
            .pwm_frequency_hz
            .ok_or(PinError::PwmNotStarted(pin))?;
        claimed
            .output
            .set_pwm_frequency(frequency_hz, duty.as_fraction())
            .map_err(driver_error)
    }

    fn stop_pwm(&mut self, pin: PinId) -> Result<()> {
        let claimed = self.claimed(pin)?;
        if claimed.pwm_frequency_hz.take().is_some() {
            claimed.output.clear_pwm().map_err(driver_error)?;
        }
        Ok(())
    }

    fn release_all(&mut self) -> Result<()> {
        let count = self.pins.len();
        self.pins.clear();
        debug!(pins = count, "rppal: released pins");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "rppal"
    }
}

fn to_rppal(level: Level) -> rppal::gpio::Level {
    match level {
        Level::Low => rppal::gpio::Level::Low,
        Level::High => rppal::gpio::Level::High,
    }
}

fn driver_error(err: rppal::gpio::Error) -> PinError {
    PinError::driver(err.to_string())
}
