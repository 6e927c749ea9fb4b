/// Core traits for Pinlab
use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DutyCycle, Level, PinId};
use crate::voice::Transcription;

/// Pin driver trait
///
/// The capability set every exercise needs from the board. Calls are
/// synchronous and fire-and-forget: nothing waits on hardware feedback.
///
/// # Implementations
/// - **Production:** `RppalDriver` in `pinlab-gpio` (Raspberry Pi)
/// - **Testing:** [`SimulatedDriver`](crate::SimulatedDriver) (in-memory board)
pub trait PinDriver: Send {
    /// Claim a pin in output mode and drive it to `initial`
    ///
    /// Claiming a pin that is already claimed is not guarded against; the
    /// outcome is whatever the driver does.
    fn claim_output(&mut self, pin: PinId, initial: Level) -> Result<()>;

    /// Drive a claimed pin to a logic level
    fn set_level(&mut self, pin: PinId, level: Level) -> Result<()>;

    /// Start PWM on a claimed pin
    fn start_pwm(&mut self, pin: PinId, frequency_hz: f64, duty: DutyCycle) -> Result<()>;

    /// Change the duty cycle of a pin already running PWM
    fn set_duty_cycle(&mut self, pin: PinId, duty: DutyCycle) -> Result<()>;

    /// Stop PWM on a pin; a no-op when PWM is not running
    fn stop_pwm(&mut self, pin: PinId) -> Result<()>;

    /// Release every pin this driver claimed back to the operating system
    fn release_all(&mut self) -> Result<()>;

    /// Short backend name for logs
    fn name(&self) -> &'static str {
        "unknown"
    }
}

impl<D: PinDriver + ?Sized> PinDriver for Box<D> {
    fn claim_output(&mut self, pin: PinId, initial: Level) -> Result<()> {
        (**self).claim_output(pin, initial)
    }

    fn set_level(&mut self, pin: PinId, level: Level) -> Result<()> {
        (**self).set_level(pin, level)
    }

    fn start_pwm(&mut self, pin: PinId, frequency_hz: f64, duty: DutyCycle) -> Result<()> {
        (**self).start_pwm(pin, frequency_hz, duty)
    }

    fn set_duty_cycle(&mut self, pin: PinId, duty: DutyCycle) -> Result<()> {
        (**self).set_duty_cycle(pin, duty)
    }

    fn stop_pwm(&mut self, pin: PinId) -> Result<()> {
        (**self).stop_pwm(pin)
    }

    fn release_all(&mut self) -> Result<()> {
        (**self).release_all()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Source of recognized phrases for the voice exercise
///
/// Each call produces one transcription attempt. `None` means the source is
/// exhausted (end of typed input, microphone gone) and the loop should stop.
#[async_trait]
pub trait PhraseSource: Send {
    async fn next_phrase(&mut self) -> Option<Transcription>;
}
