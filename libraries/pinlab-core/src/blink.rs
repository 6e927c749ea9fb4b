//! Single-LED blinker
//!
//! Holds the pin and its current level; the caller owns the clock and calls
//! [`Blinker::toggle`] once per half-period.

use std::time::Duration;
use tracing::debug;

use crate::error::{PinError, Result};
use crate::session::PinSession;
use crate::traits::PinDriver;
use crate::types::{Level, PinId};

/// Time the LED stays in each state
pub const DEFAULT_HALF_PERIOD: Duration = Duration::from_millis(250);

pub struct Blinker<D: PinDriver> {
    session: PinSession<D>,
    pin: PinId,
    half_period: Duration,
    level: Level,
    toggles: u64,
}

impl<D: PinDriver> Blinker<D> {
    /// Claim `pin` low
    pub fn new(driver: D, pin: PinId, half_period: Duration) -> Result<Self> {
        if half_period.is_zero() {
            return Err(PinError::config("blink half-period must be greater than zero"));
        }

        let mut session = PinSession::new(driver);
        session.claim_output(pin, Level::Low)?;

        Ok(Self {
            session,
            pin,
            half_period,
            level: Level::Low,
            toggles: 0,
        })
    }

    /// Flip the LED; the first call turns it on
    pub fn toggle(&mut self) -> Result<Level> {
        let next = !self.level;
        self.session.set_level(self.pin, next)?;
        self.level = next;
        self.toggles += 1;
        debug!(pin = %self.pin, level = %next, "Blink");
        Ok(next)
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn pin(&self) -> PinId {
        self.pin
    }

    pub fn half_period(&self) -> Duration {
        self.half_period
    }

    /// Number of toggles so far; two toggles make one on/off cycle
    pub fn toggles(&self) -> u64 {
        self.toggles
    }

    pub fn completed_cycles(&self) -> u64 {
        self.toggles / 2
    }

    /// Turn the LED off and release the pin
    pub fn release(self) -> Result<()> {
        self.session.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedBoard;

    const LED: PinId = PinId::new(4);

    #[test]
    fn test_toggle_alternates() {
        let board = SimulatedBoard::new();
        let mut blinker = Blinker::new(board.driver(), LED, DEFAULT_HALF_PERIOD).unwrap();

        assert_eq!(blinker.toggle().unwrap(), Level::High);
        assert_eq!(board.level(LED), Some(Level::High));
        assert_eq!(blinker.toggle().unwrap(), Level::Low);
        assert_eq!(blinker.toggle().unwrap(), Level::High);

        assert_eq!(blinker.toggles(), 3);
        assert_eq!(blinker.completed_cycles(), 1);
    }

    #[test]
    fn test_zero_half_period_rejected() {
        let board = SimulatedBoard::new();
        let result = Blinker::new(board.driver(), LED, Duration::ZERO);
        assert!(matches!(result, Err(PinError::Config(_))));
        assert!(board.claimed_pins().is_empty());
    }

    #[test]
    fn test_release_mid_blink_leaves_led_off() {
        let board = SimulatedBoard::new();
        let mut blinker = Blinker::new(board.driver(), LED, DEFAULT_HALF_PERIOD).unwrap();
        blinker.toggle().unwrap();

        blinker.release().unwrap();

        assert_eq!(board.level(LED), Some(Level::Low));
        assert!(!board.is_claimed(LED));
    }
}
