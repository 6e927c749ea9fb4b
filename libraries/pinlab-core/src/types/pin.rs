//! Pin identity, logic level and duty cycle

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;

use crate::error::{PinError, Result};

/// A GPIO line, addressed by its BCM number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinId(u8);

impl PinId {
    /// Create a pin identifier from a BCM GPIO number
    pub const fn new(bcm: u8) -> Self {
        Self(bcm)
    }

    /// BCM GPIO number
    pub const fn number(self) -> u8 {
        self.0
    }
}

impl From<u8> for PinId {
    fn from(bcm: u8) -> Self {
        Self(bcm)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO {}", self.0)
    }
}

/// Binary output level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Driven low (LED off). The safe state.
    #[default]
    Low,
    /// Driven high (LED on)
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Level::High
    }

    pub fn is_low(self) -> bool {
        self == Level::Low
    }
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Self::Output {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => f.write_str("LOW"),
            Level::High => f.write_str("HIGH"),
        }
    }
}

/// PWM duty cycle as a percentage (0-100)
///
/// The value is kept exactly as given; a slider at 37.5 produces a duty
/// cycle of exactly 37.5 %.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DutyCycle(f64);

impl DutyCycle {
    /// 0 % (LED off)
    pub const OFF: Self = Self(0.0);

    /// 100 % (LED fully on)
    pub const FULL: Self = Self(100.0);

    /// Create a duty cycle from a percentage
    ///
    /// # Errors
    /// Returns `InvalidDutyCycle` for NaN, infinities and values outside 0-100.
    pub fn new(percent: f64) -> Result<Self> {
        if percent.is_finite() && (0.0..=100.0).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(PinError::InvalidDutyCycle(percent))
        }
    }

    /// Percentage (0-100)
    pub fn percent(self) -> f64 {
        self.0
    }

    /// Fraction (0.0-1.0), the form most PWM drivers take
    pub fn as_fraction(self) -> f64 {
        self.0 / 100.0
    }
}

impl TryFrom<f64> for DutyCycle {
    type Error = PinError;

    fn try_from(percent: f64) -> Result<Self> {
        Self::new(percent)
    }
}

impl From<DutyCycle> for f64 {
    fn from(duty: DutyCycle) -> Self {
        duty.0
    }
}

impl fmt::Display for DutyCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
