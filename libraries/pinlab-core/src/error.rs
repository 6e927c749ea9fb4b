/// Core error types for Pinlab
use thiserror::Error;

use crate::types::PinId;

/// Result type alias using `PinError`
pub type Result<T> = std::result::Result<T, PinError>;

/// Core error type for Pinlab
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PinError {
    /// The underlying pin driver rejected an operation
    #[error("Pin driver error: {0}")]
    Driver(String),

    /// Operation on a pin this process has not claimed
    #[error("{0} has not been claimed")]
    NotClaimed(PinId),

    /// Duty-cycle operation on a pin that is not running PWM
    #[error("{0} is not running PWM")]
    PwmNotStarted(PinId),

    /// Duty cycle outside 0-100 %
    #[error("Invalid duty cycle: {0}. Must be between 0 and 100")]
    InvalidDutyCycle(f64),

    /// PWM frequency that is zero, negative or not finite
    #[error("Invalid PWM frequency: {0} Hz")]
    InvalidFrequency(f64),

    /// LED label not present in the LED map
    #[error("Unknown LED label: {0}")]
    UnknownLabel(String),

    /// Control index not present in the LED map
    #[error("Unknown control: {0}")]
    UnknownControl(usize),

    /// LED map failed validation
    #[error("Invalid LED map: {0}")]
    InvalidLedMap(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PinError {
    /// Create a driver error
    pub fn driver(msg: impl Into<String>) -> Self {
        Self::Driver(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<config::ConfigError> for PinError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
