//! Audio capture errors
use std::time::Duration;
use thiserror::Error;

/// Result type for capture operations
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Capture errors
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No default input device
    #[error("No input device found")]
    DeviceNotFound,

    /// A named input device is not present
    #[error("Input device not found: {0}")]
    DeviceUnavailable(String),

    /// Device enumeration or query failed
    #[error("Device error: {0}")]
    Device(String),

    /// Failed to build input stream
    #[error("Failed to build input stream: {0}")]
    StreamBuild(String),

    /// Failed to start input stream
    #[error("Failed to start input stream: {0}")]
    Play(String),

    /// Device reported no usable configuration
    #[error("Input configuration error: {0}")]
    Config(String),

    /// Sample format not handled by the capture thread
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// No phrase started within the listen timeout
    #[error("Listening timed out while waiting for phrase to start after {0:?}")]
    ListenTimeout(Duration),

    /// The caller stopped listening
    #[error("Listening cancelled")]
    Cancelled,

    /// Capture thread stopped
    #[error("Capture thread disconnected")]
    Disconnected,
}

impl From<cpal::BuildStreamError> for CaptureError {
    fn from(err: cpal::BuildStreamError) -> Self {
        CaptureError::StreamBuild(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for CaptureError {
    fn from(err: cpal::PlayStreamError) -> Self {
        CaptureError::Play(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for CaptureError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        CaptureError::Config(err.to_string())
    }
}

impl From<cpal::DevicesError> for CaptureError {
    fn from(err: cpal::DevicesError) -> Self {
        CaptureError::Device(err.to_string())
    }
}
