//! Pinlab Core
//!
//! Platform-agnostic pin types, the pin-driver seam, and the logic behind each
//! GPIO exercise (blink, LED selector, PWM dimmer, voice-controlled light).
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `PinId`, `Level`, `DutyCycle`, `LedMap`, `AudioClip`
//! - **Core Traits**: `PinDriver` (hardware seam), `PhraseSource` (voice input)
//! - **Scoped Ownership**: `PinSession` claims pins and releases them on drop
//! - **Exercises**: `Blinker`, `LedSelector`, `Dimmer`, `LightSwitch`
//! - **Error Handling**: Unified `PinError` and `Result` types
//!
//! Nothing here touches real hardware. The rppal backend lives in
//! `pinlab-gpio`; tests and `--simulate` runs use [`SimulatedBoard`].
//!
//! # Example
//!
//! ```rust
//! use pinlab_core::{LedMap, LedSelector, Level, SimulatedBoard};
//!
//! let board = SimulatedBoard::new();
//! let mut selector = LedSelector::new(board.driver(), LedMap::default()).unwrap();
//!
//! selector.select("Green").unwrap();
//! assert_eq!(selector.level("Green"), Some(Level::High));
//! assert_eq!(selector.level("Red"), Some(Level::Low));
//! ```

#![forbid(unsafe_code)]

pub mod blink;
pub mod config;
pub mod dimmer;
pub mod error;
pub mod selector;
pub mod session;
pub mod simulated;
pub mod traits;
pub mod types;
pub mod voice;

// Re-export commonly used types
pub use blink::{Blinker, DEFAULT_HALF_PERIOD};
pub use crate::config::{DriverBackend, LabConfig, ListenerSettings, SpeechSettings};
pub use dimmer::{Dimmer, DEFAULT_PWM_FREQUENCY_HZ};
pub use error::{PinError, Result};
pub use selector::LedSelector;
pub use session::{PinMode, PinSession};
pub use simulated::{PinState, PwmState, SimulatedBoard, SimulatedDriver};
pub use traits::{PhraseSource, PinDriver};
pub use types::{AudioClip, DutyCycle, LedBinding, LedMap, Level, PinId};
pub use voice::{CommandOutcome, LightSwitch, Transcription, VoiceCommand};
