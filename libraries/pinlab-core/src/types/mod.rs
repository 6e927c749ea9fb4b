/// Core domain types for Pinlab
pub mod audio;
pub mod led_map;
pub mod pin;

pub use audio::AudioClip;
pub use led_map::{LedBinding, LedMap};
pub use pin::{DutyCycle, Level, PinId};
