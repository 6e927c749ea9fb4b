//! Microphone input for Pinlab voice commands
//!
//! Captures a single spoken phrase from the default (or a named) input
//! device, the way the voice exercise needs it: calibrate against background
//! noise, wait for speech, stop after a pause.
//!
//! # Components
//!
//! - [`EnergyThreshold`]: speech/silence threshold on RMS energy, adaptive
//! - [`PhraseDetector`]: pure state machine turning sample chunks into phrases
//! - [`Microphone`]: cpal input stream on a dedicated capture thread
//!
//! The detector has no I/O, so it is tested with synthetic chunks.
//!
//! # Example
//!
//! ```no_run
//! use pinlab_audio::{Microphone, PhraseDetector};
//! use pinlab_core::ListenerSettings;
//! use std::sync::atomic::AtomicBool;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mic = Microphone::open(None)?;
//! let mut detector = PhraseDetector::new(&ListenerSettings::default(), mic.sample_rate());
//!
//! let cancel = AtomicBool::new(false);
//!
//! mic.adjust_for_ambient_noise(&mut detector, Duration::from_secs(1), &cancel)?;
//! let clip = mic.listen(&mut detector, None, &cancel)?;
//! println!("Captured {:?} of audio", clip.duration());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod energy;
mod error;
mod microphone;
mod phrase;

pub use energy::{rms, EnergyThreshold};
pub use error::{CaptureError, Result};
pub use microphone::Microphone;
pub use phrase::PhraseDetector;
