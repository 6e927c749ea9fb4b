//! Board pin driver for Pinlab
//!
//! This crate provides the rppal-backed [`PinDriver`](pinlab_core::PinDriver)
//! for Raspberry Pi boards and picks a driver at runtime from the configured
//! [`DriverBackend`](pinlab_core::DriverBackend).
//!
//! # Example
//!
//! ```no_run
//! use pinlab_core::{DriverBackend, LightSwitch, PinId};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = pinlab_gpio::open_driver(DriverBackend::Rppal)?;
//! let _light = LightSwitch::new(driver, PinId::new(17))?;
//! // the pin is released when `_light` goes out of scope
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod backend;
#[cfg(target_os = "linux")]
mod rppal_driver;

pub use backend::{describe, open_driver, BoxedDriver};
#[cfg(target_os = "linux")]
pub use rppal_driver::RppalDriver;
