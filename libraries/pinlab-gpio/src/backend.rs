// pinlab-gpio/src/backend.rs
//
// Runtime selection between the real board and the simulated one

use pinlab_core::{DriverBackend, PinDriver, Result, SimulatedBoard};
use tracing::info;

/// Driver chosen at runtime
pub type BoxedDriver = Box<dyn PinDriver>;

/// Human-readable description of a backend
pub fn describe(backend: DriverBackend) -> &'static str {
    match backend {
        DriverBackend::Rppal => "Raspberry Pi GPIO (rppal, BCM numbering)",
        DriverBackend::Simulated => "Simulated board (pin changes are only logged)",
    }
}

/// Open the pin driver for `backend`
///
/// A simulated driver gets a fresh board of its own.
pub fn open_driver(backend: DriverBackend) -> Result<BoxedDriver> {
    let driver: BoxedDriver = match backend {
        DriverBackend::Rppal => open_rppal()?,
        DriverBackend::Simulated => Box::new(SimulatedBoard::new().driver()),
    };

    info!(backend = describe(backend), "Opened pin driver");
    Ok(driver)
}

#[cfg(target_os = "linux")]
fn open_rppal() -> Result<BoxedDriver> {
    Ok(Box::new(crate::rppal_driver::RppalDriver::new()?))
}

#[cfg(not(target_os = "linux"))]
fn open_rppal() -> Result<BoxedDriver> {
    Err(pinlab_core::PinError::driver(
        "the rppal backend is only available on Linux; use --simulate",
    ))
}
