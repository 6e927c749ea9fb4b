//! Configuration loading from TOML files

use pinlab_core::{DriverBackend, LabConfig, PinError, PinId};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_partial_file_keeps_defaults() {
    let file = write_config(
        r#"
[blink]
half_period_ms = 500

[speech]
api_key = "test-key"
"#,
    );

    let config = LabConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.blink.half_period_ms, 500);
    assert_eq!(config.blink.pin, PinId::new(4));
    assert_eq!(config.speech.require_api_key().unwrap(), "test-key");
    assert_eq!(config.leds.len(), 3);
    assert_eq!(config.dimmer.frequency_hz, 1000.0);
}

#[test]
fn test_custom_led_wiring() {
    let file = write_config(
        r#"
[gpio]
backend = "simulated"

[[leds]]
label = "Blue"
pin = 5

[[leds]]
label = "White"
pin = 6
"#,
    );

    let config = LabConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.gpio.backend, DriverBackend::Simulated);
    assert_eq!(config.leds.len(), 2);
    assert_eq!(config.leds.get("White"), Some(PinId::new(6)));
    assert_eq!(config.leds.get("Red"), None);
}

#[test]
fn test_duplicate_pins_rejected_at_load() {
    let file = write_config(
        r#"
[[leds]]
label = "Red"
pin = 17

[[leds]]
label = "Green"
pin = 17
"#,
    );

    let result = LabConfig::load(Some(file.path()));
    assert!(matches!(result, Err(PinError::Config(_))));
}

#[test]
fn test_invalid_values_rejected_at_load() {
    let file = write_config(
        r#"
[dimmer]
frequency_hz = -5.0
"#,
    );

    assert_eq!(
        LabConfig::load(Some(file.path())).unwrap_err(),
        PinError::InvalidFrequency(-5.0)
    );
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    match LabConfig::load(Some(&missing)) {
        Err(PinError::Config(msg)) => assert!(msg.contains("not found")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}
