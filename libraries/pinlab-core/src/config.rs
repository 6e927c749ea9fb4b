/// Lab configuration
///
/// Every field has a default, so a bare board runs without any file. Values
/// come from `pinlab.toml` (or an explicit path) and are then overridden by
/// `PINLAB_`-prefixed environment variables, e.g.
/// `PINLAB_SPEECH__API_KEY=...` or `PINLAB_GPIO__BACKEND=simulated`.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PinError, Result};
use crate::types::{LedMap, PinId};

/// File picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "pinlab.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LabConfig {
    #[serde(default)]
    pub gpio: GpioSettings,

    /// Label-to-pin wiring shared by the selector and the dimmer
    #[serde(default)]
    pub leds: LedMap,

    #[serde(default)]
    pub blink: BlinkSettings,

    #[serde(default)]
    pub dimmer: DimmerSettings,

    #[serde(default)]
    pub voice: VoiceSettings,

    #[serde(default)]
    pub speech: SpeechSettings,

    #[serde(default)]
    pub audio: ListenerSettings,
}

/// Which pin driver the binaries open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverBackend {
    /// Raspberry Pi GPIO through rppal
    #[default]
    Rppal,
    /// In-memory board that logs every pin change
    Simulated,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GpioSettings {
    #[serde(default)]
    pub backend: DriverBackend,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlinkSettings {
    #[serde(default = "default_blink_pin")]
    pub pin: PinId,

    #[serde(default = "default_half_period_ms")]
    pub half_period_ms: u64,
}

impl BlinkSettings {
    pub fn half_period(&self) -> Duration {
        Duration::from_millis(self.half_period_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DimmerSettings {
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VoiceSettings {
    #[serde(default = "default_voice_pin")]
    pub pin: PinId,

    /// Pause after each handled phrase before listening again
    #[serde(default = "default_pause_after_command_ms")]
    pub pause_after_command_ms: u64,

    /// How long to sample background noise before each phrase
    #[serde(default = "default_ambient_calibration_ms")]
    pub ambient_calibration_ms: u64,

    /// Input device name; the system default when unset
    #[serde(default)]
    pub input_device: Option<String>,
}

impl VoiceSettings {
    pub fn pause_after_command(&self) -> Duration {
        Duration::from_millis(self.pause_after_command_ms)
    }

    pub fn ambient_calibration(&self) -> Duration {
        Duration::from_millis(self.ambient_calibration_ms)
    }
}

/// Cloud speech-to-text settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpeechSettings {
    #[serde(default = "default_speech_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SpeechSettings {
    /// The API key, or a configuration error naming the variable to set
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                PinError::config("speech API key is required (set PINLAB_SPEECH__API_KEY)")
            })
    }
}

/// Microphone phrase detection tunables
///
/// Energies are RMS values of 16-bit samples.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenerSettings {
    /// Starting speech/silence threshold
    #[serde(default = "default_energy_threshold")]
    pub energy_threshold: f64,

    /// Keep adapting the threshold while waiting for speech
    #[serde(default = "default_true")]
    pub dynamic_energy_threshold: bool,

    /// Fraction of the old threshold kept per second of adaptation
    #[serde(default = "default_dynamic_energy_damping")]
    pub dynamic_energy_damping: f64,

    /// Target threshold as a multiple of ambient energy
    #[serde(default = "default_dynamic_energy_ratio")]
    pub dynamic_energy_ratio: f64,

    /// Silence that ends a phrase
    #[serde(default = "default_pause_threshold_ms")]
    pub pause_threshold_ms: u64,

    /// Minimum speech for a phrase to count
    #[serde(default = "default_phrase_threshold_ms")]
    pub phrase_threshold_ms: u64,

    /// Silence kept on both sides of a phrase
    #[serde(default = "default_non_speaking_duration_ms")]
    pub non_speaking_duration_ms: u64,

    /// Cut phrases off after this long
    #[serde(default)]
    pub phrase_time_limit_ms: Option<u64>,

    /// Give up waiting for a phrase to start after this long
    #[serde(default)]
    pub listen_timeout_ms: Option<u64>,
}

impl LabConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; without one, `pinlab.toml` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(PinError::config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with PINLAB_)
        settings = settings.add_source(
            config::Environment::with_prefix("PINLAB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.blink.half_period_ms == 0 {
            return Err(PinError::config("blink.half_period_ms must be greater than zero"));
        }

        if !self.dimmer.frequency_hz.is_finite() || self.dimmer.frequency_hz <= 0.0 {
            return Err(PinError::InvalidFrequency(self.dimmer.frequency_hz));
        }

        let audio = &self.audio;
        if !(audio.dynamic_energy_damping > 0.0 && audio.dynamic_energy_damping < 1.0) {
            return Err(PinError::config(
                "audio.dynamic_energy_damping must be between 0 and 1",
            ));
        }
        if audio.dynamic_energy_ratio < 1.0 {
            return Err(PinError::config("audio.dynamic_energy_ratio must be at least 1"));
        }
        if audio.energy_threshold < 0.0 {
            return Err(PinError::config("audio.energy_threshold cannot be negative"));
        }
        if audio.non_speaking_duration_ms > audio.pause_threshold_ms {
            return Err(PinError::config(
                "audio.non_speaking_duration_ms cannot exceed audio.pause_threshold_ms",
            ));
        }

        if !self.speech.endpoint.starts_with("http://")
            && !self.speech.endpoint.starts_with("https://")
        {
            return Err(PinError::config(
                "speech.endpoint must start with http:// or https://",
            ));
        }
        if self.speech.timeout_secs == 0 {
            return Err(PinError::config("speech.timeout_secs must be greater than zero"));
        }

        Ok(())
    }
}

// Default values
fn default_blink_pin() -> PinId {
    // Physical header pin 7
    PinId::new(4)
}

fn default_half_period_ms() -> u64 {
    250
}

fn default_frequency_hz() -> f64 {
    crate::dimmer::DEFAULT_PWM_FREQUENCY_HZ
}

fn default_voice_pin() -> PinId {
    PinId::new(17)
}

fn default_pause_after_command_ms() -> u64 {
    1000
}

fn default_ambient_calibration_ms() -> u64 {
    1000
}

fn default_speech_endpoint() -> String {
    "https://speech.googleapis.com/v1/speech:recognize".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_energy_threshold() -> f64 {
    300.0
}

fn default_true() -> bool {
    true
}

fn default_dynamic_energy_damping() -> f64 {
    0.15
}

fn default_dynamic_energy_ratio() -> f64 {
    1.5
}

fn default_pause_threshold_ms() -> u64 {
    800
}

fn default_phrase_threshold_ms() -> u64 {
    300
}

fn default_non_speaking_duration_ms() -> u64 {
    500
}

impl Default for BlinkSettings {
    fn default() -> Self {
        Self {
            pin: default_blink_pin(),
            half_period_ms: default_half_period_ms(),
        }
    }
}

impl Default for DimmerSettings {
    fn default() -> Self {
        Self {
            frequency_hz: default_frequency_hz(),
        }
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            pin: default_voice_pin(),
            pause_after_command_ms: default_pause_after_command_ms(),
            ambient_calibration_ms: default_ambient_calibration_ms(),
            input_device: None,
        }
    }
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            endpoint: default_speech_endpoint(),
            api_key: None,
            language: default_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self {
            energy_threshold: default_energy_threshold(),
            dynamic_energy_threshold: default_true(),
            dynamic_energy_damping: default_dynamic_energy_damping(),
            dynamic_energy_ratio: default_dynamic_energy_ratio(),
            pause_threshold_ms: default_pause_threshold_ms(),
            phrase_threshold_ms: default_phrase_threshold_ms(),
            non_speaking_duration_ms: default_non_speaking_duration_ms(),
            phrase_time_limit_ms: None,
            listen_timeout_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_lab_wiring() {
        let config = LabConfig::default();
        assert_eq!(config.gpio.backend, DriverBackend::Rppal);
        assert_eq!(config.blink.pin, PinId::new(4));
        assert_eq!(config.blink.half_period(), Duration::from_millis(250));
        assert_eq!(config.dimmer.frequency_hz, 1000.0);
        assert_eq!(config.voice.pin, PinId::new(17));
        assert_eq!(config.speech.language, "en-US");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_api_key_is_reported() {
        let settings = SpeechSettings::default();
        match settings.require_api_key() {
            Err(PinError::Config(msg)) => assert!(msg.contains("PINLAB_SPEECH__API_KEY")),
            other => panic!("Expected Config error, got {:?}", other),
        }

        let blank = SpeechSettings {
            api_key: Some("   ".into()),
            ..SpeechSettings::default()
        };
        assert!(blank.require_api_key().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = LabConfig::default();
        config.dimmer.frequency_hz = 0.0;
        assert_eq!(config.validate(), Err(PinError::InvalidFrequency(0.0)));

        let mut config = LabConfig::default();
        config.blink.half_period_ms = 0;
        assert!(config.validate().is_err());

        let mut config = LabConfig::default();
        config.audio.non_speaking_duration_ms = 900;
        assert!(config.validate().is_err());

        let mut config = LabConfig::default();
        config.speech.endpoint = "speech.example.com".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_speech_timeout_rejected() {
        let mut config = LabConfig::default();
        config.speech.timeout_secs = 0;
        match config.validate() {
            Err(PinError::Config(msg)) => assert!(msg.contains("speech.timeout_secs")),
            other => panic!("Expected Config error, got {:?}", other),
        }

        config.speech.timeout_secs = 1;
        assert!(config.validate().is_ok());
    }
}
