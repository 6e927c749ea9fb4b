//! Request and response types for the speech service.

use pinlab_core::SpeechSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, SpeechError};

/// Connection settings for the speech client.
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// Full `speech:recognize` URL
    pub endpoint: String,
    pub api_key: String,
    /// BCP-47 language tag
    pub language: String,
    pub timeout: Duration,
}

impl SpeechConfig {
    /// Create a config with US English and a 30 second timeout.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            language: "en-US".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Build from the `[speech]` section of the lab configuration.
    pub fn from_settings(settings: &SpeechSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(SpeechError::MissingApiKey)?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            api_key: api_key.to_string(),
            language: settings.language.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        })
    }
}

/// `speech:recognize` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizeRequest {
    pub config: RecognitionConfig,
    pub audio: RecognitionAudio,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    /// Always `LINEAR16`: mono 16-bit little-endian PCM
    pub encoding: String,
    pub sample_rate_hertz: u32,
    pub language_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionAudio {
    /// Base64-encoded audio bytes
    pub content: String,
}

/// `speech:recognize` response body.
///
/// The service omits `results` entirely when it heard nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognizeResponse {
    #[serde(default)]
    pub results: Vec<SpeechResult>,
}

impl RecognizeResponse {
    /// Top alternative of every result, joined with spaces.
    ///
    /// Returns `None` when no result carries a non-blank transcript.
    pub fn transcript(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .results
            .iter()
            .filter_map(|result| result.alternatives.first())
            .map(|alternative| alternative.transcript.trim())
            .filter(|text| !text.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechResult {
    #[serde(default)]
    pub alternatives: Vec<SpeechAlternative>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechAlternative {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_response_has_no_transcript() {
        let response: RecognizeResponse = serde_json::from_str("{}").unwrap();
        assert!(response.transcript().is_none());

        let response: RecognizeResponse =
            serde_json::from_str(r#"{"totalBilledTime": "1s"}"#).unwrap();
        assert!(response.transcript().is_none());
    }

    #[test]
    fn test_transcript_uses_top_alternative() {
        let json = r#"{
            "results": [{
                "alternatives": [
                    {"transcript": "turn on the light", "confidence": 0.92},
                    {"transcript": "turn of the light"}
                ]
            }]
        }"#;
        let response: RecognizeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.transcript().as_deref(), Some("turn on the light"));
    }

    #[test]
    fn test_transcript_joins_results() {
        let json = r#"{
            "results": [
                {"alternatives": [{"transcript": "please "}]},
                {"alternatives": []},
                {"alternatives": [{"transcript": " turn off"}]}
            ]
        }"#;
        let response: RecognizeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.transcript().as_deref(), Some("please turn off"));
    }

    #[test]
    fn test_request_uses_camel_case() {
        let request = RecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16".to_string(),
                sample_rate_hertz: 16_000,
                language_code: "en-US".to_string(),
            },
            audio: RecognitionAudio {
                content: "AAA=".to_string(),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["config"]["sampleRateHertz"], 16_000);
        assert_eq!(json["config"]["languageCode"], "en-US");
        assert_eq!(json["audio"]["content"], "AAA=");
    }

    #[test]
    fn test_config_from_settings_requires_key() {
        let settings = SpeechSettings::default();
        assert!(matches!(
            SpeechConfig::from_settings(&settings),
            Err(SpeechError::MissingApiKey)
        ));

        let settings = SpeechSettings {
            api_key: Some("secret".to_string()),
            timeout_secs: 5,
            ..SpeechSettings::default()
        };
        let config = SpeechConfig::from_settings(&settings).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
