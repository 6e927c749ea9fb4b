//! Cloud speech-to-text client.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pinlab_core::AudioClip;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, SpeechError};
use crate::recognizer::SpeechRecognizer;
use crate::types::{
    ApiErrorResponse, RecognitionAudio, RecognitionConfig, RecognizeRequest, RecognizeResponse,
    SpeechConfig,
};

/// Keeps the key out of the request URL, which transport errors echo
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for a Google-compatible `speech:recognize` endpoint.
///
/// Audio is sent as mono LINEAR16 at the clip's own sample rate.
pub struct CloudSpeechClient {
    http: Client,
    config: SpeechConfig,
}

impl CloudSpeechClient {
    /// Create a new client with the given configuration.
    pub fn new(config: SpeechConfig) -> Result<Self> {
        let endpoint = config.endpoint.trim().to_string();
        if endpoint.is_empty() {
            return Err(SpeechError::InvalidEndpoint(
                "endpoint cannot be empty".into(),
            ));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(SpeechError::InvalidEndpoint(
                "endpoint must start with http:// or https://".into(),
            ));
        }
        if config.api_key.trim().is_empty() {
            return Err(SpeechError::MissingApiKey);
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Pinlab/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config: SpeechConfig { endpoint, ..config },
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn language(&self) -> &str {
        &self.config.language
    }

    fn build_request(&self, clip: &AudioClip) -> RecognizeRequest {
        RecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16".to_string(),
                sample_rate_hertz: clip.sample_rate,
                language_code: self.config.language.clone(),
            },
            audio: RecognitionAudio {
                content: STANDARD.encode(clip.to_le_bytes()),
            },
        }
    }
}

#[async_trait]
impl SpeechRecognizer for CloudSpeechClient {
    async fn recognize(&self, clip: &AudioClip) -> Result<String> {
        if clip.is_empty() {
            debug!("Empty clip, skipping request");
            return Err(SpeechError::Unintelligible);
        }

        let request = self.build_request(clip);
        debug!(
            endpoint = %self.config.endpoint,
            duration_ms = clip.duration().as_millis() as u64,
            sample_rate = clip.sample_rate,
            "Sending recognize request"
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let body: RecognizeResponse = response.json().await.map_err(|e| {
                SpeechError::ParseError(format!("Failed to parse recognize response: {}", e))
            })?;

            match body.transcript() {
                Some(text) => {
                    info!(transcript = %text, "Speech recognized");
                    Ok(text)
                }
                None => Err(SpeechError::Unintelligible),
            }
        } else {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);

            warn!(status = %status, message = %message, "Speech service returned an error");
            Err(SpeechError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
