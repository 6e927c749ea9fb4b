//! Error types for the speech client.

use pinlab_core::Transcription;
use thiserror::Error;

/// Errors that can occur when transcribing audio.
#[derive(Error, Debug)]
pub enum SpeechError {
    /// The service answered but found no words in the audio
    #[error("Speech was unintelligible")]
    Unintelligible,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service returned an error response
    #[error("Speech service error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to parse service response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid service endpoint
    #[error("Invalid speech endpoint: {0}")]
    InvalidEndpoint(String),

    /// No API key configured
    #[error("Speech API key is missing")]
    MissingApiKey,
}

/// Result type for speech operations.
pub type Result<T> = std::result::Result<T, SpeechError>;

impl From<SpeechError> for Transcription {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::Unintelligible => Transcription::Unintelligible,
            other => Transcription::RequestFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unintelligible_maps_to_transcription() {
        assert_eq!(
            Transcription::from(SpeechError::Unintelligible),
            Transcription::Unintelligible
        );
    }

    #[test]
    fn test_api_error_keeps_message() {
        let err = SpeechError::Api {
            status: 403,
            message: "API key not valid".to_string(),
        };
        match Transcription::from(err) {
            Transcription::RequestFailed(msg) => {
                assert!(msg.contains("403"));
                assert!(msg.contains("API key not valid"));
            }
            other => panic!("Expected RequestFailed, got {:?}", other),
        }
    }
}
