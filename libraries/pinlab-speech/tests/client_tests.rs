//! Tests for the speech client against a mock speech service.

use pinlab_core::{AudioClip, Transcription};
use pinlab_speech::{CloudSpeechClient, SpeechConfig, SpeechError, SpeechRecognizer};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECOGNIZE_PATH: &str = "/v1/speech:recognize";

fn clip() -> AudioClip {
    AudioClip::new(16_000, vec![0, 1_000, -1_000, 0])
}

fn client_for(server: &MockServer) -> CloudSpeechClient {
    let config = SpeechConfig::new(format!("{}{}", server.uri(), RECOGNIZE_PATH), "test-key");
    CloudSpeechClient::new(config).unwrap()
}

// =============================================================================
// Client Creation Tests
// =============================================================================

mod client_creation {
    use super::*;

    #[test]
    fn test_valid_https_endpoint() {
        let config = SpeechConfig::new("https://speech.googleapis.com/v1/speech:recognize", "k");
        assert!(CloudSpeechClient::new(config).is_ok());
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let result = CloudSpeechClient::new(SpeechConfig::new("", "k"));
        match result {
            Err(SpeechError::InvalidEndpoint(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected InvalidEndpoint error"),
        }
    }

    #[test]
    fn test_endpoint_without_scheme_rejected() {
        let result = CloudSpeechClient::new(SpeechConfig::new("speech.example.com", "k"));
        match result {
            Err(SpeechError::InvalidEndpoint(msg)) => assert!(msg.contains("http")),
            _ => panic!("Expected InvalidEndpoint error"),
        }
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let result = CloudSpeechClient::new(SpeechConfig::new("https://example.com", "  "));
        assert!(matches!(result, Err(SpeechError::MissingApiKey)));
    }

    #[test]
    fn test_language_override() {
        let config = SpeechConfig::new("https://example.com", "k").with_language("en-GB");
        let client = CloudSpeechClient::new(config).unwrap();
        assert_eq!(client.language(), "en-GB");
    }
}

// =============================================================================
// Recognition Tests
// =============================================================================

mod recognition {
    use super::*;

    #[tokio::test]
    async fn test_transcript_returned() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(RECOGNIZE_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "alternatives": [{"transcript": "turn on", "confidence": 0.97}]
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let text = client.recognize(&clip()).await.unwrap();
        assert_eq!(text, "turn on");
    }

    #[tokio::test]
    async fn test_request_body_format() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(RECOGNIZE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let _ = client.recognize(&clip()).await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);

        let body: serde_json::Value = requests[0].body_json().unwrap();
        assert_eq!(body["config"]["encoding"], "LINEAR16");
        assert_eq!(body["config"]["sampleRateHertz"], 16_000);
        assert_eq!(body["config"]["languageCode"], "en-US");
        // [0, 1000, -1000, 0] as little-endian bytes
        assert_eq!(body["audio"]["content"], "AADoAxj8AAA=");
    }

    #[tokio::test]
    async fn test_empty_results_are_unintelligible() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(RECOGNIZE_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"totalBilledTime": "1s"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.recognize(&clip()).await;
        assert!(matches!(result, Err(SpeechError::Unintelligible)));

        assert_eq!(client.transcribe(&clip()).await, Transcription::Unintelligible);
    }

    #[tokio::test]
    async fn test_empty_clip_skips_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.recognize(&AudioClip::new(16_000, Vec::new())).await;
        assert!(matches!(result, Err(SpeechError::Unintelligible)));
    }

    #[tokio::test]
    async fn test_api_error_message_extracted() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(RECOGNIZE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        match client.recognize(&clip()).await {
            Err(SpeechError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("API key not valid"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body_kept() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(RECOGNIZE_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        match client.transcribe(&clip()).await {
            Transcription::RequestFailed(msg) => {
                assert!(msg.contains("503"));
                assert!(msg.contains("upstream unavailable"));
            }
            other => panic!("Expected RequestFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(RECOGNIZE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.recognize(&clip()).await;
        assert!(matches!(result, Err(SpeechError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_request_failure() {
        // Nothing listens on port 9 (discard) in the test environment
        let config = SpeechConfig::new("http://127.0.0.1:9/v1/speech:recognize", "test-key");
        let client = CloudSpeechClient::new(config).unwrap();

        let transcription = client.transcribe(&clip()).await;
        assert!(matches!(transcription, Transcription::RequestFailed(_)));
    }

    #[tokio::test]
    async fn test_request_failure_does_not_reveal_api_key() {
        let config = SpeechConfig::new(
            "http://127.0.0.1:9/v1/speech:recognize",
            "SECRET-KEY-123",
        );
        let client = CloudSpeechClient::new(config).unwrap();

        match client.transcribe(&clip()).await {
            Transcription::RequestFailed(message) => {
                assert!(message.contains("127.0.0.1:9"));
                assert!(!message.contains("SECRET-KEY-123"));
            }
            other => panic!("Expected RequestFailed, got {:?}", other),
        }
    }
}
