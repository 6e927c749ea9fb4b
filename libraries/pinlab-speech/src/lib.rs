//! Pinlab Speech
//!
//! Turns a captured phrase into text with a cloud speech-to-text service
//! (Google Speech-to-Text v1 REST API by default).
//!
//! # Example
//!
//! ```ignore
//! use pinlab_speech::{CloudSpeechClient, SpeechConfig, SpeechRecognizer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SpeechConfig::new("https://speech.googleapis.com/v1/speech:recognize", "API_KEY");
//!     let client = CloudSpeechClient::new(config)?;
//!
//!     let text = client.recognize(&clip).await?;
//!     println!("You said: {}", text);
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod recognizer;
mod types;

pub use client::CloudSpeechClient;
pub use error::{Result, SpeechError};
pub use recognizer::SpeechRecognizer;
pub use types::{
    RecognitionAudio, RecognitionConfig, RecognizeRequest, RecognizeResponse,
    SpeechAlternative, SpeechConfig, SpeechResult,
};
