use async_trait::async_trait;
use pinlab_core::{AudioClip, Transcription};

use crate::error::Result;

/// Speech-to-text backend
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe a clip
    ///
    /// Returns [`SpeechError::Unintelligible`](crate::SpeechError::Unintelligible)
    /// when the service finds no words.
    async fn recognize(&self, clip: &AudioClip) -> Result<String>;

    /// Transcribe a clip into the outcome the light switch consumes
    async fn transcribe(&self, clip: &AudioClip) -> Transcription {
        match self.recognize(clip).await {
            Ok(text) => Transcription::Heard(text),
            Err(err) => err.into(),
        }
    }
}
