//! Phrase sources for the voice loop

use std::io::{self, BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use pinlab_audio::{CaptureError, Microphone, PhraseDetector};
use pinlab_core::{LabConfig, PhraseSource, Transcription};
use pinlab_speech::{CloudSpeechClient, SpeechConfig, SpeechRecognizer};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Lines of text stand in for transcriptions
///
/// A blank line counts as unintelligible audio; end of input ends the loop.
/// Lines are read on a detached thread, so a read that never returns does
/// not keep the runtime alive after the loop stops.
pub struct TypedPhrases {
    lines: mpsc::Receiver<io::Result<String>>,
}

impl TypedPhrases {
    pub fn new<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (line_tx, lines) = mpsc::channel(1);

        let spawned = thread::Builder::new()
            .name("pinlab-typed-input".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    let failed = line.is_err();
                    if line_tx.blocking_send(line).is_err() || failed {
                        break;
                    }
                }
            });
        if let Err(e) = spawned {
            warn!(error = %e, "Failed to start input reader");
        }

        Self { lines }
    }

    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }
}

#[async_trait]
impl PhraseSource for TypedPhrases {
    async fn next_phrase(&mut self) -> Option<Transcription> {
        info!("Type a command (turn on or turn off the light):");

        match self.lines.recv().await {
            Some(Ok(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    Some(Transcription::Unintelligible)
                } else {
                    Some(Transcription::Heard(line.to_string()))
                }
            }
            Some(Err(e)) => {
                warn!(error = %e, "Failed to read input");
                None
            }
            None => None,
        }
    }
}

/// Raises the capture thread's cancel flag when the waiting future goes away
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

struct Listener {
    microphone: Microphone,
    detector: PhraseDetector,
}

/// Microphone capture followed by cloud transcription
pub struct MicrophonePhrases<R> {
    listener: Arc<Mutex<Listener>>,
    recognizer: R,
    calibration: Duration,
    listen_timeout: Option<Duration>,
}

impl<R: SpeechRecognizer> MicrophonePhrases<R> {
    pub fn new(
        microphone: Microphone,
        detector: PhraseDetector,
        recognizer: R,
        calibration: Duration,
        listen_timeout: Option<Duration>,
    ) -> Self {
        Self {
            listener: Arc::new(Mutex::new(Listener {
                microphone,
                detector,
            })),
            recognizer,
            calibration,
            listen_timeout,
        }
    }
}

impl MicrophonePhrases<CloudSpeechClient> {
    /// Open the configured microphone and speech service
    pub fn from_config(config: &LabConfig) -> anyhow::Result<Self> {
        config.speech.require_api_key()?;
        let speech = SpeechConfig::from_settings(&config.speech)?;
        let recognizer = CloudSpeechClient::new(speech)?;

        let microphone = Microphone::open(config.voice.input_device.as_deref())
            .context("failed to open microphone")?;
        let detector = PhraseDetector::new(&config.audio, microphone.sample_rate());

        Ok(Self::new(
            microphone,
            detector,
            recognizer,
            config.voice.ambient_calibration(),
            config.audio.listen_timeout_ms.map(Duration::from_millis),
        ))
    }
}

#[async_trait]
impl<R: SpeechRecognizer> PhraseSource for MicrophonePhrases<R> {
    async fn next_phrase(&mut self) -> Option<Transcription> {
        info!("Please say a command (turn on or turn off the light):");

        let listener = Arc::clone(&self.listener);
        let calibration = self.calibration;
        let timeout = self.listen_timeout;

        // One flag per call; dropping this future stops the blocking capture
        let cancel = Arc::new(AtomicBool::new(false));
        let _cancel_on_drop = CancelOnDrop(Arc::clone(&cancel));

        let captured = tokio::task::spawn_blocking(move || {
            let mut guard = listener.lock().map_err(|_| CaptureError::Disconnected)?;
            let Listener {
                microphone,
                detector,
            } = &mut *guard;
            microphone.adjust_for_ambient_noise(detector, calibration, &cancel)?;
            microphone.listen(detector, timeout, &cancel)
        })
        .await;

        match captured {
            Ok(Ok(clip)) => Some(self.recognizer.transcribe(&clip).await),
            Ok(Err(CaptureError::ListenTimeout(after))) => {
                info!(after_ms = after.as_millis() as u64, "No speech heard");
                Some(Transcription::Unintelligible)
            }
            Ok(Err(CaptureError::Cancelled)) => {
                debug!("Listening cancelled");
                None
            }
            Ok(Err(e)) => {
                error!(error = %e, "Microphone capture failed");
                None
            }
            Err(e) => {
                error!(error = %e, "Capture task failed");
                None
            }
        }
    }
}
