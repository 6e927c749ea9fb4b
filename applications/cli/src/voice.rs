//! Voice command loop
//!
//! listen -> transcribe -> act -> pause, until the phrase source runs dry or
//! `shutdown` resolves. Failed transcriptions are logged by the switch and the
//! loop carries on; only pin driver errors end it early.

use std::future::Future;
use std::time::Duration;

use pinlab_core::{CommandOutcome, LightSwitch, PhraseSource, PinDriver, Result};
use tracing::info;

/// Counts of what happened during a voice run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoiceSummary {
    pub phrases: usize,
    pub switched: usize,
    pub not_recognized: usize,
    pub no_command: usize,
}

impl VoiceSummary {
    fn record(&mut self, outcome: &CommandOutcome) {
        self.phrases += 1;
        match outcome {
            CommandOutcome::Switched(_) => self.switched += 1,
            CommandOutcome::NotRecognized(_) => self.not_recognized += 1,
            CommandOutcome::NoCommand => self.no_command += 1,
        }
    }
}

pub async fn run_voice<D, P, S>(
    switch: &mut LightSwitch<D>,
    source: &mut P,
    pause: Duration,
    shutdown: S,
) -> Result<VoiceSummary>
where
    D: PinDriver,
    P: PhraseSource + ?Sized,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut summary = VoiceSummary::default();

    loop {
        let phrase = tokio::select! {
            phrase = source.next_phrase() => phrase,
            () = &mut shutdown => {
                info!("Interrupted, stopping voice control");
                break;
            }
        };

        let Some(transcription) = phrase else {
            info!("No more phrases");
            break;
        };

        let outcome = switch.handle(&transcription)?;
        summary.record(&outcome);

        if !pause.is_zero() {
            tokio::select! {
                () = tokio::time::sleep(pause) => {}
                () = &mut shutdown => {
                    info!("Interrupted, stopping voice control");
                    break;
                }
            }
        }
    }

    Ok(summary)
}
