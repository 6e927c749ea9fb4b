//! Phrase detection over a stream of sample chunks
//!
//! The detector waits for a chunk above the energy threshold, records until
//! the trailing silence exceeds the pause threshold, and hands back the
//! phrase with at most `non_speaking_duration` of silence on either side.
//! Phrases with too little speech are dropped and waiting starts over.
//!
//! All lengths are tracked in samples, so chunk size only affects how soon a
//! decision is made, never the clip contents.

use std::collections::VecDeque;
use std::mem;
use std::time::Duration;

use pinlab_core::{AudioClip, ListenerSettings};
use tracing::{debug, trace};

use crate::energy::{rms, EnergyThreshold};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetectorState {
    Waiting,
    Speaking,
}

#[derive(Debug)]
pub struct PhraseDetector {
    sample_rate: u32,
    threshold: EnergyThreshold,
    dynamic_threshold: bool,

    pause_samples: usize,
    phrase_min_samples: usize,
    non_speaking_samples: usize,
    phrase_limit_samples: Option<usize>,

    state: DetectorState,
    /// Quiet chunks kept while waiting, prepended to the next phrase
    preroll: VecDeque<Vec<i16>>,
    preroll_len: usize,
    /// Phrase audio including pre-roll
    phrase: Vec<i16>,
    /// Samples received since speech started
    phrase_len: usize,
    /// Consecutive quiet samples at the end of `phrase`
    silence_len: usize,
}

impl PhraseDetector {
    pub fn new(settings: &ListenerSettings, sample_rate: u32) -> Self {
        let samples = |ms: u64| ms_to_samples(ms, sample_rate);

        Self {
            sample_rate,
            threshold: EnergyThreshold::from_settings(settings),
            dynamic_threshold: settings.dynamic_energy_threshold,
            pause_samples: samples(settings.pause_threshold_ms),
            phrase_min_samples: samples(settings.phrase_threshold_ms),
            non_speaking_samples: samples(settings.non_speaking_duration_ms),
            phrase_limit_samples: settings.phrase_time_limit_ms.map(samples),
            state: DetectorState::Waiting,
            preroll: VecDeque::new(),
            preroll_len: 0,
            phrase: Vec::new(),
            phrase_len: 0,
            silence_len: 0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn threshold(&self) -> &EnergyThreshold {
        &self.threshold
    }

    /// True once speech has started and the phrase is not finished yet
    pub fn is_speaking(&self) -> bool {
        self.state == DetectorState::Speaking
    }

    /// Adapt the threshold to a chunk of background noise
    ///
    /// Used for ambient calibration; does not touch the phrase state.
    pub fn calibrate(&mut self, chunk: &[i16]) {
        if chunk.is_empty() {
            return;
        }
        self.threshold.adapt(rms(chunk), self.span(chunk.len()));
        trace!(threshold = self.threshold.value(), "Calibrated energy threshold");
    }

    /// Drop any partial phrase and start waiting again
    pub fn reset(&mut self) {
        self.state = DetectorState::Waiting;
        self.preroll.clear();
        self.preroll_len = 0;
        self.phrase.clear();
        self.phrase_len = 0;
        self.silence_len = 0;
    }

    /// Feed the next chunk; returns a clip when a phrase ends
    pub fn push(&mut self, chunk: &[i16]) -> Option<AudioClip> {
        if chunk.is_empty() {
            return None;
        }

        let energy = rms(chunk);
        let speech = self.threshold.is_speech(energy);

        match self.state {
            DetectorState::Waiting => {
                if speech {
                    self.start_phrase(chunk);
                    debug!(energy, threshold = self.threshold.value(), "Phrase started");
                    return self.check_limit();
                }

                if self.dynamic_threshold {
                    self.threshold.adapt(energy, self.span(chunk.len()));
                }
                self.keep_preroll(chunk);
                None
            }
            DetectorState::Speaking => {
                self.phrase.extend_from_slice(chunk);
                self.phrase_len += chunk.len();
                if speech {
                    self.silence_len = 0;
                } else {
                    self.silence_len += chunk.len();
                }

                if let Some(clip) = self.check_limit() {
                    return Some(clip);
                }
                if self.silence_len > self.pause_samples {
                    return self.finish_phrase();
                }
                None
            }
        }
    }

    fn start_phrase(&mut self, chunk: &[i16]) {
        self.state = DetectorState::Speaking;
        self.phrase.clear();
        for quiet in self.preroll.drain(..) {
            self.phrase.extend_from_slice(&quiet);
        }
        self.preroll_len = 0;
        self.phrase.extend_from_slice(chunk);
        self.phrase_len = chunk.len();
        self.silence_len = 0;
    }

    /// Keep at least `non_speaking_samples` of the most recent quiet audio
    fn keep_preroll(&mut self, chunk: &[i16]) {
        self.preroll.push_back(chunk.to_vec());
        self.preroll_len += chunk.len();

        while let Some(front) = self.preroll.front() {
            if self.preroll_len - front.len() < self.non_speaking_samples {
                break;
            }
            self.preroll_len -= front.len();
            self.preroll.pop_front();
        }
    }

    fn check_limit(&mut self) -> Option<AudioClip> {
        match self.phrase_limit_samples {
            Some(limit) if self.phrase_len >= limit => {
                debug!("Phrase time limit reached");
                Some(self.take_clip())
            }
            _ => None,
        }
    }

    fn finish_phrase(&mut self) -> Option<AudioClip> {
        let speech_len = self.phrase_len - self.silence_len;
        if speech_len < self.phrase_min_samples {
            debug!(
                speech_ms = self.span(speech_len).as_millis() as u64,
                "Phrase too short, discarding"
            );
            self.reset();
            return None;
        }
        Some(self.take_clip())
    }

    fn take_clip(&mut self) -> AudioClip {
        let excess = self.silence_len.saturating_sub(self.non_speaking_samples);
        let keep = self.phrase.len() - excess.min(self.phrase.len());
        self.phrase.truncate(keep);

        let clip = AudioClip::new(self.sample_rate, mem::take(&mut self.phrase));
        self.reset();
        debug!(duration_ms = clip.duration().as_millis() as u64, "Phrase complete");
        clip
    }

    fn span(&self, samples: usize) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(samples as f64 / f64::from(self.sample_rate))
    }
}

fn ms_to_samples(ms: u64, sample_rate: u32) -> usize {
    let samples = ms.saturating_mul(u64::from(sample_rate)) / 1000;
    usize::try_from(samples).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_to_samples() {
        assert_eq!(ms_to_samples(800, 16_000), 12_800);
        assert_eq!(ms_to_samples(0, 16_000), 0);
        assert_eq!(ms_to_samples(500, 44_100), 22_050);
    }

    #[test]
    fn test_preroll_keeps_non_speaking_duration() {
        let mut detector = PhraseDetector::new(&ListenerSettings::default(), 16_000);
        for _ in 0..20 {
            assert!(detector.push(&[0; 1_600]).is_none());
        }
        // 500 ms at 16 kHz
        assert_eq!(detector.preroll_len, 8_000);
        assert!(!detector.is_speaking());
    }

    #[test]
    fn test_empty_chunk_is_ignored() {
        let mut detector = PhraseDetector::new(&ListenerSettings::default(), 16_000);
        assert!(detector.push(&[]).is_none());
        assert_eq!(detector.threshold().value(), 300.0);
    }
}
