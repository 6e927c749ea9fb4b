//! Speech/silence threshold on chunk energy
//!
//! Energy is the RMS of a chunk of 16-bit samples. The threshold drifts
//! toward `ambient energy * ratio`; how fast is set by a damping factor
//! expressed per second, so the result does not depend on chunk size.

use pinlab_core::ListenerSettings;
use std::time::Duration;

/// Root-mean-square of a chunk of samples; 0.0 for an empty chunk
pub fn rms(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples
        .iter()
        .map(|&s| {
            let s = f64::from(s);
            s * s
        })
        .sum();
    (sum_squares / samples.len() as f64).sqrt()
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnergyThreshold {
    value: f64,
    damping: f64,
    ratio: f64,
}

impl EnergyThreshold {
    /// # Arguments
    /// * `initial` - Starting threshold
    /// * `damping` - Fraction of the old threshold kept after one second
    /// * `ratio` - Target threshold as a multiple of ambient energy
    pub fn new(initial: f64, damping: f64, ratio: f64) -> Self {
        Self {
            value: initial,
            damping,
            ratio,
        }
    }

    pub fn from_settings(settings: &ListenerSettings) -> Self {
        Self::new(
            settings.energy_threshold,
            settings.dynamic_energy_damping,
            settings.dynamic_energy_ratio,
        )
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Energy strictly above the threshold counts as speech
    pub fn is_speech(&self, energy: f64) -> bool {
        energy > self.value
    }

    /// Move the threshold toward `energy * ratio` for a chunk of `span`
    pub fn adapt(&mut self, energy: f64, span: Duration) {
        let damping = self.damping.powf(span.as_secs_f64());
        let target = energy * self.ratio;
        self.value = self.value * damping + target * (1.0 - damping);
    }
}
