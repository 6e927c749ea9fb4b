/// Captured audio handed from the microphone to the speech service
use std::time::Duration;

/// Mono 16-bit PCM clip
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioClip {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Mono samples
    pub samples: Vec<i16>,
}

impl AudioClip {
    pub fn new(sample_rate: u32, samples: Vec<i16>) -> Self {
        Self {
            sample_rate,
            samples,
        }
    }

    /// Playback duration; zero for an empty clip or a zero sample rate
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate))
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Little-endian LINEAR16 bytes
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples
            .iter()
            .flat_map(|sample| sample.to_le_bytes())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let clip = AudioClip::new(16_000, vec![0; 8_000]);
        assert_eq!(clip.duration(), Duration::from_millis(500));
        assert_eq!(AudioClip::new(0, vec![1, 2]).duration(), Duration::ZERO);
    }

    #[test]
    fn test_le_bytes() {
        let clip = AudioClip::new(16_000, vec![1, -2]);
        assert_eq!(clip.to_le_bytes(), vec![0x01, 0x00, 0xFE, 0xFF]);
    }
}
