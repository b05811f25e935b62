//! Frequency band definitions

use serde::{Deserialize, Serialize};

use crate::error::{AudiomarkError, Result};

/// Boundary between "mid" and "treble" in the standard band set
pub const STANDARD_TREBLE_HZ: f64 = 4000.0;
/// Boundary used by the older band set
pub const LEGACY_TREBLE_HZ: f64 = 2000.0;

/// A named half-open frequency interval `[low_hz, high_hz)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub name: String,
    pub low_hz: f64,
    pub high_hz: f64,
}

impl FrequencyBand {
    /// Create a validated band
    pub fn new(name: impl Into<String>, low_hz: f64, high_hz: f64) -> Result<Self> {
        let band = Self {
            name: name.into(),
            low_hz,
            high_hz,
        };
        band.validate(None)?;
        Ok(band)
    }

    /// Check `0 <= low_hz < high_hz`, and `high_hz <= nyquist` when given
    pub fn validate(&self, nyquist_hz: Option<f64>) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AudiomarkError::InvalidConfiguration {
                reason: "frequency band has an empty name".to_string(),
            });
        }
        if !(self.low_hz.is_finite() && self.high_hz.is_finite()) || self.low_hz < 0.0 {
            return Err(AudiomarkError::InvalidConfiguration {
                reason: format!("band '{}' has invalid edges {}..{}", self.name, self.low_hz, self.high_hz),
            });
        }
        if self.low_hz >= self.high_hz {
            return Err(AudiomarkError::InvalidConfiguration {
                reason: format!(
                    "band '{}' low edge {} Hz must be below high edge {} Hz",
                    self.name, self.low_hz, self.high_hz
                ),
            });
        }
        if let Some(nyquist) = nyquist_hz {
            if self.high_hz > nyquist {
                return Err(AudiomarkError::InvalidConfiguration {
                    reason: format!(
                        "band '{}' high edge {} Hz exceeds the Nyquist frequency {} Hz",
                        self.name, self.high_hz, nyquist
                    ),
                });
            }
        }
        Ok(())
    }

    /// True when `hz` falls in `[low_hz, high_hz)`
    pub fn contains(&self, hz: f64) -> bool {
        hz >= self.low_hz && hz < self.high_hz
    }

    /// FFT bins (0..=fft_len/2) whose centre frequency lies in the band
    pub fn bins(&self, sample_rate_hz: u32, fft_len: usize) -> Vec<usize> {
        let bin_hz = sample_rate_hz as f64 / fft_len as f64;
        (0..=fft_len / 2)
            .filter(|&k| self.contains(k as f64 * bin_hz))
            .collect()
    }

    /// Human-readable range, e.g. `"60-250"`
    pub fn range_label(&self) -> String {
        format!("{}-{}", self.low_hz, self.high_hz)
    }
}

/// Standard four-band split with the given mid/treble boundary
pub fn bands_with_treble_boundary(treble_hz: f64) -> Vec<FrequencyBand> {
    vec![
        FrequencyBand {
            name: "sub_bass".to_string(),
            low_hz: 20.0,
            high_hz: 60.0,
        },
        FrequencyBand {
            name: "bass".to_string(),
            low_hz: 60.0,
            high_hz: 250.0,
        },
        FrequencyBand {
            name: "mid".to_string(),
            low_hz: 250.0,
            high_hz: treble_hz,
        },
        FrequencyBand {
            name: "treble".to_string(),
            low_hz: treble_hz,
            high_hz: 20000.0,
        },
    ]
}

/// Sub-bass 20-60, bass 60-250, mid 250-4000, treble 4000-20000 Hz
pub fn standard_bands() -> Vec<FrequencyBand> {
    bands_with_treble_boundary(STANDARD_TREBLE_HZ)
}

/// Same split with the mid/treble boundary at 2000 Hz
pub fn legacy_bands() -> Vec<FrequencyBand> {
    bands_with_treble_boundary(LEGACY_TREBLE_HZ)
}
