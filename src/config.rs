//! Configuration values
//!
//! Nothing here is global: every operation takes its pattern or
//! segmentation settings as an argument, so one process can serve several
//! configurations side by side.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::{legacy_bands, standard_bands, FrequencyBand};
use crate::error::{AudiomarkError, Result};
use crate::pcm::SampleRate;
use crate::watermark::WatermarkPattern;

/// Default analysis window length in frames
pub const DEFAULT_WINDOW_FRAMES: usize = 2048;
/// Default hop between analysis windows in frames
pub const DEFAULT_HOP_FRAMES: usize = 512;
/// Default percentile of a band's energy above which a window is active
pub const DEFAULT_ACTIVE_PERCENTILE: f64 = 25.0;
/// Default silence gate in dB relative to full-scale power
pub const DEFAULT_NOISE_FLOOR_DB: f64 = -80.0;
/// Default number of inactive windows bridged inside one region
///
/// A steady tone's band energy wobbles with phase from window to window, so
/// a plain percentile threshold drops a scatter of single windows. Eight
/// hops (about 90 ms at 44.1 kHz) joins those dips without fusing notes
/// separated by real silence.
pub const DEFAULT_MERGE_GAP_WINDOWS: usize = 8;

/// Settings for the frequency-band segmentation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Bands to analyze; names must be unique
    pub bands: Vec<FrequencyBand>,
    /// Analysis window length in frames (also the FFT length)
    pub window_frames: usize,
    /// Frames between the starts of consecutive windows
    pub hop_frames: usize,
    /// Percentile (0-100) of each band's own energy series used as its threshold
    pub active_percentile: f64,
    /// Windows whose band power is at or below this level are never active.
    /// `None` disables the gate.
    pub noise_floor_db: Option<f64>,
    /// Active runs separated by at most this many inactive windows are merged
    pub merge_gap_windows: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            bands: standard_bands(),
            window_frames: DEFAULT_WINDOW_FRAMES,
            hop_frames: DEFAULT_HOP_FRAMES,
            active_percentile: DEFAULT_ACTIVE_PERCENTILE,
            noise_floor_db: Some(DEFAULT_NOISE_FLOOR_DB),
            merge_gap_windows: DEFAULT_MERGE_GAP_WINDOWS,
        }
    }
}

impl SegmentationConfig {
    /// Defaults with the 2000 Hz mid/treble boundary
    pub fn legacy() -> Self {
        Self {
            bands: legacy_bands(),
            ..Self::default()
        }
    }

    /// Replace the band set
    pub fn with_bands(mut self, bands: Vec<FrequencyBand>) -> Self {
        self.bands = bands;
        self
    }

    /// Set window and hop lengths
    pub fn with_window(mut self, window_frames: usize, hop_frames: usize) -> Self {
        self.window_frames = window_frames;
        self.hop_frames = hop_frames;
        self
    }

    /// Set the activity percentile
    pub fn with_percentile(mut self, active_percentile: f64) -> Self {
        self.active_percentile = active_percentile;
        self
    }

    /// Set (or disable with `None`) the silence gate
    pub fn with_noise_floor(mut self, noise_floor_db: Option<f64>) -> Self {
        self.noise_floor_db = noise_floor_db;
        self
    }

    /// Set how many inactive windows may be bridged inside one region
    pub fn with_merge_gap(mut self, merge_gap_windows: usize) -> Self {
        self.merge_gap_windows = merge_gap_windows;
        self
    }

    /// Noise floor as a linear power value (0.0 when disabled)
    pub fn noise_floor_power(&self) -> f64 {
        match self.noise_floor_db {
            Some(db) => 10.0_f64.powf(db / 10.0),
            None => 0.0,
        }
    }

    /// Validate settings that do not depend on the audio
    pub fn validate(&self) -> Result<()> {
        self.check(None)
    }

    /// Validate settings against a sample rate (band edges vs. Nyquist)
    pub fn validate_for(&self, sample_rate: SampleRate) -> Result<()> {
        self.check(Some(sample_rate.nyquist_hz()))
    }

    fn check(&self, nyquist_hz: Option<f64>) -> Result<()> {
        if self.window_frames < 2 {
            return Err(AudiomarkError::InvalidConfiguration {
                reason: format!("window_frames must be at least 2, got {}", self.window_frames),
            });
        }
        if self.hop_frames == 0 || self.hop_frames > self.window_frames {
            return Err(AudiomarkError::InvalidConfiguration {
                reason: format!(
                    "hop_frames must be between 1 and window_frames ({}), got {}",
                    self.window_frames, self.hop_frames
                ),
            });
        }
        if !(0.0..=100.0).contains(&self.active_percentile) {
            return Err(AudiomarkError::InvalidConfiguration {
                reason: format!("active_percentile must be within 0..=100, got {}", self.active_percentile),
            });
        }
        if let Some(db) = self.noise_floor_db {
            if db.is_nan() {
                return Err(AudiomarkError::InvalidConfiguration {
                    reason: "noise_floor_db must be a number".to_string(),
                });
            }
        }
        if self.bands.is_empty() {
            return Err(AudiomarkError::InvalidConfiguration {
                reason: "at least one frequency band is required".to_string(),
            });
        }

        let mut names = HashSet::new();
        for band in &self.bands {
            band.validate(nyquist_hz)?;
            if !names.insert(band.name.as_str()) {
                return Err(AudiomarkError::InvalidConfiguration {
                    reason: format!("duplicate band name '{}'", band.name),
                });
            }
        }
        Ok(())
    }
}

/// Complete engine configuration, loadable from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub watermark: WatermarkPattern,
    pub segmentation: SegmentationConfig,
}

impl EngineConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.watermark.validate()?;
        self.segmentation.validate()
    }
}
