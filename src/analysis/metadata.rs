//! Metadata document
//!
//! Combines the basic buffer properties with the per-band segmentation
//! into one JSON document. Values computed by other analysis tools (tempo,
//! key, spectral centroid) can be attached as opaque JSON; nothing here
//! computes them.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::segment::{segment, ActiveRegion, BandActivity};
use crate::config::SegmentationConfig;
use crate::error::Result;
use crate::pcm::PcmBuffer;

/// Format properties of the analyzed buffer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicInfo {
    pub duration_seconds: f64,
    pub sample_rate_hz: u32,
    pub channels: u16,
    pub bit_depth: u16,
    pub total_samples: usize,
}

/// One region as written to the document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRecord {
    pub start_time_seconds: f64,
    pub end_time_seconds: f64,
    pub duration_seconds: f64,
    pub mean_energy: f64,
    pub max_energy: f64,
}

impl From<&ActiveRegion> for RegionRecord {
    fn from(region: &ActiveRegion) -> Self {
        Self {
            start_time_seconds: region.start_time_seconds,
            end_time_seconds: region.end_time_seconds,
            duration_seconds: region.duration_seconds(),
            mean_energy: region.mean_energy,
            max_energy: region.max_energy,
        }
    }
}

impl From<ActiveRegion> for RegionRecord {
    fn from(region: ActiveRegion) -> Self {
        Self::from(&region)
    }
}

/// Per-band block of the document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandSummary {
    pub frequency_range_hz: String,
    pub active_regions: Vec<RegionRecord>,
    pub mean_energy: f64,
    pub max_energy: f64,
    pub threshold: f64,
}

impl From<&BandActivity> for BandSummary {
    fn from(activity: &BandActivity) -> Self {
        Self {
            frequency_range_hz: activity.band.range_label(),
            active_regions: activity.active_regions.iter().map(RegionRecord::from).collect(),
            mean_energy: activity.mean_energy,
            max_energy: activity.max_energy,
            threshold: activity.threshold,
        }
    }
}

/// Analysis settings echoed into the document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSettings {
    pub window_frames: usize,
    pub hop_frames: usize,
    pub active_percentile: f64,
    pub noise_floor_db: Option<f64>,
    pub merge_gap_windows: usize,
}

/// Complete metadata document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioMetadata {
    pub basic_info: BasicInfo,
    pub analysis: AnalysisSettings,
    pub frequency_bands: BTreeMap<String, BandSummary>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub external: BTreeMap<String, serde_json::Value>,
}

impl AudioMetadata {
    /// Segment the buffer and assemble the document
    pub fn build(buffer: &PcmBuffer, config: &SegmentationConfig) -> Result<Self> {
        let segmentation = segment(buffer, config)?;

        Ok(Self {
            basic_info: BasicInfo {
                duration_seconds: buffer.duration_secs(),
                sample_rate_hz: buffer.sample_rate().hz(),
                channels: buffer.channel_count(),
                bit_depth: buffer.bit_depth().bits(),
                total_samples: buffer.frame_count(),
            },
            analysis: AnalysisSettings {
                window_frames: config.window_frames,
                hop_frames: config.hop_frames,
                active_percentile: config.active_percentile,
                noise_floor_db: config.noise_floor_db,
                merge_gap_windows: config.merge_gap_windows,
            },
            frequency_bands: segmentation
                .bands
                .iter()
                .map(|activity| (activity.band.name.clone(), BandSummary::from(activity)))
                .collect(),
            external: BTreeMap::new(),
        })
    }

    /// Attach an opaque value computed elsewhere
    pub fn with_external(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.external.insert(key.into(), value);
        self
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
