//! Frequency-band segmentation engine
//!
//! Computes per-band energy over time and extracts the regions where each
//! band is active.
//!
//! # Policies
//! - Multi-channel audio is down-mixed to the mean of its channels before
//!   analysis.
//! - A trailing partial window is dropped.
//! - Each band's threshold is a percentile of that band's own energy series,
//!   recomputed for every buffer.

mod band;
mod metadata;
mod segment;
mod spectrum;

pub use band::{
    bands_with_treble_boundary, legacy_bands, standard_bands, FrequencyBand, LEGACY_TREBLE_HZ,
    STANDARD_TREBLE_HZ,
};
pub use metadata::{AnalysisSettings, AudioMetadata, BandSummary, BasicInfo, RegionRecord};
pub use segment::{percentile, segment, ActiveRegion, BandActivity, Segmentation};
pub use spectrum::{band_energies, BandEnergies, BandEnergySeries};
