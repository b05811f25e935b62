//! Active-region segmentation
//!
//! For every band independently, a window is active when its energy
//! strictly exceeds the band's own percentile threshold (and the optional
//! noise floor). Consecutive active windows are merged into regions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::band::FrequencyBand;
use crate::analysis::metadata::RegionRecord;
use crate::analysis::spectrum::{band_energies, BandEnergySeries};
use crate::config::SegmentationConfig;
use crate::error::Result;
use crate::pcm::PcmBuffer;

/// A maximal time span where a band's energy is above its threshold
///
/// Serializes with a derived `duration_seconds` field; deserializing ignores
/// it and keeps the start and end times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RegionRecord")]
pub struct ActiveRegion {
    pub start_time_seconds: f64,
    pub end_time_seconds: f64,
    pub mean_energy: f64,
    pub max_energy: f64,
}

impl ActiveRegion {
    pub fn duration_seconds(&self) -> f64 {
        self.end_time_seconds - self.start_time_seconds
    }

    /// True when the two regions share any instant
    pub fn overlaps(&self, other: &ActiveRegion) -> bool {
        self.start_time_seconds < other.end_time_seconds
            && other.start_time_seconds < self.end_time_seconds
    }
}

/// Segmentation result for one band
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandActivity {
    pub band: FrequencyBand,
    /// Energy a window must exceed to count as active
    pub threshold: f64,
    /// Mean of the band's energy over all windows
    pub mean_energy: f64,
    /// Largest window energy of the band
    pub max_energy: f64,
    /// Regions sorted by start time, pairwise disjoint
    pub active_regions: Vec<ActiveRegion>,
}

/// Segmentation of a whole buffer, bands in configuration order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segmentation {
    pub window_count: usize,
    pub bands: Vec<BandActivity>,
}

impl Segmentation {
    /// Activity of the band called `name`
    pub fn band(&self, name: &str) -> Option<&BandActivity> {
        self.bands.iter().find(|b| b.band.name == name)
    }

    /// Regions of the band called `name`
    pub fn regions(&self, name: &str) -> Option<&[ActiveRegion]> {
        self.band(name).map(|b| b.active_regions.as_slice())
    }

    /// Band name to regions
    pub fn into_region_map(self) -> BTreeMap<String, Vec<ActiveRegion>> {
        self.bands
            .into_iter()
            .map(|b| (b.band.name, b.active_regions))
            .collect()
    }
}

/// Percentile of `values` with linear interpolation between closest ranks
///
/// Matches the default ("linear") method of common numeric libraries:
/// rank `p/100 * (n-1)` in the sorted values. Returns NaN for an empty
/// slice.
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Merge active windows of one band into regions
///
/// Runs whose gap is at most `merge_gap_windows` inactive windows are
/// joined; region statistics cover every window from the first to the last
/// active window of the run.
fn regions_for(
    series: &BandEnergySeries,
    energies: &[f64],
    threshold: f64,
    floor: f64,
    merge_gap_windows: usize,
) -> Vec<ActiveRegion> {
    let close = |first: usize, last: usize| {
        let run = &energies[first..=last];
        ActiveRegion {
            start_time_seconds: series.window_span(first).0,
            end_time_seconds: series.window_span(last).1,
            mean_energy: mean(run),
            max_energy: max(run),
        }
    };

    let mut regions = Vec::new();
    let mut run: Option<(usize, usize)> = None;

    for (index, &energy) in energies.iter().enumerate() {
        if !(energy > threshold && energy > floor) {
            continue;
        }
        run = match run {
            Some((first, last)) if index - last - 1 <= merge_gap_windows => Some((first, index)),
            Some((first, last)) => {
                regions.push(close(first, last));
                Some((index, index))
            }
            None => Some((index, index)),
        };
    }
    if let Some((first, last)) = run {
        regions.push(close(first, last));
    }

    regions
}

/// Find the active regions of every configured band
///
/// # Errors
/// * `InsufficientSamples` - the buffer is shorter than one analysis window
/// * `InvalidConfiguration` - invalid window, hop, percentile or bands
pub fn segment(buffer: &PcmBuffer, config: &SegmentationConfig) -> Result<Segmentation> {
    let series = band_energies(buffer, config)?;
    let floor = config.noise_floor_power();

    let bands = series
        .bands
        .iter()
        .map(|entry| {
            let threshold = percentile(&entry.energies, config.active_percentile);
            let active_regions = regions_for(
                &series,
                &entry.energies,
                threshold,
                floor,
                config.merge_gap_windows,
            );
            debug!(
                band = %entry.band.name,
                threshold,
                regions = active_regions.len(),
                "segmented band"
            );
            BandActivity {
                band: entry.band.clone(),
                threshold,
                mean_energy: mean(&entry.energies),
                max_energy: max(&entry.energies),
                active_regions,
            }
        })
        .collect();

    Ok(Segmentation {
        window_count: series.window_count(),
        bands,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::band::FrequencyBand;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_percentile_linear_interpolation() {
        let values = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 50.0), 3.0);
        assert_eq!(percentile(&values, 100.0), 5.0);
        // rank 0.25 * 4 = 1.0
        assert_eq!(percentile(&values, 25.0), 2.0);
        // rank 0.25 * 3 = 0.75 between 1.0 and 2.0
        assert_relative_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 25.0), 1.75);
        assert!(percentile(&[], 25.0).is_nan());
    }

    fn burst_buffer() -> PcmBuffer {
        // 0.25 s of silence, 0.5 s of a 1 kHz tone with 50 ms raised-cosine
        // fades, 0.25 s of silence
        let rate = 44100;
        let fade = rate / 20;
        let (start, end) = (rate / 4, 3 * rate / 4);
        let samples = (0..rate)
            .map(|i| {
                if !(start..end).contains(&i) {
                    return 0;
                }
                let edge = (i - start).min(end - 1 - i);
                let gain = if edge < fade {
                    0.5 * (1.0 - (std::f64::consts::PI * edge as f64 / fade as f64).cos())
                } else {
                    1.0
                };
                let t = i as f64 / rate as f64;
                ((2.0 * std::f64::consts::PI * 1000.0 * t).sin() * gain * 16000.0) as i32
            })
            .collect();
        PcmBuffer::new(rate as u32, 16, 1, samples).unwrap()
    }

    #[test]
    fn test_burst_produces_single_region() {
        let config = SegmentationConfig::default();
        let result = segment(&burst_buffer(), &config).unwrap();

        let mid = result.regions("mid").unwrap();
        assert_eq!(mid.len(), 1);
        let region = &mid[0];
        assert!(region.start_time_seconds > 0.15 && region.start_time_seconds < 0.30);
        assert!(region.end_time_seconds > 0.68 && region.end_time_seconds < 0.80);
        assert!(region.max_energy >= region.mean_energy);

        // Silence never crosses the noise floor
        assert!(result.regions("treble").unwrap().is_empty());
        assert!(result.regions("sub_bass").unwrap().is_empty());
    }

    #[test]
    fn test_constant_energy_has_no_regions() {
        // Every window equals the threshold; none strictly exceeds it
        let buffer = PcmBuffer::new(44100, 16, 1, vec![0; 8192]).unwrap();
        let config = SegmentationConfig::default().with_noise_floor(None);
        let result = segment(&buffer, &config).unwrap();
        for band in &result.bands {
            assert!(band.active_regions.is_empty());
        }
    }

    #[test]
    fn test_merge_gap_bridges_short_dips() {
        let series_energies = [5.0, 5.0, 0.0, 5.0, 0.0, 0.0, 0.0, 5.0];
        let buffer = PcmBuffer::new(44100, 16, 1, vec![0; 2048 + 512 * 7]).unwrap();
        let series = band_energies(&buffer, &SegmentationConfig::default()).unwrap();
        assert_eq!(series.window_count(), series_energies.len());

        let strict = regions_for(&series, &series_energies, 1.0, 0.0, 0);
        assert_eq!(strict.len(), 3);

        let bridged = regions_for(&series, &series_energies, 1.0, 0.0, 1);
        assert_eq!(bridged.len(), 2);
        assert_eq!(bridged[0].start_time_seconds, 0.0);
        assert_eq!(bridged[0].end_time_seconds, series.window_span(3).1);
        assert_relative_eq!(bridged[0].mean_energy, 15.0 / 4.0);

        let all = regions_for(&series, &series_energies, 1.0, 0.0, 3);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].end_time_seconds, series.window_span(7).1);
    }

    #[test]
    fn test_regions_sorted_and_disjoint() {
        let config = SegmentationConfig::default().with_window(1024, 256);
        let result = segment(&burst_buffer(), &config).unwrap();
        for band in &result.bands {
            for pair in band.active_regions.windows(2) {
                assert!(pair[0].start_time_seconds < pair[1].start_time_seconds);
                assert!(!pair[0].overlaps(&pair[1]));
            }
            for region in &band.active_regions {
                assert!(region.start_time_seconds < region.end_time_seconds);
            }
        }
    }

    #[test]
    fn test_region_serializes_duration() {
        let region = ActiveRegion {
            start_time_seconds: 0.5,
            end_time_seconds: 1.25,
            mean_energy: 0.01,
            max_energy: 0.02,
        };
        let json = serde_json::to_value(&region).unwrap();
        assert_eq!(json["duration_seconds"], 0.75);
        assert_eq!(json["start_time_seconds"], 0.5);

        let back: ActiveRegion = serde_json::from_value(json).unwrap();
        assert_eq!(back, region);
    }

    #[test]
    fn test_region_map() {
        let bands = vec![FrequencyBand::new("tone", 900.0, 1100.0).unwrap()];
        let config = SegmentationConfig::default().with_bands(bands);
        let map = segment(&burst_buffer(), &config).unwrap().into_region_map();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["tone"]);
        assert_eq!(map["tone"].len(), 1);
    }
}
