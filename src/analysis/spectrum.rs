//! Short-time band energy
//!
//! The buffer is down-mixed to one analysis channel (the arithmetic mean of
//! the channel samples, normalized to full scale), cut into Hann-windowed
//! frames of `window_frames` samples every `hop_frames` samples, and each
//! frame's one-sided power spectrum is summed over every band's bins.
//!
//! A trailing partial window is dropped rather than zero-padded, so no
//! window is artificially quiet.

use rustfft::{num_complex::Complex, FftPlanner};
use tracing::{debug, trace};

use crate::analysis::band::FrequencyBand;
use crate::config::SegmentationConfig;
use crate::error::{AudiomarkError, Result};
use crate::pcm::PcmBuffer;

/// Energy time series of one band
#[derive(Debug, Clone, PartialEq)]
pub struct BandEnergies {
    pub band: FrequencyBand,
    /// One value per analysis window, in time order
    pub energies: Vec<f64>,
}

/// Per-band energy over time for a whole buffer
#[derive(Debug, Clone, PartialEq)]
pub struct BandEnergySeries {
    sample_rate_hz: u32,
    window_frames: usize,
    hop_frames: usize,
    window_count: usize,
    pub bands: Vec<BandEnergies>,
}

impl BandEnergySeries {
    /// Number of analysis windows
    pub fn window_count(&self) -> usize {
        self.window_count
    }

    /// Analysis window length in frames
    pub fn window_frames(&self) -> usize {
        self.window_frames
    }

    /// Hop between windows in frames
    pub fn hop_frames(&self) -> usize {
        self.hop_frames
    }

    /// Time span attributed to window `index`, in seconds
    ///
    /// Each window owns the hop-length slice starting at its first frame;
    /// the final window also owns the rest of the analyzed audio. Spans of
    /// different windows therefore never overlap.
    pub fn window_span(&self, index: usize) -> (f64, f64) {
        let rate = self.sample_rate_hz as f64;
        let start_frame = index * self.hop_frames;
        let end_frame = if index + 1 >= self.window_count {
            start_frame + self.window_frames
        } else {
            start_frame + self.hop_frames
        };
        (start_frame as f64 / rate, end_frame as f64 / rate)
    }

    /// Energies of the band called `name`
    pub fn energies(&self, name: &str) -> Option<&[f64]> {
        self.bands
            .iter()
            .find(|b| b.band.name == name)
            .map(|b| b.energies.as_slice())
    }
}

/// Periodic Hann window
fn hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / size as f64).cos()))
        .collect()
}

/// Mean of the channel samples of every frame, scaled to [-1.0, 1.0)
fn downmix(buffer: &PcmBuffer) -> Vec<f64> {
    let channels = buffer.channel_count() as f64;
    let full_scale = buffer.bit_depth().full_scale();
    buffer
        .frames()
        .map(|frame| frame.iter().map(|&s| s as f64).sum::<f64>() / channels / full_scale)
        .collect()
}

/// Compute the band-energy time series of a buffer
///
/// Energies are one-sided spectral power normalized by the window power, so
/// a band's value approximates the mean-square level (full scale = 1.0) of
/// the signal content inside it.
///
/// # Errors
/// * `InvalidConfiguration` - the settings or bands are invalid for this
///   sample rate
/// * `InsufficientSamples` - the buffer is shorter than one window
pub fn band_energies(buffer: &PcmBuffer, config: &SegmentationConfig) -> Result<BandEnergySeries> {
    config.validate_for(buffer.sample_rate())?;

    let n = config.window_frames;
    let hop = config.hop_frames;
    if buffer.frame_count() < n {
        return Err(AudiomarkError::InsufficientSamples {
            operation: "segmentation",
            required: n,
            available: buffer.frame_count(),
        });
    }

    let signal = downmix(buffer);
    let window = hann_window(n);
    let window_power: f64 = window.iter().map(|w| w * w).sum();
    let window_count = (signal.len() - n) / hop + 1;
    let sample_rate_hz = buffer.sample_rate().hz();

    // One-sided power: interior bins count twice, DC and Nyquist once
    let bin_scale: Vec<f64> = (0..=n / 2)
        .map(|k| {
            let fold = if k == 0 || (n % 2 == 0 && k == n / 2) { 1.0 } else { 2.0 };
            fold / (n as f64 * window_power)
        })
        .collect();
    let band_bins: Vec<Vec<usize>> = config
        .bands
        .iter()
        .map(|band| band.bins(sample_rate_hz, n))
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    let mut scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
    let mut spectrum = vec![Complex::new(0.0, 0.0); n];
    let mut power = vec![0.0; n / 2 + 1];
    let mut series: Vec<Vec<f64>> = vec![Vec::with_capacity(window_count); config.bands.len()];

    for index in 0..window_count {
        let start = index * hop;
        for ((slot, &s), &w) in spectrum.iter_mut().zip(&signal[start..start + n]).zip(&window) {
            *slot = Complex::new(s * w, 0.0);
        }

        fft.process_with_scratch(&mut spectrum, &mut scratch);

        for (k, p) in power.iter_mut().enumerate() {
            *p = spectrum[k].norm_sqr() * bin_scale[k];
        }

        for (energies, bins) in series.iter_mut().zip(&band_bins) {
            energies.push(bins.iter().map(|&k| power[k]).sum());
        }
        trace!(window = index, start_frame = start, "analyzed window");
    }

    debug!(
        windows = window_count,
        window_frames = n,
        hop_frames = hop,
        bands = config.bands.len(),
        "computed band energies"
    );

    Ok(BandEnergySeries {
        sample_rate_hz,
        window_frames: n,
        hop_frames: hop,
        window_count,
        bands: config
            .bands
            .iter()
            .cloned()
            .zip(series)
            .map(|(band, energies)| BandEnergies { band, energies })
            .collect(),
    })
}
