//! Watermark detector and stripper

use serde::Serialize;
use tracing::debug;

use crate::error::{AudiomarkError, Result};
use crate::pcm::{BitDepth, PcmBuffer};
use crate::watermark::embed::{amplitude_for, check_distinguishable};
use crate::watermark::pattern::{bits_to_string, WatermarkPattern};

/// Outcome of classifying a buffer's leading frames against a pattern
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Bits the pattern expects
    pub expected: Vec<bool>,
    /// Bits read from the first channel of the leading frames
    pub observed: Vec<bool>,
    /// Magnitude at or above which a sample reads as `true`
    pub threshold: f64,
}

impl Detection {
    /// True only when every observed bit equals the expected bit
    pub fn is_match(&self) -> bool {
        self.expected == self.observed
    }

    /// Number of positions where observed and expected bits differ
    pub fn hamming_distance(&self) -> usize {
        self.expected
            .iter()
            .zip(&self.observed)
            .filter(|(a, b)| a != b)
            .count()
    }
}

/// Midpoint between the quantized HIGH and LOW amplitudes at `bit_depth`
pub fn decision_threshold(pattern: &WatermarkPattern, bit_depth: BitDepth) -> f64 {
    let high = amplitude_for(true, pattern, bit_depth) as f64;
    let low = amplitude_for(false, pattern, bit_depth) as f64;
    (high + low) / 2.0
}

/// Classify the leading frames of `buffer` without modifying it
///
/// The threshold is quantized at the buffer's own bit depth.
///
/// # Errors
/// * `InvalidBitPattern` - the pattern is empty or its levels collapse at
///   this bit depth
/// * `InsufficientSamples` - fewer frames than pattern bits
pub fn detect(buffer: &PcmBuffer, pattern: &WatermarkPattern) -> Result<Detection> {
    pattern.validate()?;
    check_distinguishable(pattern, buffer.bit_depth())?;

    if buffer.frame_count() < pattern.len() {
        return Err(AudiomarkError::InsufficientSamples {
            operation: "watermark detection",
            required: pattern.len(),
            available: buffer.frame_count(),
        });
    }

    let threshold = decision_threshold(pattern, buffer.bit_depth());
    let observed = buffer
        .frames()
        .take(pattern.len())
        .map(|frame| (frame[0] as f64).abs() >= threshold)
        .collect();

    Ok(Detection {
        expected: pattern.bits().to_vec(),
        observed,
        threshold,
    })
}

/// Verify the watermark prefix and return the buffer without it
///
/// Matching is strict: every classified bit must equal the pattern.
///
/// # Errors
/// * `InsufficientSamples` - fewer frames than pattern bits
/// * `WatermarkNotFound` - the leading frames do not carry this pattern;
///   no output is produced
pub fn detect_and_strip(buffer: PcmBuffer, pattern: &WatermarkPattern) -> Result<PcmBuffer> {
    let detection = detect(&buffer, pattern)?;

    if !detection.is_match() {
        debug!(
            mismatched_bits = detection.hamming_distance(),
            "watermark not found"
        );
        return Err(AudiomarkError::WatermarkNotFound {
            expected: bits_to_string(&detection.expected),
            observed: bits_to_string(&detection.observed),
        });
    }

    let prefix = pattern.len() * buffer.channel_count() as usize;
    let stripped = buffer.derive(buffer.samples()[prefix..].to_vec());
    debug!(
        stripped_frames = pattern.len(),
        remaining_frames = stripped.frame_count(),
        "stripped watermark"
    );
    Ok(stripped)
}
