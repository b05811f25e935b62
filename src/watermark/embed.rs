//! Watermark encoder
//!
//! Prepends one marker frame per pattern bit. Each marker frame holds the
//! quantized amplitude of the bit's dB level, broadcast to every channel.

use tracing::debug;

use crate::error::{AudiomarkError, Result};
use crate::pcm::{BitDepth, PcmBuffer};
use crate::watermark::pattern::WatermarkPattern;

/// Convert a dB level to a sample amplitude at the given bit depth
///
/// `amplitude = trunc(10^(dB/20) * max_amplitude)`. Truncation toward zero
/// is what maps the -90/-99 dB pair onto the sample values 1 and 0 at
/// 16-bit.
pub fn amplitude_for_db(db: f64, bit_depth: BitDepth) -> i32 {
    let linear = 10.0_f64.powf(db / 20.0);
    (linear * bit_depth.max_amplitude() as f64).trunc() as i32
}

/// Amplitude used to encode `bit` with `pattern`'s dB pair
pub fn amplitude_for(bit: bool, pattern: &WatermarkPattern, bit_depth: BitDepth) -> i32 {
    amplitude_for_db(pattern.db_for(bit), bit_depth)
}

/// Quantized marker amplitudes, one per pattern bit
pub fn marker_amplitudes(pattern: &WatermarkPattern, bit_depth: BitDepth) -> Vec<i32> {
    pattern
        .bits()
        .iter()
        .map(|&bit| amplitude_for(bit, pattern, bit_depth))
        .collect()
}

/// Check that the pattern's two levels quantize to different amplitudes
pub(crate) fn check_distinguishable(pattern: &WatermarkPattern, bit_depth: BitDepth) -> Result<()> {
    let high = amplitude_for(true, pattern, bit_depth);
    let low = amplitude_for(false, pattern, bit_depth);
    if high <= low {
        return Err(AudiomarkError::InvalidBitPattern {
            reason: format!(
                "{} dB and {} dB both quantize to amplitude {} at {}-bit",
                pattern.high_db(),
                pattern.low_db(),
                high,
                bit_depth.bits()
            ),
        });
    }
    Ok(())
}

/// Prepend the watermark marker frames to a buffer
///
/// The result has `pattern.len() + buffer.frame_count()` frames with the
/// same format; the original frames follow the markers unmodified.
///
/// # Errors
/// * `InvalidBitPattern` - empty pattern, or levels that cannot be told
///   apart at the buffer's bit depth
pub fn embed(buffer: PcmBuffer, pattern: &WatermarkPattern) -> Result<PcmBuffer> {
    pattern.validate()?;
    check_distinguishable(pattern, buffer.bit_depth())?;

    let channels = buffer.channel_count() as usize;
    let markers = marker_amplitudes(pattern, buffer.bit_depth());

    let mut samples = Vec::with_capacity(markers.len() * channels + buffer.samples().len());
    for &amplitude in &markers {
        samples.extend(std::iter::repeat(amplitude).take(channels));
    }
    samples.extend_from_slice(buffer.samples());

    debug!(
        marker_frames = markers.len(),
        original_frames = buffer.frame_count(),
        channels,
        "embedded watermark"
    );
    Ok(buffer.derive(samples))
}
