//! PCM buffer implementation
//!
//! `PcmBuffer` is the canonical in-memory form of decoded audio. It is
//! immutable once built: every transform consumes or borrows a buffer and
//! returns a new one.

use crate::error::{AudiomarkError, Result};
use crate::pcm::format::{validate_channels, BitDepth, SampleRate};

/// Integer PCM samples with their format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmBuffer {
    sample_rate: SampleRate,
    bit_depth: BitDepth,
    channel_count: u16,
    /// Interleaved samples: [L0, R0, L1, R1, ...]
    samples: Vec<i32>,
}

impl PcmBuffer {
    /// Create a buffer from interleaved samples
    ///
    /// Fails with `UnsupportedFormat` for rates, depths or channel counts
    /// outside the supported set and with `InvalidSamples` when the data
    /// is not a whole number of frames or a sample overflows the bit depth.
    pub fn new(sample_rate: u32, bit_depth: u16, channel_count: u16, samples: Vec<i32>) -> Result<Self> {
        let sample_rate = SampleRate::try_from(sample_rate)?;
        let bit_depth = BitDepth::try_from(bit_depth)?;
        Self::with_format(sample_rate, bit_depth, channel_count, samples)
    }

    /// Create a buffer from already-validated format values
    pub fn with_format(
        sample_rate: SampleRate,
        bit_depth: BitDepth,
        channel_count: u16,
        samples: Vec<i32>,
    ) -> Result<Self> {
        let channel_count = validate_channels(channel_count)?;

        if samples.len() % channel_count as usize != 0 {
            return Err(AudiomarkError::InvalidSamples {
                reason: format!(
                    "Sample count {} is not divisible by channel count {}",
                    samples.len(),
                    channel_count
                ),
            });
        }

        if let Some((index, value)) = samples
            .iter()
            .enumerate()
            .find(|(_, &s)| !bit_depth.contains(s))
        {
            return Err(AudiomarkError::InvalidSamples {
                reason: format!(
                    "Sample {} at index {} exceeds the {}-bit range",
                    value,
                    index,
                    bit_depth.bits()
                ),
            });
        }

        Ok(Self {
            sample_rate,
            bit_depth,
            channel_count,
            samples,
        })
    }

    /// Create a buffer from per-frame sample sets
    pub fn from_frames<F>(sample_rate: u32, bit_depth: u16, channel_count: u16, frames: F) -> Result<Self>
    where
        F: IntoIterator,
        F::Item: AsRef<[i32]>,
    {
        let mut samples = Vec::new();
        for (index, frame) in frames.into_iter().enumerate() {
            let frame = frame.as_ref();
            if frame.len() != channel_count as usize {
                return Err(AudiomarkError::InvalidSamples {
                    reason: format!(
                        "Frame {} has {} samples, expected {}",
                        index,
                        frame.len(),
                        channel_count
                    ),
                });
            }
            samples.extend_from_slice(frame);
        }
        Self::new(sample_rate, bit_depth, channel_count, samples)
    }

    /// Create a silent buffer with the given number of frames
    pub fn silence(sample_rate: SampleRate, bit_depth: BitDepth, channel_count: u16, frames: usize) -> Result<Self> {
        Self::with_format(
            sample_rate,
            bit_depth,
            channel_count,
            vec![0; frames * channel_count as usize],
        )
    }

    /// Sample rate
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Bit depth
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Number of channels (1 = mono, 2 = stereo)
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channel_count as usize
    }

    /// True when the buffer holds no frames
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate.hz() as f64
    }

    /// All interleaved samples
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Consume the buffer and return its interleaved samples
    pub fn into_samples(self) -> Vec<i32> {
        self.samples
    }

    /// One frame (one sample per channel)
    pub fn frame(&self, index: usize) -> Option<&[i32]> {
        let channels = self.channel_count as usize;
        let start = index.checked_mul(channels)?;
        let end = start.checked_add(channels)?;
        self.samples.get(start..end)
    }

    /// Iterate over frames in time order
    pub fn frames(&self) -> impl Iterator<Item = &[i32]> + '_ {
        self.samples.chunks_exact(self.channel_count as usize)
    }

    /// Samples of a single channel (0-indexed)
    pub fn channel_samples(&self, channel: u16) -> Vec<i32> {
        if channel >= self.channel_count {
            return Vec::new();
        }
        self.samples
            .iter()
            .skip(channel as usize)
            .step_by(self.channel_count as usize)
            .copied()
            .collect()
    }

    /// Build a buffer with the same format from new interleaved samples
    pub(crate) fn derive(&self, samples: Vec<i32>) -> Self {
        Self {
            sample_rate: self.sample_rate,
            bit_depth: self.bit_depth,
            channel_count: self.channel_count,
            samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer() {
        let buf = PcmBuffer::new(44100, 16, 2, vec![1, -1, 2, -2, 3, -3]).unwrap();
        assert_eq!(buf.channel_count(), 2);
        assert_eq!(buf.frame_count(), 3);
        assert_eq!(buf.sample_rate().hz(), 44100);
        assert_eq!(buf.frame(1), Some(&[2, -2][..]));
        assert_eq!(buf.frame(3), None);
        assert_eq!(buf.frame(usize::MAX / 2), None);
        assert_eq!(buf.frame(usize::MAX), None);
    }

    #[test]
    fn test_channel_extraction() {
        let buf = PcmBuffer::new(48000, 24, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(buf.channel_samples(0), vec![1, 3, 5]);
        assert_eq!(buf.channel_samples(1), vec![2, 4, 6]);
        assert!(buf.channel_samples(2).is_empty());
    }

    #[test]
    fn test_zero_frames_is_valid() {
        let buf = PcmBuffer::new(44100, 16, 1, Vec::new()).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.frame_count(), 0);
        assert_eq!(buf.frames().count(), 0);
    }

    #[test]
    fn test_sample_out_of_range() {
        let result = PcmBuffer::new(44100, 16, 1, vec![0, 40000]);
        assert!(matches!(result, Err(AudiomarkError::InvalidSamples { .. })));

        // The same value is fine at 24-bit
        assert!(PcmBuffer::new(44100, 24, 1, vec![0, 40000]).is_ok());
    }

    #[test]
    fn test_partial_frame_rejected() {
        let result = PcmBuffer::new(44100, 16, 2, vec![1, 2, 3]);
        assert!(matches!(result, Err(AudiomarkError::InvalidSamples { .. })));
    }

    #[test]
    fn test_unsupported_format() {
        assert!(matches!(
            PcmBuffer::new(22050, 16, 1, vec![]),
            Err(AudiomarkError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            PcmBuffer::new(44100, 16, 3, vec![]),
            Err(AudiomarkError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_from_frames() {
        let buf = PcmBuffer::from_frames(44100, 16, 2, [[1, 2], [3, 4]]).unwrap();
        assert_eq!(buf.samples(), &[1, 2, 3, 4]);

        let bad = PcmBuffer::from_frames(44100, 16, 2, [vec![1, 2], vec![3]]);
        assert!(matches!(bad, Err(AudiomarkError::InvalidSamples { .. })));
    }

    #[test]
    fn test_duration() {
        let buf = PcmBuffer::silence(SampleRate::Hz48000, BitDepth::Sixteen, 1, 24000).unwrap();
        assert!((buf.duration_secs() - 0.5).abs() < 1e-12);
    }
}
