//! Supported sample formats

use serde::{Deserialize, Serialize};

use crate::error::{AudiomarkError, Result};

/// Supported sample rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SampleRate {
    /// 44.1 kHz (CD)
    Hz44100,
    /// 48 kHz
    Hz48000,
}

impl SampleRate {
    /// Sample rate in Hz
    pub fn hz(self) -> u32 {
        match self {
            SampleRate::Hz44100 => 44100,
            SampleRate::Hz48000 => 48000,
        }
    }

    /// Highest representable frequency
    pub fn nyquist_hz(self) -> f64 {
        self.hz() as f64 / 2.0
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = AudiomarkError;

    fn try_from(hz: u32) -> Result<Self> {
        match hz {
            44100 => Ok(SampleRate::Hz44100),
            48000 => Ok(SampleRate::Hz48000),
            other => Err(AudiomarkError::UnsupportedFormat {
                format: format!("{} Hz sample rate (only 44100 and 48000 supported)", other),
            }),
        }
    }
}

impl From<SampleRate> for u32 {
    fn from(rate: SampleRate) -> u32 {
        rate.hz()
    }
}

/// Supported integer bit depths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum BitDepth {
    Sixteen,
    TwentyFour,
}

impl BitDepth {
    /// Bits per sample
    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Sixteen => 16,
            BitDepth::TwentyFour => 24,
        }
    }

    /// Bytes per sample in the container
    pub fn bytes(self) -> u16 {
        self.bits() / 8
    }

    /// Largest representable magnitude (32767 for 16-bit, 8388607 for 24-bit)
    pub fn max_amplitude(self) -> i32 {
        (1i32 << (self.bits() - 1)) - 1
    }

    /// Most negative representable sample
    pub fn min_sample(self) -> i32 {
        -(1i32 << (self.bits() - 1))
    }

    /// Full-scale divisor used to normalize samples to [-1.0, 1.0)
    pub fn full_scale(self) -> f64 {
        (1i64 << (self.bits() - 1)) as f64
    }

    /// Check that a sample fits the signed range of this depth
    pub fn contains(self, sample: i32) -> bool {
        (self.min_sample()..=self.max_amplitude()).contains(&sample)
    }
}

impl TryFrom<u16> for BitDepth {
    type Error = AudiomarkError;

    fn try_from(bits: u16) -> Result<Self> {
        match bits {
            16 => Ok(BitDepth::Sixteen),
            24 => Ok(BitDepth::TwentyFour),
            other => Err(AudiomarkError::UnsupportedFormat {
                format: format!("{}-bit audio (only 16 and 24 supported)", other),
            }),
        }
    }
}

impl From<BitDepth> for u16 {
    fn from(depth: BitDepth) -> u16 {
        depth.bits()
    }
}

/// Validate a channel count (mono or stereo only)
pub fn validate_channels(channels: u16) -> Result<u16> {
    match channels {
        1 | 2 => Ok(channels),
        other => Err(AudiomarkError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", other),
        }),
    }
}
