//! Audiomark - PCM Watermarking and Band Activity Analysis
//!
//! Audiomark works on decoded integer PCM audio and provides:
//! 1. A WAV container codec with lossless decode/encode
//! 2. A watermark encoder that prepends near-silent marker frames
//! 3. A detector that verifies and strips those markers bit-exactly
//! 4. A frequency-band segmentation engine that finds where each band is active
//!
//! # Architecture
//!
//! Every operation is a synchronous, pure transform over an owned or
//! borrowed [`PcmBuffer`](pcm::PcmBuffer). Configuration is passed in per
//! call and nothing is cached between calls, so independent buffers can be
//! processed concurrently without locking.
//!
//! ```
//! use audiomark::{codec, watermark};
//! use audiomark::pcm::PcmBuffer;
//!
//! let audio = PcmBuffer::new(48000, 24, 2, vec![0; 200]).unwrap();
//! let pattern = watermark::WatermarkPattern::sixteen_frame();
//!
//! let bytes = codec::encode(&watermark::embed(audio.clone(), &pattern).unwrap()).unwrap();
//! let restored = watermark::detect_and_strip(codec::decode(&bytes).unwrap(), &pattern).unwrap();
//! assert_eq!(restored, audio);
//! ```

pub mod analysis;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod pcm;
pub mod watermark;

pub use config::{EngineConfig, SegmentationConfig};
pub use error::{AudiomarkError, Result};
