//! PCM buffer model
//!
//! The in-memory representation shared by the codec, the watermark
//! encoder/detector and the segmentation engine.

mod buffer;
mod format;

pub use buffer::PcmBuffer;
pub use format::{validate_channels, BitDepth, SampleRate};
