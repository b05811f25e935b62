//! Watermark codec
//!
//! A watermark is a short run of near-silent marker frames prepended to the
//! audio. Each frame encodes one pattern bit as one of two very low
//! amplitudes (by default -90 dB for `1` and -99 dB for `0`, which quantize
//! to the sample values 1 and 0 at 16-bit).
//!
//! ```
//! use audiomark::pcm::PcmBuffer;
//! use audiomark::watermark::{detect_and_strip, embed, WatermarkPattern};
//!
//! let audio = PcmBuffer::new(44100, 16, 1, vec![10, -10, 20]).unwrap();
//! let pattern = WatermarkPattern::ten_frame();
//!
//! let marked = embed(audio.clone(), &pattern).unwrap();
//! assert_eq!(marked.frame_count(), 13);
//! assert_eq!(detect_and_strip(marked, &pattern).unwrap(), audio);
//! ```

mod detect;
mod embed;
mod pattern;

pub use detect::{decision_threshold, detect, detect_and_strip, Detection};
pub use embed::{amplitude_for, amplitude_for_db, embed, marker_amplitudes};
pub use pattern::{bits_to_string, WatermarkPattern, DEFAULT_HIGH_DB, DEFAULT_LOW_DB};
