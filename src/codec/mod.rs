//! Container codec
//!
//! Reads and writes `PcmBuffer`s as chunked little-endian WAV containers
//! (16/24-bit integer PCM, mono/stereo, 44.1/48 kHz).

mod riff;
mod wav;

pub use riff::{ContainerInfo, FORMAT_EXTENSIBLE, FORMAT_PCM};
pub use wav::{decode, encode, inspect, read_file, write_file};
