//! WAV container decode/encode
//!
//! Operates on fully buffered byte blobs. The structure is validated by
//! [`riff::scan`](super::riff::scan) and the interleaved sample payload is
//! read and written with hound over in-memory cursors.

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use crate::codec::riff::{self, ContainerInfo, FORMAT_PCM};
use crate::error::{AudiomarkError, Result};
use crate::pcm::{validate_channels, BitDepth, PcmBuffer, SampleRate};

fn map_read_error(e: hound::Error) -> AudiomarkError {
    let message = e.to_string();
    match e {
        hound::Error::Unsupported | hound::Error::InvalidSampleFormat => {
            AudiomarkError::UnsupportedFormat { format: message }
        }
        _ => AudiomarkError::CorruptContainer { reason: message },
    }
}

fn map_write_error(e: hound::Error) -> AudiomarkError {
    match e {
        hound::Error::IoError(io) => AudiomarkError::Io(io),
        other => AudiomarkError::InvalidSamples {
            reason: format!("Failed to write samples: {}", other),
        },
    }
}

/// Reject containers that are well formed but outside the supported set
fn check_supported(info: &ContainerInfo) -> Result<()> {
    if info.effective_format != FORMAT_PCM {
        return Err(AudiomarkError::UnsupportedFormat {
            format: format!("format tag 0x{:04X} (only integer PCM supported)", info.effective_format),
        });
    }
    SampleRate::try_from(info.sample_rate)?;
    BitDepth::try_from(info.bits_per_sample)?;
    validate_channels(info.channels)?;
    Ok(())
}

/// Read the container header without decoding samples
pub fn inspect(bytes: &[u8]) -> Result<ContainerInfo> {
    riff::scan(bytes)
}

/// Decode a WAV byte blob into a PCM buffer
///
/// # Errors
/// * `CorruptContainer` - magic, chunk sizes or fmt fields are inconsistent
/// * `UnsupportedFormat` - valid container with an unsupported rate, depth,
///   channel count or sample encoding
pub fn decode(bytes: &[u8]) -> Result<PcmBuffer> {
    let info = riff::scan(bytes)?;
    check_supported(&info)?;

    let reader = WavReader::new(Cursor::new(bytes)).map_err(map_read_error)?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int {
        return Err(AudiomarkError::UnsupportedFormat {
            format: "floating point samples (only integer PCM supported)".to_string(),
        });
    }

    let samples = reader
        .into_samples::<i32>()
        .collect::<std::result::Result<Vec<i32>, _>>()
        .map_err(map_read_error)?;

    let buffer = PcmBuffer::new(spec.sample_rate, spec.bits_per_sample, spec.channels, samples)?;
    debug!(
        frames = buffer.frame_count(),
        channels = buffer.channel_count(),
        sample_rate = buffer.sample_rate().hz(),
        bits = buffer.bit_depth().bits(),
        "decoded WAV container"
    );
    Ok(buffer)
}

/// Encode a PCM buffer as a WAV byte blob
///
/// Chunk sizes are recomputed for the buffer's frame count, so
/// `decode(&encode(b)?)? == b` for every valid buffer.
pub fn encode(buffer: &PcmBuffer) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: buffer.channel_count(),
        sample_rate: buffer.sample_rate().hz(),
        bits_per_sample: buffer.bit_depth().bits(),
        sample_format: SampleFormat::Int,
    };

    let payload_len = buffer.samples().len() * buffer.bit_depth().bytes() as usize;
    let mut cursor = Cursor::new(Vec::with_capacity(payload_len + 80));
    {
        let mut writer = WavWriter::new(&mut cursor, spec).map_err(map_write_error)?;
        for &sample in buffer.samples() {
            writer.write_sample(sample).map_err(map_write_error)?;
        }
        writer.finalize().map_err(map_write_error)?;
    }

    let bytes = cursor.into_inner();
    debug!(
        frames = buffer.frame_count(),
        bytes = bytes.len(),
        "encoded WAV container"
    );
    Ok(bytes)
}

/// Read and decode a WAV file from disk
pub fn read_file(path: &Path) -> Result<PcmBuffer> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Encode a buffer and write it to disk
pub fn write_file(path: &Path, buffer: &PcmBuffer) -> Result<()> {
    let bytes = encode(buffer)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
