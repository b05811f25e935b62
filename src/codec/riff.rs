//! RIFF/WAVE structure scan
//!
//! hound decodes the sample payload but is lenient about chunk bookkeeping.
//! This scan walks the chunk list first so that size fields that disagree
//! with the blob length, or fmt fields that disagree with each other, are
//! reported as corrupt before any sample is read.

use serde::Serialize;

use crate::error::{AudiomarkError, Result};

const RIFF_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const MIN_FMT_LEN: usize = 16;
const EXTENSIBLE_FMT_LEN: usize = 40;

/// WAVE_FORMAT_PCM
pub const FORMAT_PCM: u16 = 0x0001;
/// WAVE_FORMAT_EXTENSIBLE
pub const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Header fields of a WAV container, read without decoding samples
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    /// Format tag as written in the fmt chunk
    pub format_tag: u16,
    /// Effective format (sub-format for WAVE_FORMAT_EXTENSIBLE)
    pub effective_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Length of the data chunk payload in bytes
    pub data_len: usize,
}

impl ContainerInfo {
    /// Number of frames in the data chunk
    pub fn frame_count(&self) -> usize {
        self.data_len / self.block_align as usize
    }
}

fn corrupt(reason: impl Into<String>) -> AudiomarkError {
    AudiomarkError::CorruptContainer {
        reason: reason.into(),
    }
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

struct FmtFields {
    format_tag: u16,
    effective_format: u16,
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

fn parse_fmt(body: &[u8]) -> Result<FmtFields> {
    if body.len() < MIN_FMT_LEN {
        return Err(corrupt(format!("fmt chunk is {} bytes, expected at least {}", body.len(), MIN_FMT_LEN)));
    }

    let format_tag = read_u16(body, 0);
    let effective_format = if format_tag == FORMAT_EXTENSIBLE {
        if body.len() < EXTENSIBLE_FMT_LEN {
            return Err(corrupt("WAVE_FORMAT_EXTENSIBLE fmt chunk is too short"));
        }
        // First two bytes of the sub-format GUID carry the format code
        read_u16(body, 24)
    } else {
        format_tag
    };

    Ok(FmtFields {
        format_tag,
        effective_format,
        channels: read_u16(body, 2),
        sample_rate: read_u32(body, 4),
        byte_rate: read_u32(body, 8),
        block_align: read_u16(body, 12),
        bits_per_sample: read_u16(body, 14),
    })
}

fn check_fmt_consistency(fmt: &FmtFields) -> Result<()> {
    if fmt.channels == 0 {
        return Err(corrupt("fmt chunk declares zero channels"));
    }
    if fmt.bits_per_sample == 0 {
        return Err(corrupt("fmt chunk declares zero bits per sample"));
    }
    if fmt.sample_rate == 0 {
        return Err(corrupt("fmt chunk declares a zero sample rate"));
    }

    let bytes_per_sample = (fmt.bits_per_sample as u32 + 7) / 8;
    let expected_align = fmt.channels as u32 * bytes_per_sample;
    if fmt.block_align as u32 != expected_align {
        return Err(corrupt(format!(
            "block_align {} does not match {} channels x {} bytes",
            fmt.block_align, fmt.channels, bytes_per_sample
        )));
    }

    let expected_rate = fmt.sample_rate as u64 * fmt.block_align as u64;
    if fmt.byte_rate as u64 != expected_rate {
        return Err(corrupt(format!(
            "byte_rate {} does not match sample_rate x block_align = {}",
            fmt.byte_rate, expected_rate
        )));
    }

    Ok(())
}

/// Walk the chunk list and validate the container structure
///
/// Only structural problems are reported here (`CorruptContainer`); whether
/// the declared format is one we support is decided by the caller.
pub fn scan(bytes: &[u8]) -> Result<ContainerInfo> {
    if bytes.len() < RIFF_HEADER_LEN {
        return Err(corrupt(format!("{} bytes is too short for a RIFF header", bytes.len())));
    }
    if &bytes[0..4] != b"RIFF" {
        return Err(corrupt("missing RIFF magic"));
    }
    if &bytes[8..12] != b"WAVE" {
        return Err(corrupt("missing WAVE form type"));
    }

    let riff_size = read_u32(bytes, 4) as usize;
    let riff_end = riff_size
        .checked_add(CHUNK_HEADER_LEN)
        .filter(|&end| end <= bytes.len() && end >= RIFF_HEADER_LEN)
        .ok_or_else(|| {
            corrupt(format!(
                "RIFF size {} is inconsistent with {} available bytes",
                riff_size,
                bytes.len()
            ))
        })?;

    let mut fmt: Option<FmtFields> = None;
    let mut data_len: Option<usize> = None;
    let mut pos = RIFF_HEADER_LEN;

    while pos < riff_end {
        if riff_end - pos < CHUNK_HEADER_LEN {
            return Err(corrupt(format!("truncated chunk header at offset {}", pos)));
        }

        let id = &bytes[pos..pos + 4];
        let size = read_u32(bytes, pos + 4) as usize;
        let body_start = pos + CHUNK_HEADER_LEN;
        let body_end = body_start
            .checked_add(size)
            .filter(|&end| end <= riff_end)
            .ok_or_else(|| {
                corrupt(format!(
                    "chunk '{}' at offset {} declares {} bytes but only {} remain",
                    String::from_utf8_lossy(id),
                    pos,
                    size,
                    riff_end - body_start
                ))
            })?;

        match id {
            b"fmt " => {
                if fmt.is_some() {
                    return Err(corrupt("duplicate fmt chunk"));
                }
                let fields = parse_fmt(&bytes[body_start..body_end])?;
                check_fmt_consistency(&fields)?;
                fmt = Some(fields);
            }
            b"data" => {
                let fields = fmt
                    .as_ref()
                    .ok_or_else(|| corrupt("data chunk appears before fmt chunk"))?;
                if data_len.is_some() {
                    return Err(corrupt("duplicate data chunk"));
                }
                if size % fields.block_align as usize != 0 {
                    return Err(corrupt(format!(
                        "data length {} is not a whole number of {}-byte frames",
                        size, fields.block_align
                    )));
                }
                data_len = Some(size);
            }
            _ => {}
        }

        // Chunks are word aligned; a missing pad byte on the final chunk is tolerated
        pos = (body_end + (size & 1)).min(riff_end);
    }

    let fmt = fmt.ok_or_else(|| corrupt("missing fmt chunk"))?;
    let data_len = data_len.ok_or_else(|| corrupt("missing data chunk"))?;

    Ok(ContainerInfo {
        format_tag: fmt.format_tag,
        effective_format: fmt.effective_format,
        channels: fmt.channels,
        sample_rate: fmt.sample_rate,
        byte_rate: fmt.byte_rate,
        block_align: fmt.block_align,
        bits_per_sample: fmt.bits_per_sample,
        data_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal canonical 44-byte header followed by `data`
    fn canonical(channels: u16, rate: u32, bits: u16, data: &[u8]) -> Vec<u8> {
        let block_align = channels * bits / 8;
        let mut buf = Vec::new();
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
        buf.extend_from_slice(b"WAVE");
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&FORMAT_PCM.to_le_bytes());
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&rate.to_le_bytes());
        buf.extend_from_slice(&(rate * block_align as u32).to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
        buf.extend_from_slice(data);
        buf
    }

    fn pcm_fmt(channels: u16, rate: u32, bits: u16) -> Vec<u8> {
        let block_align = channels * bits / 8;
        let mut body = Vec::new();
        body.extend_from_slice(&FORMAT_PCM.to_le_bytes());
        body.extend_from_slice(&channels.to_le_bytes());
        body.extend_from_slice(&rate.to_le_bytes());
        body.extend_from_slice(&(rate * block_align as u32).to_le_bytes());
        body.extend_from_slice(&block_align.to_le_bytes());
        body.extend_from_slice(&bits.to_le_bytes());
        body
    }

    /// RIFF/WAVE blob holding `chunks` in the given order
    fn riff(chunks: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
        let mut body = b"WAVE".to_vec();
        for (id, data) in chunks {
            body.extend_from_slice(*id);
            body.extend_from_slice(&(data.len() as u32).to_le_bytes());
            body.extend_from_slice(data);
            if data.len() % 2 == 1 {
                body.push(0);
            }
        }
        let mut bytes = b"RIFF".to_vec();
        bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&body);
        bytes
    }

    fn corrupt_reason(bytes: &[u8]) -> String {
        match scan(bytes) {
            Err(AudiomarkError::CorruptContainer { reason }) => reason,
            other => panic!("expected CorruptContainer, got {:?}", other),
        }
    }

    #[test]
    fn test_chunk_builder_matches_canonical() {
        let built = riff(&[(b"fmt ", pcm_fmt(2, 44100, 16)), (b"data", vec![0u8; 8])]);
        assert_eq!(built, canonical(2, 44100, 16, &[0u8; 8]));
    }

    #[test]
    fn test_data_before_fmt() {
        let bytes = riff(&[(b"data", vec![0u8; 4]), (b"fmt ", pcm_fmt(1, 44100, 16))]);
        assert!(corrupt_reason(&bytes).contains("before fmt"));
    }

    #[test]
    fn test_duplicate_fmt() {
        let bytes = riff(&[
            (b"fmt ", pcm_fmt(1, 44100, 16)),
            (b"fmt ", pcm_fmt(2, 48000, 16)),
            (b"data", vec![0u8; 4]),
        ]);
        assert!(corrupt_reason(&bytes).contains("duplicate fmt"));
    }

    #[test]
    fn test_duplicate_data() {
        let bytes = riff(&[
            (b"fmt ", pcm_fmt(1, 44100, 16)),
            (b"data", vec![0u8; 4]),
            (b"data", vec![0u8; 2]),
        ]);
        assert!(corrupt_reason(&bytes).contains("duplicate data"));
    }

    #[test]
    fn test_missing_chunks() {
        let no_data = riff(&[(b"fmt ", pcm_fmt(1, 44100, 16))]);
        assert!(corrupt_reason(&no_data).contains("missing data"));

        let no_fmt = riff(&[(b"LIST", vec![1, 2])]);
        assert!(corrupt_reason(&no_fmt).contains("missing fmt"));
    }

    #[test]
    fn test_extensible_fmt() {
        let mut fmt = pcm_fmt(2, 48000, 24);
        fmt[0..2].copy_from_slice(&FORMAT_EXTENSIBLE.to_le_bytes());
        fmt.extend_from_slice(&22u16.to_le_bytes()); // cbSize
        fmt.extend_from_slice(&24u16.to_le_bytes()); // valid bits
        fmt.extend_from_slice(&3u32.to_le_bytes()); // channel mask
        let mut guid = [0u8; 16];
        guid[0..2].copy_from_slice(&FORMAT_PCM.to_le_bytes());
        fmt.extend_from_slice(&guid);
        assert_eq!(fmt.len(), EXTENSIBLE_FMT_LEN);

        let info = scan(&riff(&[(b"fmt ", fmt.clone()), (b"data", vec![0u8; 12])])).unwrap();
        assert_eq!(info.format_tag, FORMAT_EXTENSIBLE);
        assert_eq!(info.effective_format, FORMAT_PCM);
        assert_eq!(info.frame_count(), 2);

        // cbSize only, no extension fields
        fmt.truncate(18);
        let bytes = riff(&[(b"fmt ", fmt), (b"data", vec![0u8; 12])]);
        assert!(corrupt_reason(&bytes).contains("EXTENSIBLE"));
    }

    #[test]
    fn test_scan_canonical() {
        let bytes = canonical(2, 44100, 16, &[0u8; 16]);
        let info = scan(&bytes).unwrap();
        assert_eq!(info.channels, 2);
        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.block_align, 4);
        assert_eq!(info.frame_count(), 4);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = canonical(1, 44100, 16, &[0u8; 4]);
        bytes[0] = b'X';
        assert!(matches!(scan(&bytes), Err(AudiomarkError::CorruptContainer { .. })));
    }

    #[test]
    fn test_truncated_data_chunk() {
        let mut bytes = canonical(1, 44100, 16, &[0u8; 8]);
        bytes.truncate(bytes.len() - 2);
        assert!(matches!(scan(&bytes), Err(AudiomarkError::CorruptContainer { .. })));
    }

    #[test]
    fn test_inconsistent_byte_rate() {
        let mut bytes = canonical(1, 44100, 16, &[0u8; 4]);
        bytes[28..32].copy_from_slice(&1234u32.to_le_bytes());
        assert!(matches!(scan(&bytes), Err(AudiomarkError::CorruptContainer { .. })));
    }

    #[test]
    fn test_odd_data_length() {
        // Data chunk with 3 bytes cannot hold whole 16-bit frames
        let mut bytes = canonical(1, 44100, 16, &[0u8; 3]);
        bytes.push(0); // pad byte
        let riff_size = (bytes.len() - 8) as u32;
        bytes[4..8].copy_from_slice(&riff_size.to_le_bytes());
        assert!(matches!(scan(&bytes), Err(AudiomarkError::CorruptContainer { .. })));
    }

    #[test]
    fn test_skips_unknown_chunks() {
        let mut bytes = canonical(1, 48000, 16, &[0u8; 4]);
        // Append a LIST chunk with an odd length and its pad byte
        bytes.extend_from_slice(b"LIST");
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2, 3, 0]);
        let riff_size = (bytes.len() - 8) as u32;
        bytes[4..8].copy_from_slice(&riff_size.to_le_bytes());

        let info = scan(&bytes).unwrap();
        assert_eq!(info.data_len, 4);
    }
}
