//! CLI Command Implementations
//!
//! Each command decodes its input, calls one library operation and writes
//! the result. The `--WM` / `--NWM` file naming lives here, not in the
//! library.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::analysis::AudioMetadata;
use crate::codec;
use crate::config::{EngineConfig, SegmentationConfig};
use crate::watermark;

/// Suffix for watermarked output files
pub const WATERMARKED_SUFFIX: &str = "--WM";
/// Suffix for files with the watermark removed
pub const UNWATERMARKED_SUFFIX: &str = "--NWM";

/// `dir/song.wav` + `--WM` -> `dir/song--WM.wav`
pub fn suffixed_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    let extension = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wav".to_string());
    input.with_file_name(format!("{}{}.{}", stem, suffix, extension))
}

/// Load the configuration file, or the defaults when none is given
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Prepend the watermark and write `<input>--WM.wav` (or `output`).
pub fn embed(config: &EngineConfig, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    info!("Embedding watermark into: {}", input.display());

    let buffer = codec::read_file(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let marked = watermark::embed(buffer, &config.watermark)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| suffixed_path(input, WATERMARKED_SUFFIX));
    codec::write_file(&output, &marked).with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Watermarked: {}", output.display());
    Ok(output)
}

/// Verify and strip the watermark and write `<input>--NWM.wav` (or `output`).
pub fn strip(config: &EngineConfig, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    info!("Removing watermark from: {}", input.display());

    let buffer = codec::read_file(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let clean = watermark::detect_and_strip(buffer, &config.watermark)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| suffixed_path(input, UNWATERMARKED_SUFFIX));
    codec::write_file(&output, &clean).with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Watermark removed: {}", output.display());
    Ok(output)
}

/// Print whether the input carries the configured watermark.
pub fn check(config: &EngineConfig, input: &Path) -> Result<bool> {
    info!("Checking watermark in: {}", input.display());

    let buffer = codec::read_file(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let detection = watermark::detect(&buffer, &config.watermark)?;

    println!("Expected: {}", watermark::bits_to_string(&detection.expected));
    println!("Observed: {}", watermark::bits_to_string(&detection.observed));
    if detection.is_match() {
        println!("Watermark present");
    } else {
        println!(
            "Watermark not found ({} of {} bits differ)",
            detection.hamming_distance(),
            detection.expected.len()
        );
    }
    Ok(detection.is_match())
}

/// Build the metadata document and print or save it.
pub fn segment(
    config: &EngineConfig,
    input: &Path,
    output: Option<&Path>,
    legacy_bands: bool,
) -> Result<AudioMetadata> {
    info!("Segmenting: {}", input.display());

    let buffer = codec::read_file(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let settings = if legacy_bands {
        SegmentationConfig {
            bands: SegmentationConfig::legacy().bands,
            ..config.segmentation.clone()
        }
    } else {
        config.segmentation.clone()
    };

    let metadata = AudioMetadata::build(&buffer, &settings)?;
    let json = metadata.to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Metadata written: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(metadata)
}

/// Print the container header.
pub fn info(input: &Path) -> Result<()> {
    let bytes = std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let header = codec::inspect(&bytes)?;

    println!("Format tag: 0x{:04X}", header.format_tag);
    println!("Channels: {}", header.channels);
    println!("Sample rate: {} Hz", header.sample_rate);
    println!("Bits per sample: {}", header.bits_per_sample);
    println!("Frames: {}", header.frame_count());
    Ok(())
}

/// Print the effective configuration.
pub fn print_config(config: &EngineConfig) -> Result<()> {
    println!("{}", config.to_json_pretty()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::PcmBuffer;
    use crate::AudiomarkError;
    use tempfile::tempdir;

    #[test]
    fn test_suffixed_path() {
        assert_eq!(
            suffixed_path(Path::new("/tmp/song.wav"), WATERMARKED_SUFFIX),
            PathBuf::from("/tmp/song--WM.wav")
        );
        assert_eq!(
            suffixed_path(Path::new("take.2.WAV"), UNWATERMARKED_SUFFIX),
            PathBuf::from("take.2--NWM.WAV")
        );
    }

    #[test]
    fn test_embed_then_strip_files() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("song.wav");
        let original = PcmBuffer::new(44100, 16, 2, (0..400).map(|i| i * 7 - 1400).collect()).unwrap();
        codec::write_file(&input, &original).unwrap();

        let config = EngineConfig::default();
        let marked = embed(&config, &input, None).unwrap();
        assert_eq!(marked, dir.path().join("song--WM.wav"));
        assert!(check(&config, &marked).unwrap());
        assert!(!check(&config, &input).unwrap());

        let clean = strip(&config, &marked, None).unwrap();
        assert_eq!(clean, dir.path().join("song--WM--NWM.wav"));
        assert_eq!(codec::read_file(&clean).unwrap(), original);
    }

    #[test]
    fn test_strip_unmarked_reports_not_found() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("plain.wav");
        codec::write_file(&input, &PcmBuffer::new(48000, 16, 1, vec![500; 64]).unwrap()).unwrap();

        let err = strip(&EngineConfig::default(), &input, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AudiomarkError>(),
            Some(AudiomarkError::WatermarkNotFound { .. })
        ));
        assert!(!dir.path().join("plain--NWM.wav").exists());
    }

    #[test]
    fn test_load_config_default() {
        assert_eq!(load_config(None).unwrap(), EngineConfig::default());
        assert!(load_config(Some(Path::new("missing-config.json"))).is_err());
    }
}
