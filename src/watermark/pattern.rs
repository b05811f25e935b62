//! Watermark bit patterns

use serde::{Deserialize, Serialize};

use crate::error::{AudiomarkError, Result};

/// Level used for a `true` bit in the stock patterns
pub const DEFAULT_HIGH_DB: f64 = -90.0;
/// Level used for a `false` bit in the stock patterns
pub const DEFAULT_LOW_DB: f64 = -99.0;

const SIXTEEN_FRAME_BITS: &str = "1011001010110100";
const TEN_FRAME_BITS: &str = "1001000000";

/// Ordered bit sequence plus the pair of dB levels that encode it
///
/// Two patterns are equal only when both the bits and the dB pair match.
/// Fields missing from a deserialized pattern fall back to the 16-frame
/// pattern's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkPattern {
    bits: Vec<bool>,
    high_db: f64,
    low_db: f64,
}

impl WatermarkPattern {
    /// Create a validated pattern
    pub fn new(bits: Vec<bool>, high_db: f64, low_db: f64) -> Result<Self> {
        let pattern = Self {
            bits,
            high_db,
            low_db,
        };
        pattern.validate()?;
        Ok(pattern)
    }

    /// Parse a pattern from a string of `0`/`1` characters
    ///
    /// Whitespace and `_` separators are ignored, so `"1001_0000 00"` is
    /// accepted.
    pub fn from_bit_str(bits: &str, high_db: f64, low_db: f64) -> Result<Self> {
        let parsed = bits
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .map(|c| match c {
                '1' => Ok(true),
                '0' => Ok(false),
                other => Err(AudiomarkError::InvalidBitPattern {
                    reason: format!("unexpected character '{}' in bit string", other),
                }),
            })
            .collect::<Result<Vec<bool>>>()?;
        Self::new(parsed, high_db, low_db)
    }

    /// Recover a pattern from a per-frame dB level sequence
    ///
    /// A level at or above `high_db` reads as `true`; anything quieter reads
    /// as `false`. Intermediate levels such as -92 dB quantize to the LOW
    /// amplitude at 16-bit, so they are not rounded up to HIGH.
    pub fn from_db_levels(levels: &[f64], high_db: f64, low_db: f64) -> Result<Self> {
        if let Some(bad) = levels.iter().find(|db| !db.is_finite() || **db > 0.0) {
            return Err(AudiomarkError::InvalidBitPattern {
                reason: format!("level {} dB is not a finite value at or below 0 dBFS", bad),
            });
        }
        let bits = levels.iter().map(|&db| db >= high_db).collect();
        Self::new(bits, high_db, low_db)
    }

    /// The 16-frame pattern used by the upload service
    pub fn sixteen_frame() -> Self {
        Self::stock(SIXTEEN_FRAME_BITS)
    }

    /// The earlier 10-frame pattern
    pub fn ten_frame() -> Self {
        Self::stock(TEN_FRAME_BITS)
    }

    fn stock(bits: &str) -> Self {
        Self {
            bits: bits.chars().map(|c| c == '1').collect(),
            high_db: DEFAULT_HIGH_DB,
            low_db: DEFAULT_LOW_DB,
        }
    }

    /// The bit sequence
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of marker frames this pattern occupies
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Level for a `true` bit
    pub fn high_db(&self) -> f64 {
        self.high_db
    }

    /// Level for a `false` bit
    pub fn low_db(&self) -> f64 {
        self.low_db
    }

    /// Level used to encode `bit`
    pub fn db_for(&self, bit: bool) -> f64 {
        if bit {
            self.high_db
        } else {
            self.low_db
        }
    }

    /// Render the bits as a `0`/`1` string
    pub fn bit_string(&self) -> String {
        bits_to_string(&self.bits)
    }

    /// Check the pattern is usable
    ///
    /// Rejects an empty bit sequence, non-finite levels, levels above full
    /// scale and a HIGH level that is not strictly above LOW.
    pub fn validate(&self) -> Result<()> {
        if self.bits.is_empty() {
            return Err(AudiomarkError::InvalidBitPattern {
                reason: "pattern has no bits".to_string(),
            });
        }
        if !self.high_db.is_finite() || !self.low_db.is_finite() {
            return Err(AudiomarkError::InvalidBitPattern {
                reason: format!("dB levels must be finite (high {}, low {})", self.high_db, self.low_db),
            });
        }
        if self.high_db > 0.0 || self.low_db > 0.0 {
            return Err(AudiomarkError::InvalidBitPattern {
                reason: "dB levels must not exceed 0 dBFS".to_string(),
            });
        }
        if self.high_db <= self.low_db {
            return Err(AudiomarkError::InvalidBitPattern {
                reason: format!(
                    "high level {} dB must be above low level {} dB",
                    self.high_db, self.low_db
                ),
            });
        }
        Ok(())
    }
}

impl Default for WatermarkPattern {
    fn default() -> Self {
        Self::sixteen_frame()
    }
}

/// Render a bit slice as a `0`/`1` string
pub fn bits_to_string(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_patterns() {
        let sixteen = WatermarkPattern::sixteen_frame();
        assert_eq!(sixteen.len(), 16);
        assert_eq!(sixteen.bit_string(), "1011001010110100");
        assert!(sixteen.validate().is_ok());

        let ten = WatermarkPattern::ten_frame();
        assert_eq!(ten.len(), 10);
        assert_eq!(&ten.bits()[0..4], &[true, false, false, true]);
        assert_eq!(WatermarkPattern::default(), sixteen);
    }

    #[test]
    fn test_from_bit_str() {
        let pattern = WatermarkPattern::from_bit_str("1001_0000 00", -90.0, -99.0).unwrap();
        assert_eq!(pattern, WatermarkPattern::ten_frame());

        let bad = WatermarkPattern::from_bit_str("10x1", -90.0, -99.0);
        assert!(matches!(bad, Err(AudiomarkError::InvalidBitPattern { .. })));
    }

    #[test]
    fn test_from_db_levels() {
        let upload_levels = [
            -90.0, -99.0, -90.0, -90.0, -99.0, -99.0, -90.0, -99.0, -90.0, -99.0, -90.0, -90.0, -99.0,
            -90.0, -99.0, -99.0,
        ];
        let pattern = WatermarkPattern::from_db_levels(&upload_levels, -90.0, -99.0).unwrap();
        assert_eq!(pattern, WatermarkPattern::sixteen_frame());

        // Levels between the pair stay LOW
        let ten_levels = [-90.0, -98.0, -95.0, -90.0, -92.0, -92.0, -94.0, -99.0, -92.0, -91.0];
        let pattern = WatermarkPattern::from_db_levels(&ten_levels, -90.0, -99.0).unwrap();
        assert_eq!(pattern.bit_string(), "1001000000");
        assert_eq!(pattern, WatermarkPattern::ten_frame());

        assert!(WatermarkPattern::from_db_levels(&[], -90.0, -99.0).is_err());
        assert!(WatermarkPattern::from_db_levels(&[-90.0, f64::NAN], -90.0, -99.0).is_err());
        assert!(WatermarkPattern::from_db_levels(&[-90.0, 6.0], -90.0, -99.0).is_err());
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let result = WatermarkPattern::new(Vec::new(), -90.0, -99.0);
        assert!(matches!(result, Err(AudiomarkError::InvalidBitPattern { .. })));
    }

    #[test]
    fn test_level_ordering_rejected() {
        assert!(WatermarkPattern::new(vec![true], -99.0, -90.0).is_err());
        assert!(WatermarkPattern::new(vec![true], -90.0, -90.0).is_err());
        assert!(WatermarkPattern::new(vec![true], 3.0, -90.0).is_err());
        assert!(WatermarkPattern::new(vec![true], f64::NAN, -90.0).is_err());
    }

    #[test]
    fn test_identity_includes_levels() {
        let a = WatermarkPattern::from_bit_str("1001000000", -90.0, -99.0).unwrap();
        let b = WatermarkPattern::from_bit_str("1001000000", -90.0, -98.0).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_serde_round_trip() {
        let pattern = WatermarkPattern::ten_frame();
        let json = serde_json::to_string(&pattern).unwrap();
        let back: WatermarkPattern = serde_json::from_str(&json).unwrap();
        assert_eq!(pattern, back);
    }
}
