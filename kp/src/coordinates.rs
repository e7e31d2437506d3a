//! Coordinate message generation and encoding

use std::io;

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building a coordinate message
#[derive(Debug, Error)]
pub enum CoordinateError {
    #[error("Invalid coordinate range [{min}, {max}): bounds and width must be finite with min < max")]
    InvalidRange { min: f64, max: f64 },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Encoded message is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Half-open range `[min, max)` coordinates are drawn from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateRange {
    min: f64,
    max: f64,
}

impl CoordinateRange {
    pub fn new(min: f64, max: f64) -> Result<Self, CoordinateError> {
        // random_range needs max - min to be finite too
        if !min.is_finite() || !max.is_finite() || min >= max || !(max - min).is_finite() {
            return Err(CoordinateError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }
}

impl Default for CoordinateRange {
    fn default() -> Self {
        Self {
            min: crate::DEFAULT_MIN,
            max: crate::DEFAULT_MAX,
        }
    }
}

/// The message published once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMessage {
    pub coordinates: [f64; 2],

    /// Label of what was detected at the coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
}

impl CoordinateMessage {
    /// Attach a prediction label; blank labels are dropped
    pub fn with_prediction(mut self, prediction: Option<&str>) -> Self {
        self.prediction = prediction.map(str::trim).filter(|p| !p.is_empty()).map(String::from);
        self
    }

    /// Encode as `{"coordinates": [x, y]}` or `{"coordinates": [x, y], "prediction": "label"}`
    ///
    /// Uses `": "` after keys and `", "` between elements.
    pub fn to_json(&self) -> Result<String, CoordinateError> {
        let mut buf = Vec::with_capacity(64);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8(buf)?)
    }
}

/// Compact JSON with a space after `:` and `,`
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Draws coordinate pairs from a ChaCha8 stream
///
/// ChaCha8 is named explicitly so a given seed yields the same pair on every
/// platform and `rand` upgrade.
#[derive(Debug, Clone)]
pub struct CoordinateGenerator {
    rng: ChaCha8Rng,
    range: CoordinateRange,
}

impl CoordinateGenerator {
    pub fn seeded(seed: u64, range: CoordinateRange) -> Self {
        debug!("CoordinateGenerator::seeded: seed={}", seed);
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            range,
        }
    }

    /// Seed from the thread RNG (non-reproducible)
    pub fn from_entropy(range: CoordinateRange) -> Self {
        debug!("CoordinateGenerator::from_entropy: called");
        Self {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
            range,
        }
    }

    /// Draw x, then y
    pub fn next_message(&mut self) -> CoordinateMessage {
        let x = self.rng.random_range(self.range.min..self.range.max);
        let y = self.rng.random_range(self.range.min..self.range.max);
        CoordinateMessage {
            coordinates: [x, y],
            prediction: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_same_seed_same_pair() {
        let mut a = CoordinateGenerator::seeded(1, CoordinateRange::default());
        let mut b = CoordinateGenerator::seeded(1, CoordinateRange::default());
        assert_eq!(a.next_message(), b.next_message());
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = CoordinateGenerator::seeded(1, CoordinateRange::default());
        let mut b = CoordinateGenerator::seeded(2, CoordinateRange::default());
        assert_ne!(a.next_message(), b.next_message());
    }

    #[test]
    fn test_x_and_y_are_independent_draws() {
        let mut generator = CoordinateGenerator::seeded(1, CoordinateRange::default());
        let msg = generator.next_message();
        assert_ne!(msg.coordinates[0], msg.coordinates[1]);
    }

    #[test]
    fn test_range_rejects_empty_and_non_finite() {
        assert!(CoordinateRange::new(0.0, 50.0).is_ok());
        assert!(CoordinateRange::new(5.0, 5.0).is_err());
        assert!(CoordinateRange::new(10.0, 5.0).is_err());
        assert!(CoordinateRange::new(f64::NAN, 5.0).is_err());
        assert!(CoordinateRange::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_range_rejects_overflowing_width() {
        assert!(CoordinateRange::new(-1.0e308, 1.0e308).is_err());
        assert!(CoordinateRange::new(-f64::MAX, 0.0).is_ok());
        assert!(CoordinateRange::new(-f64::MAX, f64::MAX).is_err());
    }

    #[test]
    fn test_invalid_range_message() {
        let err = CoordinateRange::new(3.0, 1.0).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("[3, 1)"));
        assert!(msg.contains("min < max"));
    }

    #[test]
    fn test_range_contains_is_half_open() {
        let range = CoordinateRange::default();
        assert!(range.contains(0.0));
        assert!(range.contains(49.999));
        assert!(!range.contains(50.0));
        assert!(!range.contains(-0.1));
    }

    #[test]
    fn test_to_json_spaced_layout() {
        let msg = CoordinateMessage {
            coordinates: [6.5, 42.25],
            prediction: None,
        };
        assert_eq!(msg.to_json().unwrap(), r#"{"coordinates": [6.5, 42.25]}"#);
    }

    #[test]
    fn test_to_json_with_prediction() {
        let msg = CoordinateMessage {
            coordinates: [6.5, 42.25],
            prediction: None,
        }
        .with_prediction(Some("desk"));
        assert_eq!(
            msg.to_json().unwrap(),
            r#"{"coordinates": [6.5, 42.25], "prediction": "desk"}"#
        );
    }

    #[test]
    fn test_blank_prediction_is_dropped() {
        let mut generator = CoordinateGenerator::seeded(1, CoordinateRange::default());
        let msg = generator.next_message().with_prediction(Some("  "));
        assert_eq!(msg.prediction, None);
        assert!(!msg.to_json().unwrap().contains("prediction"));
    }

    #[test]
    fn test_to_json_single_key_two_numbers() {
        let mut generator = CoordinateGenerator::seeded(1, CoordinateRange::default());
        let json = generator.next_message().to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        let pair = obj["coordinates"].as_array().unwrap();
        assert_eq!(pair.len(), 2);
        assert!(pair.iter().all(|v| v.is_f64()));
    }

    #[test]
    fn test_to_json_parses_back() {
        let mut generator = CoordinateGenerator::seeded(7, CoordinateRange::default());
        let msg = generator.next_message();
        let parsed: CoordinateMessage = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert!((parsed.coordinates[0] - msg.coordinates[0]).abs() < 1e-12);
        assert!((parsed.coordinates[1] - msg.coordinates[1]).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_values_stay_in_default_range(seed in any::<u64>()) {
            let range = CoordinateRange::default();
            let msg = CoordinateGenerator::seeded(seed, range).next_message();
            prop_assert!(range.contains(msg.coordinates[0]));
            prop_assert!(range.contains(msg.coordinates[1]));
        }

        #[test]
        fn prop_values_stay_in_custom_range(seed in any::<u64>(), min in -1.0e6f64..1.0e6, width in 1.0e-3f64..1.0e6) {
            let range = CoordinateRange::new(min, min + width).unwrap();
            let msg = CoordinateGenerator::seeded(seed, range).next_message();
            prop_assert!(range.contains(msg.coordinates[0]));
            prop_assert!(range.contains(msg.coordinates[1]));
        }
    }
}
