//! Core types for the TMI decoder library
//!
//! This module defines the fundamental types that the decoder emits when processing
//! capture files: the value kind tag, the decoded telemetry record and the error type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Value encoding family of a payload frame
///
/// The discriminants are the kind tags found in the capture and the indices
/// used by the per-kind statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueKind {
    /// Fixed-width signed integer
    Long = 0,
    /// Fixed-width IEEE-754 double
    Double = 1,
    /// Variable-width discrete code (enumerated parameters)
    Code = 2,
    /// Variable-width scaled continuous value
    Point = 3,
}

impl ValueKind {
    /// All kinds in tag order
    pub const ALL: [ValueKind; 4] = [
        ValueKind::Long,
        ValueKind::Double,
        ValueKind::Code,
        ValueKind::Point,
    ];

    /// Map a raw kind tag to a kind, `None` for unknown tags
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(ValueKind::Long),
            1 => Some(ValueKind::Double),
            2 => Some(ValueKind::Code),
            3 => Some(ValueKind::Point),
            _ => None,
        }
    }

    /// Position of this kind in per-kind arrays
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Long => write!(f, "Long"),
            ValueKind::Double => write!(f, "Double"),
            ValueKind::Code => write!(f, "Code"),
            ValueKind::Point => write!(f, "Point"),
        }
    }
}

/// Decoded payload of a useful frame
///
/// Values are stored losslessly relative to their kind. Code and Point also carry
/// the encoded width of this particular frame, used only for classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordValue {
    Long(i64),
    Double(f64),
    Code {
        value: u64,
        /// Significant bits declared by the frame
        width_bits: u8,
    },
    Point {
        value: f64,
        /// Encoded payload width in bytes
        width_bytes: u8,
    },
}

impl RecordValue {
    /// The kind this value was decoded as
    pub fn kind(&self) -> ValueKind {
        match self {
            RecordValue::Long(_) => ValueKind::Long,
            RecordValue::Double(_) => ValueKind::Double,
            RecordValue::Code { .. } => ValueKind::Code,
            RecordValue::Point { .. } => ValueKind::Point,
        }
    }

    /// Numeric value as f64 (lossy for large codes)
    pub fn as_f64(&self) -> f64 {
        match self {
            RecordValue::Long(v) => *v as f64,
            RecordValue::Double(v) => *v,
            RecordValue::Code { value, .. } => *value as f64,
            RecordValue::Point { value, .. } => *value,
        }
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordValue::Long(v) => write!(f, "{}", v),
            RecordValue::Double(v) => write!(f, "{}", v),
            RecordValue::Code { value, .. } => write!(f, "{}", value),
            RecordValue::Point { value, .. } => write!(f, "{}", value),
        }
    }
}

/// One decoded, useful frame
///
/// Created exactly once by the frame decoder and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    parameter_number: u16,
    timestamp: u32,
    dimension: u8,
    value: RecordValue,
}

impl TelemetryRecord {
    pub(crate) fn new(parameter_number: u16, timestamp: u32, dimension: u8, value: RecordValue) -> Self {
        Self {
            parameter_number,
            timestamp,
            dimension,
            value,
        }
    }

    /// Parameter number (key into the parameter catalog)
    pub fn parameter_number(&self) -> u16 {
        self.parameter_number
    }

    /// Raw timestamp in milliseconds since midnight
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Dimension code carried by the frame
    pub fn dimension(&self) -> u8 {
        self.dimension
    }

    /// Decoded value
    pub fn value(&self) -> &RecordValue {
        &self.value
    }

    /// Value kind, fixed at decode time
    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }
}

/// Errors that can occur during decoding
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Failed to read capture file {path:?}: {source}")]
    CaptureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed capture at byte {offset}: {reason}")]
    CaptureFormat { offset: u64, reason: String },

    #[error("Failed to load dimension table: {0}")]
    DimensionTable(String),

    #[error("Failed to load parameter catalog: {0}")]
    Catalog(String),

    #[error("Decode cancelled")]
    Cancelled,

    #[error("A decode is already in progress for this session")]
    DecodeInProgress,

    #[error("Decode worker terminated without reporting a result")]
    WorkerLost,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecoderError {
    pub(crate) fn format(offset: u64, reason: impl Into<String>) -> Self {
        DecoderError::CaptureFormat {
            offset,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        for kind in ValueKind::ALL {
            assert_eq!(ValueKind::from_tag(kind as u8), Some(kind));
        }
        assert_eq!(ValueKind::from_tag(4), None);
        assert_eq!(ValueKind::from_tag(0x7F), None);
        assert_eq!(ValueKind::Point.index(), 3);
    }

    #[test]
    fn test_record_kind_follows_value() {
        let record = TelemetryRecord::new(
            5,
            1000,
            0,
            RecordValue::Code {
                value: 2,
                width_bits: 6,
            },
        );
        assert_eq!(record.kind(), ValueKind::Code);
        assert_eq!(record.parameter_number(), 5);
        assert_eq!(record.value().as_f64(), 2.0);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(RecordValue::Long(-42).to_string(), "-42");
        assert_eq!(RecordValue::Double(2.5).to_string(), "2.5");
        assert_eq!(
            RecordValue::Point {
                value: 12.34,
                width_bytes: 2
            }
            .to_string(),
            "12.34"
        );
    }
}
