//! Classification statistics
//!
//! Counters accumulated by the decoder, one increment per frame. Only the decode
//! pass records into them; everything else sees a read-only view.

use crate::types::{RecordValue, ValueKind};
use serde::Serialize;

/// Code frames with at most this many significant bits are "narrow"
pub const CODE_NARROW_MAX_BITS: u8 = 8;

/// Point frames narrower than this many bytes are "narrow"
pub const POINT_WIDE_MIN_BYTES: u8 = 4;

/// Frame counters for one decode pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationStatistics {
    total_frames: u64,
    service_frames: u64,
    useful_frames: u64,
    unknown_type_frames: u64,
    count_by_kind: [u64; 4],
    point_narrow: u64,
    point_wide: u64,
    code_narrow: u64,
    code_wide: u64,
}

impl ClassificationStatistics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_service(&mut self) {
        self.total_frames += 1;
        self.service_frames += 1;
    }

    pub(crate) fn record_unknown_type(&mut self) {
        self.total_frames += 1;
        self.unknown_type_frames += 1;
    }

    /// Count a useful frame and classify its encoded width
    pub(crate) fn record_useful(&mut self, value: &RecordValue) {
        self.total_frames += 1;
        self.useful_frames += 1;
        self.count_by_kind[value.kind().index()] += 1;

        match *value {
            RecordValue::Code { width_bits, .. } => {
                if width_bits <= CODE_NARROW_MAX_BITS {
                    self.code_narrow += 1;
                } else {
                    self.code_wide += 1;
                }
            }
            RecordValue::Point { width_bytes, .. } => {
                if width_bytes < POINT_WIDE_MIN_BYTES {
                    self.point_narrow += 1;
                } else {
                    self.point_wide += 1;
                }
            }
            RecordValue::Long(_) | RecordValue::Double(_) => {}
        }
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn service_frames(&self) -> u64 {
        self.service_frames
    }

    pub fn useful_frames(&self) -> u64 {
        self.useful_frames
    }

    pub fn unknown_type_frames(&self) -> u64 {
        self.unknown_type_frames
    }

    /// Useful frame counts indexed by kind tag
    pub fn count_by_kind(&self) -> [u64; 4] {
        self.count_by_kind
    }

    pub fn count_for(&self, kind: ValueKind) -> u64 {
        self.count_by_kind[kind.index()]
    }

    /// Point frames encoded in fewer than 4 bytes
    pub fn point_narrow(&self) -> u64 {
        self.point_narrow
    }

    /// Point frames encoded in 4 bytes or more
    pub fn point_wide(&self) -> u64 {
        self.point_wide
    }

    /// Code frames with at most 8 significant bits
    pub fn code_narrow(&self) -> u64 {
        self.code_narrow
    }

    /// Code frames with more than 8 significant bits
    pub fn code_wide(&self) -> u64 {
        self.code_wide
    }

    /// Check the counter identities that every complete pass satisfies
    pub fn is_consistent(&self) -> bool {
        self.total_frames == self.service_frames + self.useful_frames + self.unknown_type_frames
            && self.useful_frames == self.count_by_kind.iter().sum::<u64>()
            && self.point_narrow + self.point_wide == self.count_for(ValueKind::Point)
            && self.code_narrow + self.code_wide == self.count_for(ValueKind::Code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(width_bits: u8) -> RecordValue {
        RecordValue::Code {
            value: 1,
            width_bits,
        }
    }

    fn point(width_bytes: u8) -> RecordValue {
        RecordValue::Point {
            value: 1.0,
            width_bytes,
        }
    }

    #[test]
    fn test_empty_statistics() {
        let stats = ClassificationStatistics::new();
        assert_eq!(stats.total_frames(), 0);
        assert_eq!(stats.count_by_kind(), [0; 4]);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_width_boundaries() {
        let mut stats = ClassificationStatistics::new();
        stats.record_useful(&code(8));
        stats.record_useful(&code(9));
        stats.record_useful(&point(3));
        stats.record_useful(&point(4));
        stats.record_useful(&point(8));

        assert_eq!(stats.code_narrow(), 1);
        assert_eq!(stats.code_wide(), 1);
        assert_eq!(stats.point_narrow(), 1);
        assert_eq!(stats.point_wide(), 2);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_mixed_frames() {
        let mut stats = ClassificationStatistics::new();
        stats.record_service();
        stats.record_unknown_type();
        stats.record_useful(&RecordValue::Long(1));
        stats.record_useful(&RecordValue::Double(1.0));

        assert_eq!(stats.total_frames(), 4);
        assert_eq!(stats.service_frames(), 1);
        assert_eq!(stats.unknown_type_frames(), 1);
        assert_eq!(stats.useful_frames(), 2);
        assert_eq!(stats.count_for(ValueKind::Double), 1);
        assert!(stats.is_consistent());
    }
}
