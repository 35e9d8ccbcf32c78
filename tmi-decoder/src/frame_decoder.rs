//! Frame Decoding Engine
//!
//! Turns the raw frame stream of a capture into telemetry records, classification
//! statistics and the per-parameter record index, in a single forward pass.

use crate::config::DecoderConfig;
use crate::formats::{FrameClass, RawFrame};
use crate::index::RecordIndex;
use crate::metadata::ParameterCatalog;
use crate::statistics::ClassificationStatistics;
use crate::types::{DecoderError, RecordValue, Result, TelemetryRecord, ValueKind};
use byteorder::{ByteOrder, LittleEndian};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const LONG_WIDTH: usize = 4;
const DOUBLE_WIDTH: usize = 8;
const MAX_VARIABLE_WIDTH: usize = 8;

/// Result of a complete decode pass
#[derive(Debug, Clone, Default)]
pub struct DecodeOutcome {
    pub index: RecordIndex,
    pub stats: ClassificationStatistics,
}

/// Cooperative cancellation flag, checked between frames
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Frame decoder - interprets payload frames
pub struct FrameDecoder;

impl FrameDecoder {
    /// Run a full decode pass over a frame stream
    ///
    /// Any error (including cancellation) aborts the pass; the partially built
    /// index and statistics are dropped with it.
    pub fn run<I>(
        frames: I,
        catalog: &ParameterCatalog,
        config: &DecoderConfig,
        cancel: &CancelFlag,
    ) -> Result<DecodeOutcome>
    where
        I: Iterator<Item = Result<RawFrame>>,
    {
        let mut stats = ClassificationStatistics::new();
        let mut index = RecordIndex::new();

        for frame in frames {
            if cancel.is_cancelled() {
                log::info!("Decode cancelled after {} frames", stats.total_frames());
                return Err(DecoderError::Cancelled);
            }

            let frame = frame?;

            match frame.header.class() {
                FrameClass::Service => stats.record_service(),
                FrameClass::UnknownKind(tag) => {
                    log::debug!(
                        "Frame at {} has unknown kind tag {}, skipping",
                        frame.offset,
                        tag
                    );
                    stats.record_unknown_type();
                }
                FrameClass::Payload(kind) => {
                    let record = Self::decode_record(&frame, kind)?;
                    stats.record_useful(record.value());
                    let name = catalog.name(u32::from(record.parameter_number()));
                    index.append(name, record);
                }
            }

            if config.should_report_progress(stats.total_frames()) {
                log::info!(
                    "Decoded {} frames ({} useful)",
                    stats.total_frames(),
                    stats.useful_frames()
                );
            }
        }

        log::info!(
            "Decode complete: {} frames, {} useful, {} parameters",
            stats.total_frames(),
            stats.useful_frames(),
            index.unique_parameter_count()
        );

        Ok(DecodeOutcome { index, stats })
    }

    /// Decode a payload frame of a known kind into a record
    pub fn decode_record(frame: &RawFrame, kind: ValueKind) -> Result<TelemetryRecord> {
        let header = &frame.header;
        let payload = frame.payload.as_slice();

        let value = match kind {
            ValueKind::Long => {
                Self::expect_width(frame, kind, LONG_WIDTH)?;
                RecordValue::Long(i64::from(LittleEndian::read_i32(payload)))
            }
            ValueKind::Double => {
                Self::expect_width(frame, kind, DOUBLE_WIDTH)?;
                RecordValue::Double(LittleEndian::read_f64(payload))
            }
            ValueKind::Code => Self::decode_code(frame)?,
            ValueKind::Point => Self::decode_point(frame)?,
        };

        Ok(TelemetryRecord::new(header.number, header.time, header.dim, value))
    }

    /// Code: 1..=8 byte unsigned payload, `aux` significant bits
    fn decode_code(frame: &RawFrame) -> Result<RecordValue> {
        let length = Self::variable_width(frame, ValueKind::Code)?;
        let width_bits = frame.header.aux;

        if width_bits == 0 || usize::from(width_bits) > length * 8 {
            return Err(DecoderError::format(
                frame.offset,
                format!(
                    "Code frame declares {} significant bits in a {}-byte payload",
                    width_bits, length
                ),
            ));
        }

        let raw = LittleEndian::read_uint(&frame.payload, length);
        let value = if width_bits >= 64 {
            raw
        } else {
            raw & ((1u64 << width_bits) - 1)
        };

        Ok(RecordValue::Code { value, width_bits })
    }

    /// Point: 1..=8 byte signed payload scaled by `10^aux`
    fn decode_point(frame: &RawFrame) -> Result<RecordValue> {
        let length = Self::variable_width(frame, ValueKind::Point)?;
        let exponent = frame.header.aux as i8;

        let raw = LittleEndian::read_int(&frame.payload, length) as f64;
        // Negative exponents divide by an exact power of ten
        let value = if exponent < 0 {
            raw / 10f64.powi(-i32::from(exponent))
        } else {
            raw * 10f64.powi(i32::from(exponent))
        };

        Ok(RecordValue::Point {
            value,
            width_bytes: length as u8,
        })
    }

    fn expect_width(frame: &RawFrame, kind: ValueKind, width: usize) -> Result<()> {
        if frame.payload.len() != width {
            return Err(DecoderError::format(
                frame.offset,
                format!(
                    "{} frame must carry {} payload bytes, found {}",
                    kind,
                    width,
                    frame.payload.len()
                ),
            ));
        }
        Ok(())
    }

    fn variable_width(frame: &RawFrame, kind: ValueKind) -> Result<usize> {
        let length = frame.payload.len();
        if length == 0 || length > MAX_VARIABLE_WIDTH {
            return Err(DecoderError::format(
                frame.offset,
                format!(
                    "{} frame payload must be 1..={} bytes, found {}",
                    kind, MAX_VARIABLE_WIDTH, length
                ),
            ));
        }
        Ok(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FrameHeader;

    fn frame(attr: u8, aux: u8, payload: Vec<u8>) -> RawFrame {
        RawFrame {
            offset: 0,
            header: FrameHeader {
                number: 9,
                attr,
                dim: 3,
                time: 1_000,
                aux,
                length: payload.len() as u16,
            },
            payload,
        }
    }

    fn decode(attr: u8, aux: u8, payload: Vec<u8>) -> Result<RecordValue> {
        let f = frame(attr, aux, payload);
        let kind = match f.header.class() {
            FrameClass::Payload(kind) => kind,
            other => panic!("not a payload frame: {:?}", other),
        };
        FrameDecoder::decode_record(&f, kind).map(|r| *r.value())
    }

    #[test]
    fn test_decode_long() {
        let value = decode(0, 0, (-5i32).to_le_bytes().to_vec()).unwrap();
        assert_eq!(value, RecordValue::Long(-5));
    }

    #[test]
    fn test_decode_double() {
        let value = decode(1, 0, 273.15f64.to_le_bytes().to_vec()).unwrap();
        assert_eq!(value, RecordValue::Double(273.15));
    }

    #[test]
    fn test_decode_code_masks_to_width() {
        let value = decode(2, 6, vec![0xC2]).unwrap();
        assert_eq!(
            value,
            RecordValue::Code {
                value: 2,
                width_bits: 6
            }
        );

        let value = decode(2, 12, vec![0x34, 0xF2]).unwrap();
        assert_eq!(
            value,
            RecordValue::Code {
                value: 0x234,
                width_bits: 12
            }
        );
    }

    #[test]
    fn test_decode_point_scaling() {
        let value = decode(3, (-2i8) as u8, 1234i16.to_le_bytes().to_vec()).unwrap();
        assert_eq!(
            value,
            RecordValue::Point {
                value: 12.34,
                width_bytes: 2
            }
        );

        let value = decode(3, 1, (-7i32).to_le_bytes().to_vec()).unwrap();
        assert_eq!(
            value,
            RecordValue::Point {
                value: -70.0,
                width_bytes: 4
            }
        );
    }

    #[test]
    fn test_width_violations() {
        assert!(decode(0, 0, vec![0; 8]).is_err());
        assert!(decode(1, 0, vec![0; 4]).is_err());
        assert!(decode(2, 0, vec![1]).is_err());
        assert!(decode(2, 9, vec![1]).is_err());
        assert!(decode(3, 0, vec![]).is_err());
        assert!(decode(3, 0, vec![0; 9]).is_err());
    }

    #[test]
    fn test_record_carries_header_fields() {
        let f = frame(0, 0, 7i32.to_le_bytes().to_vec());
        let record = FrameDecoder::decode_record(&f, ValueKind::Long).unwrap();
        assert_eq!(record.parameter_number(), 9);
        assert_eq!(record.timestamp(), 1_000);
        assert_eq!(record.dimension(), 3);
    }

    #[test]
    fn test_cancelled_before_first_frame() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let frames = vec![Ok(frame(0, 0, vec![0; 4]))];
        let result = FrameDecoder::run(
            frames.into_iter(),
            &ParameterCatalog::new(),
            &DecoderConfig::default(),
            &cancel,
        );
        assert!(matches!(result, Err(DecoderError::Cancelled)));
    }

    #[test]
    fn test_cancelled_between_frames() {
        let cancel = CancelFlag::new();
        let trip = cancel.clone();
        let mut pulled = 0;

        let frames = (0..10).map(|i| {
            pulled += 1;
            if i == 3 {
                trip.cancel();
            }
            Ok(frame(0, 0, vec![0; 4]))
        });
        let result = FrameDecoder::run(
            frames,
            &ParameterCatalog::new(),
            &DecoderConfig::default(),
            &cancel,
        );

        assert!(matches!(result, Err(DecoderError::Cancelled)));
        assert_eq!(pulled, 4);
    }
}
