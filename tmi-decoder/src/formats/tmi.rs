//! TMI capture file reader
//!
//! A capture is a flat sequence of self-delimiting frames with no file header.
//! Every frame starts with a 12-byte little-endian header:
//!
//! | Offset | Size | Field    | Meaning                                              |
//! |-------:|-----:|----------|------------------------------------------------------|
//! | 0      | 2    | number   | parameter number                                     |
//! | 2      | 1    | attr     | bit 7: service flag, bits 0..6: kind tag             |
//! | 3      | 1    | dim      | dimension code                                       |
//! | 4      | 4    | time     | milliseconds since midnight                          |
//! | 8      | 1    | aux      | Code: significant bits, Point: decimal exponent (i8) |
//! | 9      | 1    | reserved |                                                      |
//! | 10     | 2    | length   | payload length in bytes                              |
//!
//! The header alone determines where the next frame starts, so the reader never
//! needs to understand a payload to stay synchronized.

use crate::config::DecoderConfig;
use crate::types::{DecoderError, Result, ValueKind};
use byteorder::{ByteOrder, LittleEndian};
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

/// Size of the fixed frame header in bytes
pub const HEADER_LEN: usize = 12;

const SERVICE_FLAG: u8 = 0x80;
const KIND_MASK: u8 = 0x7F;

/// Path reported for read failures of captures that did not come from a file
pub const STREAM_SOURCE: &str = "<stream>";

/// Parsed frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub number: u16,
    pub attr: u8,
    pub dim: u8,
    pub time: u32,
    pub aux: u8,
    pub length: u16,
}

impl FrameHeader {
    /// Parse a header from its 12 raw bytes
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Self {
        Self {
            number: LittleEndian::read_u16(&bytes[0..2]),
            attr: bytes[2],
            dim: bytes[3],
            time: LittleEndian::read_u32(&bytes[4..8]),
            aux: bytes[8],
            length: LittleEndian::read_u16(&bytes[10..12]),
        }
    }

    /// Serialize the header back to its wire form
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        LittleEndian::write_u16(&mut bytes[0..2], self.number);
        bytes[2] = self.attr;
        bytes[3] = self.dim;
        LittleEndian::write_u32(&mut bytes[4..8], self.time);
        bytes[8] = self.aux;
        LittleEndian::write_u16(&mut bytes[10..12], self.length);
        bytes
    }

    /// True for housekeeping frames that carry no measured value
    pub fn is_service(&self) -> bool {
        self.attr & SERVICE_FLAG != 0
    }

    /// Raw kind tag (meaningless for service frames)
    pub fn kind_tag(&self) -> u8 {
        self.attr & KIND_MASK
    }

    /// Classify the frame from its header
    pub fn class(&self) -> FrameClass {
        if self.is_service() {
            return FrameClass::Service;
        }
        match ValueKind::from_tag(self.kind_tag()) {
            Some(kind) => FrameClass::Payload(kind),
            None => FrameClass::UnknownKind(self.kind_tag()),
        }
    }
}

/// Frame classification derived from the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameClass {
    Service,
    UnknownKind(u8),
    Payload(ValueKind),
}

/// One frame as read from the capture, payload not yet interpreted
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    /// Byte offset of the frame header within the capture
    pub offset: u64,
    pub header: FrameHeader,
    pub payload: Vec<u8>,
}

impl RawFrame {
    /// Byte offset of the first payload byte
    pub fn payload_offset(&self) -> u64 {
        self.offset + HEADER_LEN as u64
    }
}

/// TMI capture parser
pub struct TmiParser;

impl TmiParser {
    /// Open a capture file and return an iterator over its frames
    pub fn open(path: &Path, config: &DecoderConfig) -> Result<TmiFrameIterator<BufReader<File>>> {
        log::info!("Opening TMI capture: {:?}", path);

        let file = File::open(path).map_err(|e| DecoderError::CaptureRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let reader = BufReader::with_capacity(config.buffer_capacity, file);
        Ok(TmiFrameIterator::with_source(reader, path))
    }
}

/// Iterator over the raw frames of a capture
///
/// Yields `Err` at most once; after an error or a clean end of file the
/// iterator is exhausted. Read failures are reported as
/// [`DecoderError::CaptureRead`] against the source path.
pub struct TmiFrameIterator<R: Read> {
    reader: R,
    source: PathBuf,
    offset: u64,
    finished: bool,
}

impl<R: Read> TmiFrameIterator<R> {
    /// Iterate over frames from an in-memory or streamed capture
    pub fn new(reader: R) -> Self {
        Self::with_source(reader, Path::new(STREAM_SOURCE))
    }

    /// Iterate over frames read from `source`
    pub fn with_source(reader: R, source: &Path) -> Self {
        Self {
            reader,
            source: source.to_path_buf(),
            offset: 0,
            finished: false,
        }
    }

    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize> {
        read_full(&mut self.reader, buf).map_err(|source| DecoderError::CaptureRead {
            path: self.source.clone(),
            source,
        })
    }

    fn read_frame(&mut self) -> Result<Option<RawFrame>> {
        let frame_offset = self.offset;

        let mut header_bytes = [0u8; HEADER_LEN];
        let filled = self.read_full(&mut header_bytes)?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < HEADER_LEN {
            return Err(DecoderError::format(
                frame_offset,
                format!("truncated frame header: {} of {} bytes", filled, HEADER_LEN),
            ));
        }

        let header = FrameHeader::parse(&header_bytes);
        let length = header.length as usize;

        let mut payload = vec![0u8; length];
        let got = self.read_full(&mut payload)?;
        if got < length {
            return Err(DecoderError::format(
                frame_offset,
                format!(
                    "frame declares {} payload bytes but only {} remain",
                    length, got
                ),
            ));
        }

        self.offset += (HEADER_LEN + length) as u64;
        log::trace!(
            "Frame at {}: number={} attr=0x{:02X} length={}",
            frame_offset,
            header.number,
            header.attr,
            length
        );

        Ok(Some(RawFrame {
            offset: frame_offset,
            header,
            payload,
        }))
    }
}

impl<R: Read> Iterator for TmiFrameIterator<R> {
    type Item = Result<RawFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Fill `buf` as far as the reader allows, returning the number of bytes read
///
/// Unlike `read_exact`, a short read at end of file is reported as a count so the
/// caller can tell a clean frame boundary from a truncated frame.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
