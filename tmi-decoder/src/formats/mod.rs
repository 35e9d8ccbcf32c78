//! Capture file formats
//!
//! This module contains the reader for TMI capture files. The reader implements an
//! iterator pattern over raw frames; interpreting frame payloads is left to the
//! frame decoder.

pub mod tmi;

// Re-export parser types
pub use tmi::{
    FrameClass, FrameHeader, RawFrame, TmiFrameIterator, TmiParser, HEADER_LEN, STREAM_SOURCE,
};
