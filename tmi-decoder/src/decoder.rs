//! Main decoder API
//!
//! This module provides the primary interface for the decoder library. The
//! [`Decoder`] struct holds the session metadata (parameter catalog and dimension
//! table) and decodes capture files against it.

use crate::config::DecoderConfig;
use crate::formats::{TmiFrameIterator, TmiParser};
use crate::frame_decoder::{CancelFlag, DecodeOutcome, FrameDecoder};
use crate::metadata::{DimensionTable, MetadataStats, ParameterCatalog};
use crate::presenter::ValuePresenter;
use crate::types::Result;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Decode a capture file with default configuration
///
/// Returns either a complete, internally consistent outcome or an error; no
/// partial results are ever returned.
pub fn decode(
    capture_path: &Path,
    dimensions: &DimensionTable,
    catalog: &ParameterCatalog,
) -> Result<DecodeOutcome> {
    decode_with(capture_path, dimensions, catalog, &DecoderConfig::default(), &CancelFlag::new())
}

/// Decode a capture file with explicit configuration and cancellation
pub fn decode_with(
    capture_path: &Path,
    _dimensions: &DimensionTable,
    catalog: &ParameterCatalog,
    config: &DecoderConfig,
    cancel: &CancelFlag,
) -> Result<DecodeOutcome> {
    log::info!("Decoding capture: {:?}", capture_path);

    let frames = TmiParser::open(capture_path, config)?;
    FrameDecoder::run(frames, catalog, config, cancel)
}

/// Decode a capture from any reader
///
/// Read failures are reported as
/// [`DecoderError::CaptureRead`](crate::DecoderError::CaptureRead), the same as
/// for files.
pub fn decode_reader<R: Read>(
    reader: R,
    catalog: &ParameterCatalog,
    config: &DecoderConfig,
    cancel: &CancelFlag,
) -> Result<DecodeOutcome> {
    FrameDecoder::run(TmiFrameIterator::new(reader), catalog, config, cancel)
}

/// The main decoder struct - entry point for all decoding operations
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    catalog: Arc<ParameterCatalog>,
    dimensions: Arc<DimensionTable>,
}

impl Decoder {
    /// Create a decoder with empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder from already loaded metadata
    pub fn with_metadata(catalog: ParameterCatalog, dimensions: DimensionTable) -> Self {
        Self {
            catalog: Arc::new(catalog),
            dimensions: Arc::new(dimensions),
        }
    }

    /// Load the XML parameter catalog, replacing any previous one
    ///
    /// # Example
    /// ```no_run
    /// use tmi_decoder::Decoder;
    /// use std::path::Path;
    ///
    /// let mut decoder = Decoder::new();
    /// decoder.load_catalog(Path::new("params.dat.xml")).unwrap();
    /// ```
    pub fn load_catalog(&mut self, path: &Path) -> Result<()> {
        self.catalog = Arc::new(ParameterCatalog::load(path)?);
        Ok(())
    }

    /// Load the dimension table, replacing any previous one
    pub fn load_dimensions(&mut self, path: &Path) -> Result<()> {
        self.dimensions = Arc::new(DimensionTable::load(path)?);
        Ok(())
    }

    /// Decode a capture file against the loaded metadata
    ///
    /// # Example
    /// ```no_run
    /// use tmi_decoder::{Decoder, DecoderConfig};
    /// use std::path::Path;
    ///
    /// let decoder = Decoder::new();
    /// let outcome = decoder.decode_file(Path::new("flight.tmi"), &DecoderConfig::new()).unwrap();
    /// println!("{} frames", outcome.stats.total_frames());
    /// ```
    pub fn decode_file(&self, path: &Path, config: &DecoderConfig) -> Result<DecodeOutcome> {
        decode_with(path, &self.dimensions, &self.catalog, config, &CancelFlag::new())
    }

    pub fn catalog(&self) -> &ParameterCatalog {
        &self.catalog
    }

    pub fn dimensions(&self) -> &DimensionTable {
        &self.dimensions
    }

    pub(crate) fn shared_catalog(&self) -> Arc<ParameterCatalog> {
        Arc::clone(&self.catalog)
    }

    pub(crate) fn shared_dimensions(&self) -> Arc<DimensionTable> {
        Arc::clone(&self.dimensions)
    }

    /// Presenter bound to this decoder's metadata
    pub fn presenter(&self) -> ValuePresenter<'_> {
        ValuePresenter::new(&self.catalog, &self.dimensions)
    }

    /// Get statistics about the loaded metadata
    pub fn metadata_stats(&self) -> MetadataStats {
        MetadataStats::collect(&self.catalog, &self.dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DecoderError;

    #[test]
    fn test_decoder_creation() {
        let decoder = Decoder::new();
        let stats = decoder.metadata_stats();
        assert_eq!(stats.num_parameters, 0);
        assert_eq!(stats.num_dimensions, 0);
    }

    #[test]
    fn test_missing_capture_is_read_error() {
        let decoder = Decoder::new();
        let result = decoder.decode_file(Path::new("missing.tmi"), &DecoderConfig::new());
        assert!(matches!(result, Err(DecoderError::CaptureRead { .. })));
    }

    #[test]
    fn test_decode_empty_reader() {
        let outcome = decode_reader(
            std::io::empty(),
            &ParameterCatalog::new(),
            &DecoderConfig::new(),
            &CancelFlag::new(),
        )
        .unwrap();
        assert_eq!(outcome.stats.total_frames(), 0);
        assert!(outcome.index.is_empty());
    }

    #[test]
    fn test_loaded_metadata_is_exposed() {
        use std::io::Write;

        let mut dims = tempfile::NamedTempFile::new().unwrap();
        write!(dims, "Dimensions\nV\nA\n").unwrap();
        let mut catalog = tempfile::NamedTempFile::new().unwrap();
        write!(catalog, r#"<Params><Param number="4" name="U_BUS" fullname="Bus voltage"/></Params>"#).unwrap();

        let mut decoder = Decoder::new();
        decoder.load_dimensions(dims.path()).unwrap();
        decoder.load_catalog(catalog.path()).unwrap();

        assert_eq!(decoder.dimensions().len(), 2);
        assert_eq!(decoder.dimensions().label(2), "A");
        assert_eq!(decoder.catalog().full_name(4), "Bus voltage");
        assert_eq!(decoder.metadata_stats().num_parameters, 1);
    }
}
