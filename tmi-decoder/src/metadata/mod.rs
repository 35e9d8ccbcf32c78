//! Parameter metadata: the XML parameter catalog and the dimension table
//!
//! Both are loaded once per session and passed explicitly to the decoder and the
//! presenter. Lookups are total: a missing entry degrades to a fallback string.

pub mod catalog;
pub mod dimensions;

// Re-export key types for convenience
pub use catalog::{ParameterCatalog, ParameterEntry};
pub use dimensions::DimensionTable;

/// Metadata statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetadataStats {
    /// Number of parameters in the catalog
    pub num_parameters: usize,
    /// Number of catalog parameters with enumerated text values
    pub num_enumerated: usize,
    /// Number of mapped dimension codes
    pub num_dimensions: usize,
}

impl MetadataStats {
    pub fn collect(catalog: &ParameterCatalog, dimensions: &DimensionTable) -> Self {
        Self {
            num_parameters: catalog.len(),
            num_enumerated: catalog
                .entries()
                .filter(|entry| !entry.text_values.is_empty())
                .count(),
            num_dimensions: dimensions.len(),
        }
    }
}
