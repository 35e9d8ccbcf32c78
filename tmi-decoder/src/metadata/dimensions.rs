//! Dimension table loader
//!
//! The dimension table is a plain text file: the first line is a header, and every
//! following line N (counting from 1) holds the unit label for dimension code N.

use crate::types::{DecoderError, Result};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Mapping from dimension code to unit label
#[derive(Debug, Clone, Default)]
pub struct DimensionTable {
    labels: BTreeMap<u32, String>,
}

impl DimensionTable {
    /// Create an empty table (every lookup falls back to `"[code]"`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a dimension table from a file
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading dimension table: {:?}", path);

        let file = File::open(path).map_err(|e| {
            DecoderError::DimensionTable(format!("Failed to open {:?}: {}", path, e))
        })?;
        let table = Self::from_reader(BufReader::new(file))?;

        log::info!("Loaded {} dimension labels from {:?}", table.len(), path);
        Ok(table)
    }

    /// Parse a dimension table from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut labels = BTreeMap::new();

        // Line 0 is the header; codes start at 1
        for (index, line) in reader.lines().enumerate().skip(1) {
            let line = line.map_err(|e| {
                DecoderError::DimensionTable(format!("Failed to read line {}: {}", index + 1, e))
            })?;
            let label = line.trim();
            if !label.is_empty() {
                labels.insert(index as u32, label.to_string());
            }
        }

        Ok(Self { labels })
    }

    /// Unit label for a code, or `"[code]"` if the code is not mapped
    pub fn label(&self, code: u32) -> Cow<'_, str> {
        match self.labels.get(&code) {
            Some(label) => Cow::Borrowed(label.as_str()),
            None => {
                log::debug!("Unmapped dimension code {}", code);
                Cow::Owned(format!("[{}]", code))
            }
        }
    }

    /// True if the code has a label
    pub fn contains(&self, code: u32) -> bool {
        self.labels.contains_key(&code)
    }

    /// Number of mapped codes
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
