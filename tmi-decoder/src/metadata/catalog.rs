//! Parameter catalog loader
//!
//! Parses the XML parameter catalog: one `Param` element per parameter with
//! `number`, `name` and `fullname` attributes, and zero or more `TextValue`
//! children whose `value` attributes enumerate the texts of a coded parameter.
//!
//! ```xml
//! <Params>
//!   <Param number="12" name="MODE" fullname="Operating mode">
//!     <TextValue value="OFF"/>
//!     <TextValue value="STANDBY"/>
//!   </Param>
//! </Params>
//! ```

use crate::types::{DecoderError, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Catalog entry for one parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterEntry {
    pub number: u32,
    pub name: String,
    pub full_name: String,
    /// Enumerated texts, indexed by raw code value
    pub text_values: Vec<String>,
}

/// Mapping from parameter number to names and enumeration texts
#[derive(Debug, Clone, Default)]
pub struct ParameterCatalog {
    entries: BTreeMap<u32, ParameterEntry>,
}

impl ParameterCatalog {
    /// Create an empty catalog (every parameter resolves to `UNKNOWN_<n>`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from an XML file
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading parameter catalog: {:?}", path);

        let bytes = std::fs::read(path)
            .map_err(|e| DecoderError::Catalog(format!("Failed to read {:?}: {}", path, e)))?;

        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Catalog {:?} is not valid UTF-8, decoding lossily", path);
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        let catalog = Self::from_xml_str(&text)?;
        log::info!("Loaded {} parameters from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Parse a catalog from XML text
    pub fn from_xml_str(text: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(text)
            .map_err(|e| DecoderError::Catalog(format!("Invalid XML: {}", e)))?;

        let mut catalog = Self::new();

        for param in doc.descendants().filter(|n| n.has_tag_name("Param")) {
            let raw_number = param.attribute("number").unwrap_or("");
            let number: u32 = raw_number.trim().parse().map_err(|_| {
                DecoderError::Catalog(format!(
                    "Param at byte {} has invalid number {:?}",
                    param.range().start,
                    raw_number
                ))
            })?;

            let text_values = param
                .descendants()
                .filter(|n| n.has_tag_name("TextValue"))
                .map(|n| n.attribute("value").unwrap_or("").to_string())
                .collect();

            catalog.insert(ParameterEntry {
                number,
                name: param.attribute("name").unwrap_or("").to_string(),
                full_name: param.attribute("fullname").unwrap_or("").to_string(),
                text_values,
            });
        }

        Ok(catalog)
    }

    /// Add an entry; a duplicate number replaces the earlier entry
    pub fn insert(&mut self, entry: ParameterEntry) {
        if let Some(previous) = self.entries.insert(entry.number, entry) {
            log::warn!(
                "Duplicate catalog entry for parameter {} ({}), keeping the later one",
                previous.number,
                previous.name
            );
        }
    }

    /// Catalog entry, if present
    pub fn get(&self, number: u32) -> Option<&ParameterEntry> {
        self.entries.get(&number)
    }

    /// Short name, or `UNKNOWN_<number>` if the parameter is not in the catalog
    pub fn name(&self, number: u32) -> String {
        match self.entries.get(&number) {
            Some(entry) => entry.name.clone(),
            None => format!("UNKNOWN_{}", number),
        }
    }

    /// Full name, or an empty string
    pub fn full_name(&self, number: u32) -> &str {
        self.entries
            .get(&number)
            .map(|entry| entry.full_name.as_str())
            .unwrap_or("")
    }

    /// Enumeration texts, or an empty slice
    pub fn text_values(&self, number: u32) -> &[String] {
        self.entries
            .get(&number)
            .map(|entry| entry.text_values.as_slice())
            .unwrap_or(&[])
    }

    /// All entries in ascending parameter number order
    pub fn entries(&self) -> impl Iterator<Item = &ParameterEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Params>
  <Param number="12" name="MODE" fullname="Operating mode">
    <TextValue value="OFF"/>
    <TextValue value="STANDBY"/>
    <TextValue value="ACTIVE"/>
  </Param>
  <Param number="40" name="U_BUS" fullname="Bus voltage"/>
</Params>"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = ParameterCatalog::from_xml_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.name(12), "MODE");
        assert_eq!(catalog.full_name(40), "Bus voltage");
        assert_eq!(catalog.text_values(12), ["OFF", "STANDBY", "ACTIVE"]);
        assert!(catalog.text_values(40).is_empty());
    }

    #[test]
    fn test_lookups_degrade() {
        let catalog = ParameterCatalog::from_xml_str(CATALOG).unwrap();
        assert_eq!(catalog.name(77), "UNKNOWN_77");
        assert_eq!(catalog.full_name(77), "");
        assert!(catalog.text_values(77).is_empty());
        assert!(catalog.get(77).is_none());
    }

    #[test]
    fn test_duplicate_overwrites() {
        let xml = r#"<Params>
            <Param number="5" name="FIRST" fullname="a"><TextValue value="X"/></Param>
            <Param number="5" name="SECOND" fullname="b"/>
        </Params>"#;
        let catalog = ParameterCatalog::from_xml_str(xml).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.name(5), "SECOND");
        assert!(catalog.text_values(5).is_empty());
    }

    #[test]
    fn test_invalid_number_is_error() {
        let xml = r#"<Params><Param number="abc" name="X"/></Params>"#;
        assert!(matches!(
            ParameterCatalog::from_xml_str(xml),
            Err(DecoderError::Catalog(_))
        ));
    }

    #[test]
    fn test_malformed_xml_is_error() {
        assert!(ParameterCatalog::from_xml_str("<Params><Param").is_err());
    }
}
