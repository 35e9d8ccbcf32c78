//! Value presentation
//!
//! Renders decoded records as text using the parameter catalog (enumeration
//! texts) and the dimension table (unit suffixes). Presentation is lazy and never
//! fails: missing metadata degrades to numeric text or a bracketed code.

use crate::metadata::{DimensionTable, ParameterCatalog};
use crate::types::{RecordValue, TelemetryRecord};
use chrono::NaiveTime;

const MILLIS_PER_DAY: u32 = 86_400_000;

/// Format a raw timestamp (milliseconds since midnight) as `HH:MM:SS,mmm`
///
/// Values past one day wrap around midnight.
pub fn format_timestamp(raw: u32) -> String {
    let millis = raw % MILLIS_PER_DAY;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(
        millis / 1_000,
        (millis % 1_000) * 1_000_000,
    )
    .unwrap_or_default();
    time.format("%H:%M:%S,%3f").to_string()
}

/// Present a record's value as text
pub fn present(
    record: &TelemetryRecord,
    catalog: &ParameterCatalog,
    dimensions: &DimensionTable,
) -> String {
    ValuePresenter::new(catalog, dimensions).present(record)
}

/// Record presenter bound to a session's metadata
#[derive(Debug, Clone, Copy)]
pub struct ValuePresenter<'a> {
    catalog: &'a ParameterCatalog,
    dimensions: &'a DimensionTable,
}

impl<'a> ValuePresenter<'a> {
    pub fn new(catalog: &'a ParameterCatalog, dimensions: &'a DimensionTable) -> Self {
        Self {
            catalog,
            dimensions,
        }
    }

    /// Value text: integer, number with unit, or enumeration text
    pub fn present(&self, record: &TelemetryRecord) -> String {
        match *record.value() {
            RecordValue::Long(value) => value.to_string(),
            RecordValue::Double(value) | RecordValue::Point { value, .. } => {
                let unit = self.dimensions.label(u32::from(record.dimension()));
                format!("{} {}", value, unit)
            }
            RecordValue::Code { value, .. } => {
                let texts = self
                    .catalog
                    .text_values(u32::from(record.parameter_number()));
                usize::try_from(value)
                    .ok()
                    .and_then(|i| texts.get(i))
                    .cloned()
                    .unwrap_or_else(|| value.to_string())
            }
        }
    }

    /// Listing line: `HH:MM:SS,mmm  <value>`
    pub fn present_line(&self, record: &TelemetryRecord) -> String {
        format!(
            "{}  {}",
            format_timestamp(record.timestamp()),
            self.present(record)
        )
    }
}
