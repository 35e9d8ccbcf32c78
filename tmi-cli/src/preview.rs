//! Input file preview
//!
//! Shows the beginning of an input file: a hex dump for the binary capture, the
//! first lines for the text metadata files.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tmi_decoder::DecodeOutcome;

const CAPTURE_PREVIEW_BYTES: u64 = 256;
pub const CATALOG_PREVIEW_LINES: usize = 50;
pub const DIMENSIONS_PREVIEW_LINES: usize = 100;

/// Which input to preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PreviewTarget {
    Capture,
    Catalog,
    Dimensions,
}

/// Hex dump of the first 256 capture bytes, plus a short summary of the decode
pub fn preview_capture(path: &Path, outcome: Option<&DecodeOutcome>) -> Result<String> {
    let size = fs::metadata(path)
        .with_context(|| format!("Failed to stat {:?}", path))?
        .len();

    let mut buffer = Vec::new();
    File::open(path)
        .with_context(|| format!("Failed to open {:?}", path))?
        .take(CAPTURE_PREVIEW_BYTES)
        .read_to_end(&mut buffer)
        .with_context(|| format!("Failed to read {:?}", path))?;

    let mut out = String::new();
    writeln!(out, "=== Capture ===")?;
    writeln!(out, "Path: {}", path.display())?;
    writeln!(out, "File size: {} bytes", size)?;
    writeln!(out)?;
    write!(out, "First {} bytes (hex):", buffer.len())?;

    for (i, byte) in buffer.iter().enumerate() {
        if i % 16 == 0 {
            write!(out, "\n{:04X}: ", i)?;
        }
        write!(out, "{:02X} ", byte)?;
    }
    writeln!(out)?;

    if let Some(outcome) = outcome {
        writeln!(out)?;
        writeln!(out, "=== Decoded data ===")?;
        writeln!(out, "Total records: {}", outcome.stats.total_frames())?;
        writeln!(out, "Useful records: {}", outcome.stats.useful_frames())?;
        writeln!(
            out,
            "Unique parameters: {}",
            outcome.index.unique_parameter_count()
        )?;
    }

    Ok(out)
}

/// First `max_lines` lines of a text file, with a marker if there are more
pub fn preview_text(path: &Path, title: &str, max_lines: usize) -> Result<String> {
    let size = fs::metadata(path)
        .with_context(|| format!("Failed to stat {:?}", path))?
        .len();
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;

    let mut out = String::new();
    writeln!(out, "=== {} ===", title)?;
    writeln!(out, "Path: {}", path.display())?;
    writeln!(out, "File size: {} bytes", size)?;
    writeln!(out)?;
    writeln!(out, "Content (first {} lines):", max_lines)?;
    writeln!(out, "----------------------")?;

    let mut lines = BufReader::new(file).lines();
    for line in lines.by_ref().take(max_lines) {
        let line = line.with_context(|| format!("Failed to read {:?}", path))?;
        writeln!(out, "{}", line)?;
    }
    if lines.next().is_some() {
        writeln!(out, "\n... (truncated)")?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_hex_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&(0u8..20).collect::<Vec<_>>()).unwrap();

        let preview = preview_capture(file.path(), None).unwrap();
        assert!(preview.contains("File size: 20 bytes"));
        assert!(preview.contains("\n0000: 00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F "));
        assert!(preview.contains("\n0010: 10 11 12 13 \n"));
        assert!(!preview.contains("Decoded data"));
    }

    #[test]
    fn test_text_truncation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "header\nV\nA\nW\n").unwrap();

        let short = preview_text(file.path(), "Dimensions", 2).unwrap();
        assert!(short.contains("header\nV\n"));
        assert!(!short.contains("\nA\n"));
        assert!(short.contains("... (truncated)"));

        let full = preview_text(file.path(), "Dimensions", 4).unwrap();
        assert!(!full.contains("truncated"));
    }
}
