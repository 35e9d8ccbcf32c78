//! Per-parameter export
//!
//! Writes one listing file per parameter. The outcome is read-only shared state,
//! so the files are rendered and written in parallel.

use crate::report::parameter_listing;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tmi_decoder::{DecodeOutcome, ValuePresenter};

/// Export every parameter of the outcome into `dir`, returning the file count
pub fn export_parameters(
    dir: &Path,
    outcome: &DecodeOutcome,
    presenter: &ValuePresenter<'_>,
) -> Result<usize> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;

    let plan = export_plan(dir, outcome);
    log::info!("Exporting {} parameters to {:?}", plan.len(), dir);

    plan.par_iter().try_for_each(|(name, path)| -> Result<()> {
        let records = outcome.index.sorted_by_time(name);
        let listing = parameter_listing(name, &records, presenter);
        fs::write(path, listing).with_context(|| format!("Failed to write {:?}", path))?;
        log::debug!("Exported {} records to {:?}", records.len(), path);
        Ok(())
    })?;

    Ok(plan.len())
}

/// One distinct target file per parameter, assigned in index order
///
/// Names that sanitize to the same file (compared case-insensitively) get the
/// parameter number of their first record appended, then a running suffix.
fn export_plan<'a>(dir: &Path, outcome: &'a DecodeOutcome) -> Vec<(&'a str, PathBuf)> {
    let mut taken = HashSet::new();
    let mut plan = Vec::with_capacity(outcome.index.unique_parameter_count());

    for (name, records) in outcome.index.iter() {
        let stem = file_stem(name);
        let mut file = format!("{}.txt", stem);
        if !taken.insert(file.to_lowercase()) {
            let number = records.first().map_or(0, |r| r.parameter_number());
            file = format!("{}__{}.txt", stem, number);
            let mut suffix = 2;
            while !taken.insert(file.to_lowercase()) {
                file = format!("{}__{}_{}.txt", stem, number, suffix);
                suffix += 1;
            }
            log::warn!("Parameter {:?} collides with another export file, using {}", name, file);
        }
        plan.push((name, dir.join(file)));
    }
    plan
}

/// File stem for a parameter, with path-hostile characters replaced
fn file_stem(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    if safe.is_empty() {
        "UNNAMED".to_string()
    } else {
        safe
    }
}
