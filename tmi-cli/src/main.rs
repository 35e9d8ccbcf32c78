//! TMI Telemetry Viewer CLI Application
//!
//! This is the command-line interface for the TMI capture decoder.
//! It uses the tmi-decoder library and adds:
//! - Configuration file handling
//! - Full and selective statistics reports (text or JSON)
//! - Per-parameter record listings and exports
//! - Input file previews

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tmi_decoder::{DecodeOutcome, DecodeSession, Decoder, DimensionTable, ParameterCatalog};

mod config;
mod export;
mod preview;
mod report;

use config::{AppConfig, OutputFormat, ResolvedInputs};
use preview::PreviewTarget;
use report::StatItem;

/// TMI Telemetry Viewer - Decode and classify telemetry captures
#[derive(Parser, Debug)]
#[command(name = "tmi-cli")]
#[command(about = "Decode TMI telemetry captures and report classification statistics", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the binary telemetry capture
    #[arg(short = 't', long, value_name = "FILE")]
    capture: Option<PathBuf>,

    /// Path to the XML parameter catalog
    #[arg(short = 'x', long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Path to the dimension table
    #[arg(short, long, value_name = "FILE")]
    dimensions: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the records of a parameter, sorted by time (can be repeated)
    #[arg(short, long, value_name = "NAME")]
    param: Vec<String>,

    /// List all parameter names with their record counts
    #[arg(long)]
    list: bool,

    /// Print only these statistics items (can be repeated)
    #[arg(short, long, value_enum, value_name = "ITEM")]
    select: Vec<StatItem>,

    /// Whether to print statistics
    #[arg(long, value_enum, default_value_t = StatsMode::Full)]
    stats: StatsMode,

    /// Statistics output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Save the printed statistics to a file
    #[arg(long, value_name = "FILE")]
    save_stats: Option<PathBuf>,

    /// Write one listing file per parameter into this directory
    #[arg(short, long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Show the beginning of an input file
    #[arg(long, value_enum, value_name = "FILE")]
    preview: Option<PreviewTarget>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("TMI Telemetry Viewer CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", tmi_decoder::VERSION);

    let config = merge_config(&args)?;
    let inputs = config.input.resolve()?;

    // Only the capture preview needs decoded data
    match args.preview {
        Some(PreviewTarget::Catalog) => {
            print!(
                "{}",
                preview::preview_text(&inputs.catalog, "Catalog", preview::CATALOG_PREVIEW_LINES)?
            );
            return Ok(());
        }
        Some(PreviewTarget::Dimensions) => {
            print!(
                "{}",
                preview::preview_text(
                    &inputs.dimensions,
                    "Dimensions",
                    preview::DIMENSIONS_PREVIEW_LINES
                )?
            );
            return Ok(());
        }
        Some(PreviewTarget::Capture) | None => {}
    }

    let session = DecodeSession::new(load_metadata(&inputs)?);
    let outcome = run_decode(&session, &inputs, &config)?;

    if args.preview == Some(PreviewTarget::Capture) {
        print!("{}", preview::preview_capture(&inputs.capture, Some(&outcome))?);
        return Ok(());
    }

    let presenter = session.decoder().presenter();

    if args.list {
        for (name, records) in outcome.index.iter() {
            println!("{:<24} {:>8}  {}", name, records.len(), describe(session.decoder(), records));
        }
    }

    for name in &args.param {
        if !outcome.index.contains(name) {
            log::warn!("Parameter {:?} does not occur in the capture", name);
        }
        let records = outcome.index.sorted_by_time(name);
        println!("{}", report::parameter_listing(name, &records, &presenter));
    }

    if args.stats == StatsMode::Full {
        let rendered = match config.output.format {
            OutputFormat::Json => report::json_report(&outcome)?,
            OutputFormat::Text if config.output.stats_items.is_empty() => report::full_report(&outcome),
            OutputFormat::Text => report::selected_report(&outcome, &config.output.stats_items),
        };
        println!("{}", rendered);

        if let Some(path) = &config.output.save_stats {
            report::save_report(path, &rendered)?;
        }
    }

    if let Some(dir) = &config.output.export_dir {
        let count = export::export_parameters(dir, &outcome, &presenter)?;
        log::info!("Exported {} parameter listings", count);
    }

    Ok(())
}

/// Statistics printing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum StatsMode {
    Full,
    #[value(name = "none")]
    Skip,
}

/// Combine the config file (if any) with command-line overrides
fn merge_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(path) = &args.capture {
        config.input.capture = Some(path.clone());
    }
    if let Some(path) = &args.catalog {
        config.input.catalog = Some(path.clone());
    }
    if let Some(path) = &args.dimensions {
        config.input.dimensions = Some(path.clone());
    }
    if !args.select.is_empty() {
        config.output.stats_items = args.select.clone();
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(path) = &args.save_stats {
        config.output.save_stats = Some(path.clone());
    }
    if let Some(dir) = &args.export_dir {
        config.output.export_dir = Some(dir.clone());
    }

    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

fn load_metadata(inputs: &ResolvedInputs) -> Result<Decoder> {
    let catalog = ParameterCatalog::load(&inputs.catalog)
        .with_context(|| format!("Loading catalog {:?}", inputs.catalog))?;
    let dimensions = DimensionTable::load(&inputs.dimensions)
        .with_context(|| format!("Loading dimensions {:?}", inputs.dimensions))?;
    Ok(Decoder::with_metadata(catalog, dimensions))
}

/// Decode on the session's worker thread, reporting while it runs
fn run_decode(
    session: &DecodeSession,
    inputs: &ResolvedInputs,
    config: &AppConfig,
) -> Result<std::sync::Arc<DecodeOutcome>> {
    let mut task = session.start(inputs.capture.clone(), config.decoder.clone())?;

    loop {
        match task.wait_timeout(Duration::from_millis(500)) {
            Some(result) => {
                return result.with_context(|| format!("Decoding {:?}", inputs.capture));
            }
            None => log::info!("Decoding {:?} ...", inputs.capture),
        }
    }
}

/// Full name and kind of a parameter's first record, for listings
fn describe(decoder: &Decoder, records: &[tmi_decoder::TelemetryRecord]) -> String {
    match records.first() {
        Some(first) => {
            let full_name = decoder
                .catalog()
                .full_name(u32::from(first.parameter_number()));
            format!("[{}] {}", first.kind(), full_name)
        }
        None => String::new(),
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_flag() {
        let args = Args::try_parse_from(["tmi-cli"]).unwrap();
        assert_eq!(args.stats, StatsMode::Full);

        let args = Args::try_parse_from(["tmi-cli", "--stats", "none"]).unwrap();
        assert_eq!(args.stats, StatsMode::Skip);

        assert!(Args::try_parse_from(["tmi-cli", "--stats", "partial"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "tmi-cli",
            "--capture",
            "flight.tmi",
            "--select",
            "code-wide",
            "--format",
            "json",
        ])
        .unwrap();
        let config = merge_config(&args).unwrap();
        assert_eq!(config.input.capture, Some(PathBuf::from("flight.tmi")));
        assert_eq!(config.output.stats_items, vec![StatItem::CodeWide]);
        assert_eq!(config.output.format, OutputFormat::Json);
    }
}
