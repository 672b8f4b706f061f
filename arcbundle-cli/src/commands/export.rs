//! `arcbundle export`: write every tile of the covering bundles to disk.

use std::path::PathBuf;

use arcbundle::bundle::BundleDescriptor;
use arcbundle::config::ConfigFile;
use arcbundle::export::{BatchExporter, BundleOutcome, ExportObserver, ExportRequest};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use super::common::{resolve_offset_mode, resolve_root, OffsetModeArg};
use crate::error::CliError;

/// Arguments for the export command.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Compact cache root (defaults to cache.root from config)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Output directory (defaults to export.output from config)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Northern latitude of the area
    #[arg(long, allow_hyphen_values = true)]
    pub north: f64,

    /// Western longitude of the area
    #[arg(long, allow_hyphen_values = true)]
    pub west: f64,

    /// Southern latitude of the area
    #[arg(long, allow_hyphen_values = true)]
    pub south: f64,

    /// Eastern longitude of the area
    #[arg(long, allow_hyphen_values = true)]
    pub east: f64,

    /// First level to export
    #[arg(long)]
    pub min_level: u8,

    /// Last level to export (inclusive)
    #[arg(long)]
    pub max_level: u8,

    /// Worker threads (defaults to export.workers, then one per CPU)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Index offset decoding
    #[arg(long, value_enum)]
    pub offset_mode: Option<OffsetModeArg>,

    /// Added to each row before it is written into the filename
    #[arg(long, allow_negative_numbers = true)]
    pub row_offset: Option<i64>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl ExportArgs {
    /// Build the export request, filling unset flags from config.
    pub fn to_request(&self, config: &ConfigFile) -> Result<ExportRequest, CliError> {
        let root = resolve_root(self.root.clone(), config)?;
        let out = self
            .out
            .clone()
            .or_else(|| config.export.output.clone())
            .ok_or_else(|| {
                CliError::Config(
                    "no output directory. Pass --out or set output in the [export] section"
                        .to_string(),
                )
            })?;

        let mut request = ExportRequest::new(
            root,
            out,
            (self.north, self.west),
            (self.south, self.east),
            self.min_level,
            self.max_level,
        )
        .with_offset_mode(resolve_offset_mode(self.offset_mode, config))
        .with_row_offset(self.row_offset.unwrap_or(config.export.row_offset));

        if let Some(workers) = self.workers.or(config.export.workers) {
            request = request.with_workers(workers);
        }
        Ok(request)
    }
}

/// Drives an indicatif bar from exporter callbacks.
struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    fn new(hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(0)
        };
        if let Ok(style) = ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} bundles {msg}",
        ) {
            bar.set_style(style.progress_chars("=>-"));
        }
        Self { bar }
    }
}

impl ExportObserver for ProgressObserver {
    fn export_started(&self, bundles: usize) {
        self.bar.set_length(bundles as u64);
    }

    fn bundle_finished(&self, descriptor: &BundleDescriptor, outcome: &BundleOutcome) {
        if let BundleOutcome::Failed { error, .. } = outcome {
            self.bar
                .println(format!("  {} failed: {}", descriptor.id, error));
        }
        self.bar.set_message(descriptor.id.clone());
        self.bar.inc(1);
    }
}

/// Run the export command.
pub fn run(args: ExportArgs, config: &ConfigFile) -> Result<(), CliError> {
    let request = args.to_request(config)?;

    println!("Exporting bundles");
    println!("  Root:    {}", request.input_root.display());
    println!("  Output:  {}", request.output_root.display());
    println!("  Levels:  {}..={}", request.min_level, request.max_level);
    println!("  Workers: {}", request.workers);
    println!();

    let observer = ProgressObserver::new(args.no_progress);
    let summary = BatchExporter::new().run(&request, &observer)?;
    observer.bar.finish_and_clear();

    println!(
        "Bundles: {} total, {} exported, {} missing, {} failed",
        summary.bundles_total,
        summary.bundles_exported,
        summary.bundles_missing,
        summary.bundles_failed
    );
    println!(
        "Tiles:   {} written ({} bytes) in {:.1}s",
        summary.tiles_written,
        summary.bytes_written,
        summary.duration.as_secs_f64()
    );

    if summary.is_clean() {
        Ok(())
    } else {
        Err(CliError::ExportIncomplete {
            failed: summary.bundles_failed,
        })
    }
}
