#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the coordinate enrichment tool.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use kabkota_cli_utils::ResolutionBar;
use kabkota_enrich::io::{CsvSink, read_input, write_all};
use kabkota_enrich::pipeline::ResolutionPipeline;
use kabkota_enrich::throttle::FixedDelay;
use kabkota_enrich::{DEFAULT_INPUT, DEFAULT_OUTPUT};
use kabkota_geocoder::nominatim::NominatimResolver;
use kabkota_geocoder::province::ProvinceCodeTable;
use kabkota_geocoder::reference::{ReferenceDataset, ReferenceResolver};
use kabkota_geocoder::service_registry::remote_service;

const ABOUT: &str = "Attach coordinates to a kabupaten/kota table.

The built-in reference dataset is a small sample. Pass --reference with a
full regency/city coordinate dump, or most records fall through to
Nominatim at one request per second.";

#[derive(Parser)]
#[command(name = "kabkota_enrich", about = ABOUT)]
struct Cli {
    /// Input CSV with `id,name,province_id` columns
    #[arg(long, default_value = DEFAULT_INPUT)]
    input: PathBuf,
    /// Output CSV (`id,name,province_id,latitude,longitude,source`)
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Reference dataset CSV (`code,province,city,latitude,longitude`).
    /// Defaults to the built-in sample.
    #[arg(long)]
    reference: Option<PathBuf>,
    /// Pause after each Nominatim request, in milliseconds. Defaults to the
    /// service's `rate_limit_ms`.
    #[arg(long)]
    delay_ms: Option<u64>,
    /// Extra Nominatim attempts per record after a transient failure
    #[arg(long, default_value = "0")]
    max_retries: u32,
    /// Skip Nominatim and only use the reference dataset
    #[arg(long)]
    reference_only: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = kabkota_cli_utils::init_logger();
    let cli = Cli::parse();
    let start = Instant::now();

    let records = read_input(&cli.input)?;
    log::info!("Read {} records from {}", records.len(), cli.input.display());

    let dataset = match &cli.reference {
        Some(path) => ReferenceDataset::from_path(path)?,
        None => {
            let dataset = ReferenceDataset::embedded();
            if dataset.len() < records.len() {
                log::warn!(
                    "Built-in reference sample has {} entries for {} records; \
                     pass --reference for full coverage",
                    dataset.len(),
                    records.len()
                );
            }
            dataset
        }
    };
    let reference = Arc::new(ReferenceResolver::new(dataset));
    log::info!("Reference dataset has {} entries", reference.dataset().len());
    let provinces = ProvinceCodeTable::default();

    let pipeline = if cli.reference_only {
        log::info!("Reference-only mode: Nominatim will not be queried");
        ResolutionPipeline::reference_only(provinces, reference)
    } else {
        let service = remote_service().with_env_overrides();
        let delay_ms = cli.delay_ms.unwrap_or(service.rate_limit_ms);
        log::info!(
            "Falling back to {} at {} ({delay_ms}ms between requests)",
            service.name,
            service.base_url
        );
        let remote = Arc::new(NominatimResolver::new(&service)?);
        ResolutionPipeline::new(provinces, reference, remote)
            .with_throttle(Arc::new(FixedDelay::from_millis(delay_ms)))
    }
    .with_max_retries(cli.max_retries);

    // Created before the run so an unwritable path fails fast.
    let mut sink = CsvSink::from_path(&cli.output)?;

    let progress = ResolutionBar::new(&multi);
    let resolution = pipeline
        .resolve_all_with_progress(&records, &progress)
        .await;

    write_all(&mut sink, &resolution.records)?;

    let summary = resolution.summary;
    log::info!(
        "Wrote {} records to {} in {:.1}s: {summary}",
        summary.total(),
        cli.output.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
