#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal plumbing for the kabupaten/kota tools.
//!
//! [`ResolutionBar`] draws one bar for an enrichment run: the record being
//! looked up on the left and the running reference/remote/unresolved tally
//! on the right. [`init_logger`] routes `log` output through the same
//! [`MultiProgress`] so per-record log lines don't tear the bar.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use kabkota_geocoder::progress::ResolutionProgress;
use kabkota_geocoder_models::{EnrichedRecord, InputRecord, ResolutionSummary};
use log::LevelFilter;

pub use indicatif::MultiProgress;

/// Crates whose `info` lines are shown when `RUST_LOG` is unset.
const TOOL_CRATES: &[&str] = &["kabkota_enrich", "kabkota_geocoder"];

const BAR_TEMPLATE: &str =
    "{spinner:.cyan} {prefix:<24.bold} {wide_bar:.cyan/dim} {pos}/{len} [{eta}] {msg}";

/// Progress bar for a record-by-record resolution run.
pub struct ResolutionBar {
    bar: ProgressBar,
}

impl ResolutionBar {
    /// Adds a bar to `multi`. Its length is set when the run starts.
    #[must_use]
    pub fn new(multi: &MultiProgress) -> Self {
        let bar = multi.add(ProgressBar::new(0));
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }
}

impl ResolutionProgress for ResolutionBar {
    fn started(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_message(ResolutionSummary::default().to_string());
    }

    fn resolving(&self, record: &InputRecord) {
        self.bar.set_prefix(record.name.clone());
    }

    fn resolved(&self, _record: &EnrichedRecord, tally: &ResolutionSummary) {
        self.bar.inc(1);
        self.bar.set_message(tally.to_string());
    }

    fn finished(&self, summary: &ResolutionSummary) {
        self.bar.set_prefix("done");
        self.bar.finish_with_message(summary.to_string());
    }
}

/// Installs `pretty_env_logger` behind `indicatif-log-bridge`.
///
/// `RUST_LOG` wins when set. Otherwise the tool crates log at `info` and
/// everything else (HTTP stack included) at `warn`. If a logger is already
/// installed it is left alone.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(LevelFilter::Warn);
    for name in TOOL_CRATES {
        builder.filter_module(name, LevelFilter::Info);
    }
    let logger = builder.parse_env("RUST_LOG").build();
    let level = logger.filter();

    if LogWrapper::new(multi.clone(), logger).try_init().is_ok() {
        log::set_max_level(level);
    }

    multi
}
