//! Per-record progress hooks for a resolution run.
//!
//! A run calls [`ResolutionProgress::started`] once, then
//! [`resolving`](ResolutionProgress::resolving) and
//! [`resolved`](ResolutionProgress::resolved) for every input record in
//! order, then [`finished`](ResolutionProgress::finished) with the final
//! tally. Every hook has an empty default body.

use kabkota_geocoder_models::{EnrichedRecord, InputRecord, ResolutionSummary};

/// Observer of a record-by-record resolution run.
pub trait ResolutionProgress: Send + Sync {
    /// The run is about to process `total` records.
    fn started(&self, _total: usize) {}

    /// `record` is about to be looked up.
    fn resolving(&self, _record: &InputRecord) {}

    /// `record` has its final coordinates (or none). `tally` already
    /// counts it.
    fn resolved(&self, _record: &EnrichedRecord, _tally: &ResolutionSummary) {}

    /// Every record has been processed.
    fn finished(&self, _summary: &ResolutionSummary) {}
}

/// Reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ResolutionProgress for Silent {}
