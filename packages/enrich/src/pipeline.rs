//! Per-record tier selection: reference dataset → Nominatim → unresolved.
//!
//! For each input record, in input order:
//! 1. Translate the province code to a name.
//! 2. Ask the reference tier. If it has one or more candidates, keep the
//!    first one (dataset order) and move on without touching the network.
//! 3. Otherwise ask the remote tier with the city and province name, then
//!    pause via the [`Throttle`].
//! 4. If neither tier produced coordinates, emit an unresolved record.
//!
//! Only transient remote failures are retried, and only when
//! [`ResolutionPipeline::with_max_retries`] allows it. A `NotFound` answer
//! is final for the run.

use std::sync::Arc;

use kabkota_geocoder::progress::{ResolutionProgress, Silent};
use kabkota_geocoder::province::ProvinceCodeTable;
use kabkota_geocoder::{ReferenceLookup, RemoteLookup, RemoteOutcome};
use kabkota_geocoder_models::{EnrichedRecord, InputRecord, ResolutionSummary};

use crate::throttle::{FixedDelay, Throttle};

/// Default pause after each remote request.
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Output of [`ResolutionPipeline::resolve_all`].
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Exactly one record per input record, in input order.
    pub records: Vec<EnrichedRecord>,
    /// Per-source counts for the run.
    pub summary: ResolutionSummary,
}

/// Sequential two-tier coordinate resolver.
pub struct ResolutionPipeline {
    provinces: ProvinceCodeTable,
    reference: Arc<dyn ReferenceLookup>,
    remote: Option<Arc<dyn RemoteLookup>>,
    throttle: Arc<dyn Throttle>,
    max_retries: u32,
}

impl ResolutionPipeline {
    /// Creates a pipeline with both tiers, a [`DEFAULT_DELAY_MS`] throttle
    /// and no retries.
    #[must_use]
    pub fn new(
        provinces: ProvinceCodeTable,
        reference: Arc<dyn ReferenceLookup>,
        remote: Arc<dyn RemoteLookup>,
    ) -> Self {
        Self {
            provinces,
            reference,
            remote: Some(remote),
            throttle: Arc::new(FixedDelay::from_millis(DEFAULT_DELAY_MS)),
            max_retries: 0,
        }
    }

    /// Creates a pipeline that never calls a remote service. Records
    /// without a reference match come out unresolved.
    #[must_use]
    pub fn reference_only(
        provinces: ProvinceCodeTable,
        reference: Arc<dyn ReferenceLookup>,
    ) -> Self {
        Self {
            provinces,
            reference,
            remote: None,
            throttle: Arc::new(FixedDelay::from_millis(DEFAULT_DELAY_MS)),
            max_retries: 0,
        }
    }

    /// Replaces the pause applied after each remote request.
    #[must_use]
    pub fn with_throttle(mut self, throttle: Arc<dyn Throttle>) -> Self {
        self.throttle = throttle;
        self
    }

    /// Allows up to `max_retries` extra remote attempts per record after a
    /// transient failure.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Resolves every record in order.
    pub async fn resolve_all(&self, records: &[InputRecord]) -> Resolution {
        self.resolve_all_with_progress(records, &Silent).await
    }

    /// Resolves every record in order, reporting each one to `progress`.
    pub async fn resolve_all_with_progress(
        &self,
        records: &[InputRecord],
        progress: &dyn ResolutionProgress,
    ) -> Resolution {
        progress.started(records.len());

        let mut summary = ResolutionSummary::default();
        let mut enriched = Vec::with_capacity(records.len());

        for record in records {
            progress.resolving(record);
            let result = self.resolve_record(record, &mut summary).await;
            summary.record(&result);
            progress.resolved(&result, &summary);
            enriched.push(result);
        }

        progress.finished(&summary);

        Resolution {
            records: enriched,
            summary,
        }
    }

    async fn resolve_record(
        &self,
        record: &InputRecord,
        summary: &mut ResolutionSummary,
    ) -> EnrichedRecord {
        let province = self.provinces.lookup(&record.province_id);

        let candidates = self.reference.resolve(&record.name);
        if let Some(&first) = candidates.first() {
            if candidates.len() > 1 {
                log::debug!(
                    "{} ({}): {} reference matches, keeping the first",
                    record.name,
                    record.id,
                    candidates.len()
                );
            }
            log::info!(
                "{} ({}): reference ({}, {})",
                record.name,
                record.id,
                first.latitude,
                first.longitude
            );
            return EnrichedRecord::resolved(record, first);
        }

        let Some(remote) = &self.remote else {
            log::debug!("{} ({}): no reference match", record.name, record.id);
            return EnrichedRecord::unresolved(record);
        };

        log::info!("{} ({}): searching remote in {province}", record.name, record.id);

        let mut attempt = 0;
        loop {
            let outcome = remote.resolve(&record.name, province).await;
            self.throttle.pause().await;

            match outcome {
                RemoteOutcome::Found(candidate) => {
                    log::info!(
                        "{} ({}): remote ({}, {})",
                        record.name,
                        record.id,
                        candidate.latitude,
                        candidate.longitude
                    );
                    return EnrichedRecord::resolved(record, candidate);
                }
                RemoteOutcome::NotFound => {
                    log::info!("{} ({}): no coordinates found", record.name, record.id);
                    return EnrichedRecord::unresolved(record);
                }
                RemoteOutcome::TransientError(e) => {
                    summary.remote_errors += 1;
                    if attempt >= self.max_retries {
                        log::warn!(
                            "{} ({}): remote lookup failed, leaving unresolved: {e}",
                            record.name,
                            record.id
                        );
                        return EnrichedRecord::unresolved(record);
                    }
                    attempt += 1;
                    log::debug!(
                        "{} ({}): retrying remote lookup ({attempt}/{})",
                        record.name,
                        record.id,
                        self.max_retries
                    );
                }
            }
        }
    }
}
