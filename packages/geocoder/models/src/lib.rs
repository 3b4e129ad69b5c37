#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record and coordinate types for the kabupaten/kota geocoder.
//!
//! This crate contains only data types and simple conversions. It has no
//! I/O and no network dependencies, so both the resolution pipeline and
//! the output writers can share it.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One row of the input region table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Opaque region identifier (e.g., `"3201"`).
    pub id: String,
    /// City or regency name as written in the source table.
    pub name: String,
    /// Two-character province code (e.g., `"32"`).
    pub province_id: String,
}

impl InputRecord {
    /// Convenience constructor, mostly for tests.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        province_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            province_id: province_id.into(),
        }
    }
}

/// Which tier produced a [`CoordinateCandidate`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum CandidateSource {
    /// Embedded reference dataset.
    Reference,
    /// Remote geocoding service.
    Remote,
}

/// Where the coordinates of an [`EnrichedRecord`] came from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum CoordinateSource {
    /// Resolved from the embedded reference dataset.
    Reference,
    /// Resolved by the remote geocoding service.
    Remote,
    /// No tier produced coordinates.
    Unresolved,
}

impl From<CandidateSource> for CoordinateSource {
    fn from(value: CandidateSource) -> Self {
        match value {
            CandidateSource::Reference => Self::Reference,
            CandidateSource::Remote => Self::Remote,
        }
    }
}

/// A latitude/longitude pair produced by one resolution tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateCandidate {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Tier that produced this candidate.
    pub source: CandidateSource,
}

/// An [`InputRecord`] with its resolved coordinates.
///
/// Unresolved records carry `None` for both coordinates, which the CSV
/// writer renders as empty fields rather than `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    /// Region identifier, copied from the input.
    pub id: String,
    /// City or regency name, copied from the input.
    pub name: String,
    /// Province code, copied from the input.
    pub province_id: String,
    /// Latitude (WGS84), or `None` when unresolved.
    pub latitude: Option<f64>,
    /// Longitude (WGS84), or `None` when unresolved.
    pub longitude: Option<f64>,
    /// Tier that resolved the record.
    pub source: CoordinateSource,
}

impl EnrichedRecord {
    /// Builds a resolved record from `record` and the winning candidate.
    #[must_use]
    pub fn resolved(record: &InputRecord, candidate: CoordinateCandidate) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            province_id: record.province_id.clone(),
            latitude: Some(candidate.latitude),
            longitude: Some(candidate.longitude),
            source: candidate.source.into(),
        }
    }

    /// Builds an unresolved record with empty coordinates.
    #[must_use]
    pub fn unresolved(record: &InputRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            province_id: record.province_id.clone(),
            latitude: None,
            longitude: None,
            source: CoordinateSource::Unresolved,
        }
    }

    /// Whether any tier produced coordinates for this record.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        !matches!(self.source, CoordinateSource::Unresolved)
    }
}

/// Per-run tallies reported once all records are processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    /// Records resolved from the reference dataset.
    pub reference: u64,
    /// Records resolved by the remote service.
    pub remote: u64,
    /// Records with no coordinates.
    pub unresolved: u64,
    /// Remote attempts that failed with a transient error.
    pub remote_errors: u64,
}

impl ResolutionSummary {
    /// Counts `record` under its source.
    pub fn record(&mut self, record: &EnrichedRecord) {
        match record.source {
            CoordinateSource::Reference => self.reference += 1,
            CoordinateSource::Remote => self.remote += 1,
            CoordinateSource::Unresolved => self.unresolved += 1,
        }
    }

    /// Total number of records counted.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.reference + self.remote + self.unresolved
    }
}

impl std::fmt::Display for ResolutionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} reference, {} remote, {} unresolved",
            self.reference, self.remote, self.unresolved
        )?;
        if self.remote_errors > 0 {
            write!(f, " ({} remote errors)", self.remote_errors)?;
        }
        Ok(())
    }
}
