//! Embedded reference dataset of administrative units with coordinates.
//!
//! Each entry carries a dotted hierarchical administrative code
//! (`32.71.01.1001`), its province, city, and a point coordinate. The
//! first five characters of the code (`32.71`) identify the regency or
//! city, which is the unit the resolver deduplicates on.
//!
//! A compact dataset is compiled in via [`include_str!`]; a complete dump
//! with the same columns can be loaded at runtime with
//! [`ReferenceDataset::from_path`].

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use kabkota_geocoder_models::{CandidateSource, CoordinateCandidate};
use serde::Deserialize;
use thiserror::Error;

use crate::ReferenceLookup;

/// Number of leading code characters that identify a regency or city.
pub const REGENCY_CODE_LEN: usize = 5;

const EMBEDDED_CSV: &str = include_str!("../data/reference.csv");

/// Errors from loading a reference dataset.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// Dataset file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset is not valid CSV or a row has the wrong shape.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of the reference dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReferenceEntry {
    /// Dotted administrative code (e.g., `"32.71.01.1001"`).
    pub code: String,
    /// Province name.
    pub province: String,
    /// City or regency name. May be empty for units above city level.
    #[serde(default)]
    pub city: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

impl ReferenceEntry {
    /// The regency/city part of [`code`](Self::code): its first
    /// [`REGENCY_CODE_LEN`] characters, or the whole code when shorter.
    #[must_use]
    pub fn regency_code(&self) -> &str {
        self.code
            .char_indices()
            .nth(REGENCY_CODE_LEN)
            .map_or(self.code.as_str(), |(idx, _)| &self.code[..idx])
    }

    #[must_use]
    const fn candidate(&self) -> CoordinateCandidate {
        CoordinateCandidate {
            latitude: self.latitude,
            longitude: self.longitude,
            source: CandidateSource::Reference,
        }
    }
}

/// An ordered, immutable collection of [`ReferenceEntry`] rows.
#[derive(Debug, Clone, Default)]
pub struct ReferenceDataset {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceDataset {
    /// Returns the dataset compiled into this crate.
    ///
    /// # Panics
    ///
    /// Panics if the embedded CSV is malformed (this is a build-time
    /// guarantee since the file ships with the crate).
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_reader(EMBEDDED_CSV.as_bytes())
            .unwrap_or_else(|e| panic!("Failed to parse embedded reference dataset: {e}"))
    }

    /// Loads a dataset from a CSV file with the columns
    /// `code,province,city,latitude,longitude`.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] if the file cannot be read or any row
    /// fails to parse.
    pub fn from_path(path: &Path) -> Result<Self, ReferenceError> {
        let file = std::fs::File::open(path)?;
        let dataset = Self::from_reader(file)?;
        log::info!(
            "Loaded {} reference entries from {}",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Parses a dataset from any CSV reader.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Csv`] if any row fails to parse.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ReferenceError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let entries = reader
            .deserialize()
            .collect::<Result<Vec<ReferenceEntry>, _>>()?;

        Ok(Self { entries })
    }

    /// Entries in dataset order.
    #[must_use]
    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dataset has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<ReferenceEntry>> for ReferenceDataset {
    fn from(entries: Vec<ReferenceEntry>) -> Self {
        Self { entries }
    }
}

/// Exact-name resolver over a [`ReferenceDataset`].
///
/// Matching lowercases both sides and otherwise compares verbatim: no
/// whitespace trimming, no diacritic folding, no fuzzy matching.
///
/// When several entries match and share a regency code, the entry with the
/// lowest dataset index wins. Surviving matches are returned in dataset
/// order, so the result is reproducible for a given dataset file.
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    dataset: ReferenceDataset,
}

impl ReferenceResolver {
    #[must_use]
    pub const fn new(dataset: ReferenceDataset) -> Self {
        Self { dataset }
    }

    /// Returns the matching entries for `city`, one per regency code.
    #[must_use]
    pub fn matches(&self, city: &str) -> Vec<&ReferenceEntry> {
        let needle = city.to_lowercase();
        let mut seen = BTreeSet::new();

        self.dataset
            .entries()
            .iter()
            .filter(|entry| !entry.city.is_empty() && entry.city.to_lowercase() == needle)
            .filter(|&entry| seen.insert(entry.regency_code()))
            .collect()
    }

    #[must_use]
    pub const fn dataset(&self) -> &ReferenceDataset {
        &self.dataset
    }
}

impl ReferenceLookup for ReferenceResolver {
    fn resolve(&self, city: &str) -> Vec<CoordinateCandidate> {
        self.matches(city)
            .into_iter()
            .map(ReferenceEntry::candidate)
            .collect()
    }
}
