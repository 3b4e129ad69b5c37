#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate enrichment for a kabupaten/kota table.
//!
//! Reads `id,name,province_id` rows, resolves each one through the
//! [`pipeline::ResolutionPipeline`] (reference dataset first, Nominatim
//! second), and writes `id,name,province_id,latitude,longitude,source`
//! rows through a [`io::RecordSink`].
//!
//! Records are processed strictly one at a time. The remote tier is
//! followed by a [`throttle::Throttle`] pause to stay within the public
//! Nominatim usage policy.

pub mod io;
pub mod pipeline;
pub mod throttle;

use thiserror::Error;

/// Default input table, relative to the working directory.
pub const DEFAULT_INPUT: &str = "kabupaten-kota_rows.csv";

/// Default output table, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "kabupaten-kota-dengan-koordinat.csv";

/// Errors that abort an enrichment run.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// I/O error (file open/read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input table could not be parsed or the output could not be
    /// serialized.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A runtime reference dataset could not be loaded.
    #[error("Reference dataset error: {0}")]
    Reference(#[from] kabkota_geocoder::reference::ReferenceError),

    /// The remote client could not be constructed.
    #[error("Geocoder error: {0}")]
    Geocode(#[from] kabkota_geocoder::GeocodeError),
}
