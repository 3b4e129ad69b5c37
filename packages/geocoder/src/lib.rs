#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate resolvers for Indonesian regencies (kabupaten) and cities
//! (kota).
//!
//! Resolution is tiered:
//!
//! 1. **Reference dataset** ([`reference`]): an embedded table of
//!    administrative units with coordinates. Exact, case-insensitive city
//!    name match, deduplicated by regency code.
//! 2. **Nominatim / OpenStreetMap** ([`nominatim`]): free-text search,
//!    1 req/sec rate limit. Only consulted when the reference dataset has
//!    no match.
//!
//! The tiers are exposed through the [`ReferenceLookup`] and
//! [`RemoteLookup`] traits so the pipeline can be driven by test doubles.
//! Province codes are translated to names by [`province::ProvinceCodeTable`]
//! to sharpen remote queries.

pub mod nominatim;
pub mod progress;
pub mod province;
pub mod reference;
pub mod service_registry;

use async_trait::async_trait;
use kabkota_geocoder_models::CoordinateCandidate;
use thiserror::Error;

/// Errors from remote geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Unexpected HTTP status {status}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Outcome of a single remote lookup.
///
/// Keeps "the service has nothing for this query" apart from "the query
/// never got a usable answer", so callers can retry only the latter.
#[derive(Debug)]
pub enum RemoteOutcome {
    /// The service returned coordinates.
    Found(CoordinateCandidate),
    /// The service answered successfully with zero results.
    NotFound,
    /// Transport, status, or parse failure.
    TransientError(GeocodeError),
}

/// First-choice tier: a local lookup with no I/O.
pub trait ReferenceLookup: Send + Sync {
    /// Returns every deduplicated candidate for `city`, in dataset order.
    ///
    /// An empty vector means "no match" and is not an error.
    fn resolve(&self, city: &str) -> Vec<CoordinateCandidate>;
}

/// Fallback tier: a remote geocoding service.
#[async_trait]
pub trait RemoteLookup: Send + Sync {
    /// Looks up `city` within `province`, returning at most one candidate.
    async fn resolve(&self, city: &str, province: &str) -> RemoteOutcome;
}
