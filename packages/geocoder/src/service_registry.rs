//! Compile-time configuration of the remote geocoding service.
//!
//! The provider is defined in `services/nominatim.toml`, embedded at
//! compile time. A couple of fields can be overridden from the
//! environment so a self-hosted Nominatim can be used without a rebuild.

use serde::Deserialize;

/// Environment variable overriding [`RemoteService::base_url`].
pub const BASE_URL_ENV: &str = "KABKOTA_NOMINATIM_URL";

/// Environment variable overriding [`RemoteService::user_agent`].
pub const USER_AGENT_ENV: &str = "KABKOTA_USER_AGENT";

/// A remote geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteService {
    /// Human-readable name.
    pub name: String,
    /// Search endpoint (e.g., `"https://nominatim.openstreetmap.org/search"`).
    pub base_url: String,
    /// Client identification sent as `User-Agent`.
    pub user_agent: String,
    /// ISO country code results are restricted to.
    pub country_code: String,
    /// Minimum delay between requests in milliseconds.
    pub rate_limit_ms: u64,
    /// Per-request timeout in seconds, covering connect through body.
    pub timeout_secs: u64,
}

impl RemoteService {
    /// Applies [`BASE_URL_ENV`] and [`USER_AGENT_ENV`] when they are set
    /// to a non-empty value.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = non_empty_env(BASE_URL_ENV) {
            log::info!("Using {BASE_URL_ENV}={url}");
            self.base_url = url;
        }
        if let Some(agent) = non_empty_env(USER_AGENT_ENV) {
            self.user_agent = agent;
        }
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

const NOMINATIM_TOML: &str = include_str!("../services/nominatim.toml");

/// Returns the embedded remote service configuration.
///
/// # Panics
///
/// Panics if the TOML config is malformed (this is a compile-time guarantee
/// since the config is embedded).
#[must_use]
pub fn remote_service() -> RemoteService {
    toml::de::from_str(NOMINATIM_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse geocoding service 'nominatim': {e}"))
}
