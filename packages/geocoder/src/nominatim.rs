//! Nominatim / OpenStreetMap geocoder client.
//!
//! Used as a fallback when the reference dataset has no match. Nominatim
//! has strict rate limits: **1 request per second** maximum, and requests
//! without an identifying `User-Agent` are blocked.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use async_trait::async_trait;
use kabkota_geocoder_models::{CandidateSource, CoordinateCandidate};

use crate::service_registry::RemoteService;
use crate::{GeocodeError, RemoteLookup, RemoteOutcome};

/// Country appended to every free-form query.
pub const COUNTRY_NAME: &str = "Indonesia";

/// Builds the free-form query `"{city}, {province}, Indonesia"`.
#[must_use]
pub fn build_query(city: &str, province: &str) -> String {
    format!("{city}, {province}, {COUNTRY_NAME}")
}

/// A Nominatim search client restricted to a single country.
///
/// The caller is responsible for rate limiting (see `rate_limit_ms` in the
/// service TOML configuration).
#[derive(Debug, Clone)]
pub struct NominatimResolver {
    client: reqwest::Client,
    base_url: String,
    country_code: String,
}

impl NominatimResolver {
    /// Creates a resolver whose client sends the service's `User-Agent`
    /// on every request and gives up after `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(service: &RemoteService) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(service.user_agent.as_str())
            .timeout(Duration::from_secs(service.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: service.base_url.clone(),
            country_code: service.country_code.clone(),
        })
    }

    /// Geocodes a free-form query, requesting a single result.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the HTTP request fails, the service
    /// answers with a non-success status, or the body cannot be parsed.
    pub async fn search(&self, query: &str) -> Result<Option<CoordinateCandidate>, GeocodeError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", self.country_code.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }
        if !status.is_success() {
            return Err(GeocodeError::Status {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

#[async_trait]
impl RemoteLookup for NominatimResolver {
    async fn resolve(&self, city: &str, province: &str) -> RemoteOutcome {
        let query = build_query(city, province);
        log::debug!("Nominatim query: '{query}'");

        match self.search(&query).await {
            Ok(Some(candidate)) => RemoteOutcome::Found(candidate),
            Ok(None) => RemoteOutcome::NotFound,
            Err(e) => {
                log::warn!("Nominatim error for '{query}': {e}");
                RemoteOutcome::TransientError(e)
            }
        }
    }
}

/// Reads a coordinate that Nominatim encodes as a string, accepting a bare
/// number as well.
fn coordinate(value: &serde_json::Value) -> Option<f64> {
    value
        .as_str()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .or_else(|| value.as_f64())
}

/// Parses Nominatim JSON response.
fn parse_response(body: &serde_json::Value) -> Result<Option<CoordinateCandidate>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let latitude = coordinate(&first["lat"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lat in Nominatim response".to_string(),
    })?;

    let longitude = coordinate(&first["lon"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lon in Nominatim response".to_string(),
    })?;

    Ok(Some(CoordinateCandidate {
        latitude,
        longitude,
        source: CandidateSource::Remote,
    }))
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    #[test]
    fn builds_city_province_country_query() {
        assert_eq!(
            build_query("Bogor", "Jawa Barat"),
            "Bogor, Jawa Barat, Indonesia"
        );
        assert_eq!(
            build_query("Nonexistentville", "Indonesia"),
            "Nonexistentville, Indonesia, Indonesia"
        );
    }

    #[test]
    fn parses_nominatim_result() {
        let body = serde_json::json!([{
            "lat": "-6.5950",
            "lon": "106.7900",
            "display_name": "Bogor, Jawa Barat, Indonesia"
        }]);
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.latitude - -6.595).abs() < 1e-4);
        assert!((result.longitude - 106.79).abs() < 1e-4);
        assert_eq!(result.source, CandidateSource::Remote);
    }

    #[test]
    fn parses_numeric_coordinates() {
        let body = serde_json::json!([{ "lat": -0.5, "lon": 117.15 }]);
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.latitude - -0.5).abs() < 1e-9);
    }

    #[test]
    fn parses_nominatim_empty() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_non_array_body() {
        let body = serde_json::json!({ "error": "Unable to geocode" });
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_unparseable_latitude() {
        let body = serde_json::json!([{ "lat": "north", "lon": "106.79" }]);
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_missing_longitude() {
        let body = serde_json::json!([{ "lat": "-6.59" }]);
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    /// Serves a single canned response on a loopback port. The task
    /// yields the raw request head it received.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (RemoteService, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let service = RemoteService {
            base_url: format!("http://{}/search", listener.local_addr().unwrap()),
            ..crate::service_registry::remote_service()
        };

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0_u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\n\
                 content-type: application/json\r\n\
                 content-length: {}\r\n\
                 connection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8(head).unwrap()
        });

        (service, handle)
    }

    fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
        head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    #[tokio::test]
    async fn sends_country_restricted_single_result_query() {
        let (service, server) = serve_once(
            "200 OK",
            r#"[{"lat":"-6.59","lon":"106.79","display_name":"Bogor"}]"#,
        )
        .await;
        let resolver = NominatimResolver::new(&service).unwrap();

        let outcome = resolver.resolve("Bogor", "Jawa Barat").await;
        let head = server.await.unwrap();

        assert_eq!(
            head.lines().next().unwrap(),
            "GET /search?q=Bogor%2C+Jawa+Barat%2C+Indonesia&format=json&limit=1&countrycodes=id HTTP/1.1"
        );
        assert_eq!(
            header(&head, "user-agent"),
            Some("KabupatenKotaGeocoder/1.0")
        );

        let RemoteOutcome::Found(candidate) = outcome else {
            panic!("expected Found, got {outcome:?}");
        };
        assert!((candidate.latitude - -6.59).abs() < 1e-9);
        assert!((candidate.longitude - 106.79).abs() < 1e-9);
        assert_eq!(candidate.source, CandidateSource::Remote);
    }

    #[tokio::test]
    async fn empty_result_list_is_not_found() {
        let (service, server) = serve_once("200 OK", "[]").await;
        let resolver = NominatimResolver::new(&service).unwrap();

        let outcome = resolver.resolve("Nonexistentville", "Indonesia").await;
        server.await.unwrap();

        assert!(matches!(outcome, RemoteOutcome::NotFound));
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let (service, server) = serve_once("500 Internal Server Error", "").await;
        let resolver = NominatimResolver::new(&service).unwrap();

        let outcome = resolver.resolve("Bogor", "Jawa Barat").await;
        server.await.unwrap();

        assert!(matches!(
            outcome,
            RemoteOutcome::TransientError(GeocodeError::Status { status: 500 })
        ));
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited() {
        let (service, server) = serve_once("429 Too Many Requests", "").await;
        let resolver = NominatimResolver::new(&service).unwrap();

        let outcome = resolver.resolve("Bogor", "Jawa Barat").await;
        server.await.unwrap();

        assert!(matches!(
            outcome,
            RemoteOutcome::TransientError(GeocodeError::RateLimited)
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_transient() {
        let (service, server) = serve_once("200 OK", r#"{"error":"Unable to geocode"}"#).await;
        let resolver = NominatimResolver::new(&service).unwrap();

        let outcome = resolver.resolve("Bogor", "Jawa Barat").await;
        server.await.unwrap();

        assert!(matches!(
            outcome,
            RemoteOutcome::TransientError(GeocodeError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn refused_connection_is_transient() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let service = RemoteService {
            base_url: format!("http://127.0.0.1:{port}/search"),
            ..crate::service_registry::remote_service()
        };
        let resolver = NominatimResolver::new(&service).unwrap();

        let outcome = resolver.resolve("Bogor", "Jawa Barat").await;
        assert!(matches!(
            outcome,
            RemoteOutcome::TransientError(GeocodeError::Http(_))
        ));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let service = RemoteService {
            base_url: format!("http://{}/search", listener.local_addr().unwrap()),
            timeout_secs: 1,
            ..crate::service_registry::remote_service()
        };
        // Accept and hold the connection without ever answering.
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });
        let resolver = NominatimResolver::new(&service).unwrap();

        let outcome = resolver.resolve("Bogor", "Jawa Barat").await;
        server.abort();

        let RemoteOutcome::TransientError(GeocodeError::Http(e)) = outcome else {
            panic!("expected an HTTP error, got {outcome:?}");
        };
        assert!(e.is_timeout());
    }
}
