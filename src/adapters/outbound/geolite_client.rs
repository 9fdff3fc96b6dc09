//! GeoLite Country Client
//!
//! Implements CountryLookup against the MaxMind GeoLite web service
//! (`/geoip/v2.1/country/{ip}`).

use crate::domain::errors::LookupError;
use crate::domain::ports::CountryLookup;
use crate::domain::value_objects::CanonicalAddress;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Locale key of the country name we report.
const ENGLISH: &str = "en";

/// Configuration for the GeoLite client.
#[derive(Debug, Clone)]
pub struct GeoLiteConfig {
    /// Provider base URL, without trailing path
    pub base_url: String,
    /// Account ID used as the basic auth username
    pub user_id: String,
    /// License key used as the basic auth password
    pub license_key: String,
    /// Hard deadline for one lookup, including reading the body
    pub lookup_timeout: Duration,
    /// Client-wide ceiling for any request made by the client
    pub client_timeout: Duration,
}

impl Default for GeoLiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://geolite.info".to_string(),
            user_id: String::new(),
            license_key: String::new(),
            lookup_timeout: Duration::from_secs(1),
            client_timeout: Duration::from_secs(3),
        }
    }
}

/// Successful country response.
#[derive(Debug, Deserialize)]
struct CountryResponse {
    #[serde(default)]
    country: Option<CountryRecord>,
}

/// Only the fields we read; `confidence` and `geoname_id` are ignored.
#[derive(Debug, Deserialize)]
struct CountryRecord {
    #[serde(default)]
    iso_code: Option<String>,
    /// `null` and a missing key both decode to `None`.
    #[serde(default)]
    names: Option<HashMap<String, String>>,
}

/// Error body returned with 4xx/5xx responses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<ErrorCode>,
    #[serde(default)]
    error: String,
}

/// The provider documents string codes; older payloads carry integers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorCode {
    Number(i64),
    Text(String),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// GeoLite web service client.
///
/// Holds one pooled `reqwest::Client` and the credentials; both are
/// read-only after construction. Makes exactly one attempt per lookup.
pub struct GeoLiteClient {
    config: GeoLiteConfig,
    client: reqwest::Client,
}

impl GeoLiteClient {
    /// Create a client from configuration.
    pub fn new(config: GeoLiteConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.client_timeout)
            .build()?;
        Ok(Self { config, client })
    }

    /// URL of the country endpoint for an address.
    fn country_url(&self, address: &CanonicalAddress) -> String {
        format!(
            "{}/geoip/v2.1/country/{}?pretty",
            self.config.base_url.trim_end_matches('/'),
            address
        )
    }

    /// Map a reqwest failure to the lookup taxonomy.
    fn transport_error(err: reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout
        } else {
            LookupError::Transport(err.to_string())
        }
    }

    /// Decode the error body of a failed response.
    fn provider_error(status: reqwest::StatusCode, body: &[u8]) -> LookupError {
        match serde_json::from_slice::<ErrorResponse>(body) {
            Ok(err) => LookupError::Provider {
                code: err
                    .code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| status.as_u16().to_string()),
                message: err.error,
            },
            Err(e) => LookupError::Decode(format!("error body for status {}: {}", status, e)),
        }
    }

    /// Pick the English name out of a decoded response.
    fn english_name(response: CountryResponse) -> Result<String, LookupError> {
        let Some(country) = response.country else {
            return Err(LookupError::NoData);
        };
        let names = match country.names {
            Some(names) if !names.is_empty() => names,
            _ => return Err(LookupError::NoData),
        };

        tracing::debug!(
            iso_code = country.iso_code.as_deref().unwrap_or("-"),
            locales = names.len(),
            "decoded country record"
        );

        match names.get(ENGLISH) {
            Some(name) if !name.is_empty() => Ok(name.clone()),
            _ => Err(LookupError::NoEnglishName),
        }
    }
}

#[async_trait]
impl CountryLookup for GeoLiteClient {
    async fn lookup_country(&self, address: &CanonicalAddress) -> Result<String, LookupError> {
        let url = self.country_url(address);
        tracing::debug!(%address, "querying geolocation provider");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.user_id, Some(&self.config.license_key))
            .timeout(self.config.lookup_timeout)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(Self::transport_error)?;

        if status.is_client_error() || status.is_server_error() {
            return Err(Self::provider_error(status, &body));
        }

        tracing::debug!(%address, status = status.as_u16(), "geolocation provider responded");

        let decoded: CountryResponse =
            serde_json::from_slice(&body).map_err(|e| LookupError::Decode(e.to_string()))?;

        Self::english_name(decoded)
    }
}
