//! Domain Errors
//!
//! Error taxonomy for one location check. None of these are fatal to the
//! process; each is scoped to a single request.

use thiserror::Error;

/// The inbound payload is missing required data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("ip_address is required")]
    MissingIpAddress,
    #[error("country_names must contain at least one entry")]
    MissingCountryNames,
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// The textual address could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("ip address is empty")]
    Empty,
    #[error("invalid ip address: {0:?}")]
    Malformed(String),
}

/// The outbound geolocation query failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("geolocation lookup timed out")]
    Timeout,
    #[error("geolocation provider unreachable: {0}")]
    Transport(String),
    #[error("geolocation provider error {code}: {message}")]
    Provider { code: String, message: String },
    #[error("could not decode geolocation provider response: {0}")]
    Decode(String),
    #[error("geoIP lookup processed successfully but no information returned")]
    NoData,
    #[error("geoIP lookup processed successfully but no english name found")]
    NoEnglishName,
}

impl LookupError {
    /// Short machine-readable kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Transport(_) => "transport",
            Self::Provider { .. } => "provider_error",
            Self::Decode(_) => "decode_error",
            Self::NoData => "no_data",
            Self::NoEnglishName => "no_english_name",
        }
    }
}
