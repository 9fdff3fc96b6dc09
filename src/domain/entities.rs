//! Domain Entities - Core business objects
//!
//! These entities represent one location check: what the caller asked
//! for and what the service answered. They have no framework dependencies.

use crate::domain::errors::ValidationError;
use serde::{Deserialize, Serialize};

/// A request to check whether an IP address is located in one of a set
/// of countries.
///
/// Transient: exists only for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeoLookupRequest {
    /// Textual IP address, not yet parsed
    pub ip_address: String,
    /// Acceptable English country names, in caller order
    pub country_names: Vec<String>,
}

impl GeoLookupRequest {
    pub fn new(ip_address: impl Into<String>, country_names: Vec<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            country_names,
        }
    }

    /// Check that both fields carry data.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ip_address.is_empty() {
            return Err(ValidationError::MissingIpAddress);
        }
        if self.country_names.is_empty() {
            return Err(ValidationError::MissingCountryNames);
        }
        Ok(())
    }
}

/// Outcome of comparing a resolved country against the candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryMatch {
    pub matched: bool,
    /// The matching candidate, empty when nothing matched
    pub matched_name: String,
}

impl CountryMatch {
    pub fn found(name: impl Into<String>) -> Self {
        Self {
            matched: true,
            matched_name: name.into(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

/// Result returned to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLookupResult {
    pub location_check_pass: bool,
    /// Matched country name, empty if no match
    pub country_name: String,
}

impl From<CountryMatch> for GeoLookupResult {
    fn from(m: CountryMatch) -> Self {
        Self {
            location_check_pass: m.matched,
            country_name: m.matched_name,
        }
    }
}
