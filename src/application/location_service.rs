//! Location Service - Main application use case
//!
//! Orchestrates one location check: validate the request, parse the
//! address, resolve its country through the cache or the provider, and
//! compare it against the caller's candidates.

use crate::domain::entities::{GeoLookupRequest, GeoLookupResult};
use crate::domain::errors::{LookupError, ParseError, ValidationError};
use crate::domain::ports::{CountryLookup, ResolutionCache};
use crate::domain::services::MatchEvaluator;
use crate::domain::value_objects::CanonicalAddress;
use std::sync::Arc;
use thiserror::Error;

/// Why a check could not produce a match decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Location check service - main application use case.
///
/// Owns shared references to the provider port and the resolution cache.
/// One instance is built at startup and shared by every request task.
pub struct LocationService {
    lookup: Arc<dyn CountryLookup>,
    cache: Arc<dyn ResolutionCache>,
}

impl LocationService {
    /// Create a new location service.
    pub fn new(lookup: Arc<dyn CountryLookup>, cache: Arc<dyn ResolutionCache>) -> Self {
        Self { lookup, cache }
    }

    /// Check whether the request's address is in one of its countries.
    ///
    /// Returns `Ok` with `location_check_pass == false` when the address
    /// resolved but no candidate matched. Returns `Err` when the request
    /// is invalid or the country could not be resolved.
    pub async fn check_location(
        &self,
        request: &GeoLookupRequest,
    ) -> Result<GeoLookupResult, CheckError> {
        request.validate()?;

        let address = CanonicalAddress::parse(&request.ip_address)?;
        let country = self.resolve_country(&address).await?;

        let result = GeoLookupResult::from(MatchEvaluator::evaluate(
            &country,
            &request.country_names,
        ));

        tracing::info!(
            %address,
            country = %country,
            pass = result.location_check_pass,
            "location check evaluated"
        );

        Ok(result)
    }

    /// Resolve the country for an address, consulting the cache first.
    ///
    /// A miss makes one provider call; a successful answer is cached.
    /// Concurrent misses for the same address may each call the provider.
    pub async fn resolve_country(&self, address: &CanonicalAddress) -> Result<String, LookupError> {
        if let Some(country) = self.cache.get(address) {
            tracing::debug!(%address, country = %country, "resolution cache hit");
            return Ok(country);
        }

        match self.lookup.lookup_country(address).await {
            Ok(country) => {
                self.cache.put(*address, country.clone());
                tracing::debug!(
                    %address,
                    country = %country,
                    cached = self.cache.len(),
                    "resolved country from provider"
                );
                Ok(country)
            }
            Err(e) => {
                tracing::error!(%address, kind = e.kind(), error = %e, "geolocation lookup failed");
                Err(e)
            }
        }
    }

    /// Number of addresses currently cached.
    pub fn cached_addresses(&self) -> usize {
        self.cache.len()
    }
}
