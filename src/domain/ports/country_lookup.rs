//! Country Lookup Port
//!
//! Defines the interface for resolving an IP address to a country name
//! through an external geolocation provider.

use crate::domain::errors::LookupError;
use crate::domain::value_objects::CanonicalAddress;
use async_trait::async_trait;

/// Resolver for IP address to English country name.
///
/// This is an outbound port that abstracts the geolocation provider.
/// Implementations make a single bounded attempt per call and hold no
/// cache of their own.
#[async_trait]
pub trait CountryLookup: Send + Sync {
    /// Resolve the English country name for an address.
    async fn lookup_country(&self, address: &CanonicalAddress) -> Result<String, LookupError>;
}
