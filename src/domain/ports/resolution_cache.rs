//! Resolution Cache Port
//!
//! Defines the interface for remembering resolved countries per address.

use crate::domain::value_objects::CanonicalAddress;

/// Process-wide memo of address to country name.
///
/// Implementations must be safe for concurrent use from many request
/// tasks. Once an address has a value it is never replaced.
pub trait ResolutionCache: Send + Sync {
    /// Get the cached country for an address, if any.
    fn get(&self, address: &CanonicalAddress) -> Option<String>;

    /// Record the country for an address.
    ///
    /// Has no effect if the address is already cached.
    fn put(&self, address: CanonicalAddress, country_name: String);

    /// Number of cached addresses.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
