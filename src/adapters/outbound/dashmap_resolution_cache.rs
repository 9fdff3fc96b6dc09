//! DashMap Resolution Cache
//!
//! Implements ResolutionCache using DashMap for sharded concurrent access.

use crate::domain::ports::ResolutionCache;
use crate::domain::value_objects::CanonicalAddress;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// DashMap-backed resolution cache.
///
/// Entries live for the process lifetime. With a non-zero `max_entries`
/// the cache stops admitting new addresses once full; existing entries
/// are never evicted.
pub struct DashMapResolutionCache {
    entries: DashMap<CanonicalAddress, String>,
    max_entries: usize,
}

impl DashMapResolutionCache {
    /// Create an unbounded cache.
    pub fn new() -> Self {
        Self::with_max_entries(0)
    }

    /// Create a cache admitting at most `max_entries` addresses (0 = unbounded).
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    fn is_full(&self) -> bool {
        self.max_entries > 0 && self.entries.len() >= self.max_entries
    }
}

impl Default for DashMapResolutionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionCache for DashMapResolutionCache {
    fn get(&self, address: &CanonicalAddress) -> Option<String> {
        self.entries.get(address).map(|e| e.value().clone())
    }

    fn put(&self, address: CanonicalAddress, country_name: String) {
        // Checked before taking the shard lock; may admit a few extra
        // entries under contention.
        if self.is_full() {
            tracing::debug!(%address, "resolution cache full, not storing");
            return;
        }

        match self.entries.entry(address) {
            Entry::Occupied(existing) => {
                if existing.get() != &country_name {
                    tracing::warn!(
                        %address,
                        cached = %existing.get(),
                        ignored = %country_name,
                        "provider answer differs from cached country"
                    );
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(country_name);
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
