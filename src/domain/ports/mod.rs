mod country_lookup;
mod resolution_cache;

pub use country_lookup::CountryLookup;
pub use resolution_cache::ResolutionCache;
