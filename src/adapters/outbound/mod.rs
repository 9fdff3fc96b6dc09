mod dashmap_resolution_cache;
mod geolite_client;

pub use dashmap_resolution_cache::DashMapResolutionCache;
pub use geolite_client::{GeoLiteClient, GeoLiteConfig};
