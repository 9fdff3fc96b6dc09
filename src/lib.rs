//! geolocate-ip Library
//!
//! This module exposes the service components for use in integration
//! tests and as a library.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::inbound::{ApiServer, BasicAuth};
pub use adapters::outbound::{DashMapResolutionCache, GeoLiteClient, GeoLiteConfig};
pub use application::{CheckError, LocationService};
pub use config::{load_config, Config};
pub use domain::entities::{GeoLookupRequest, GeoLookupResult};
pub use domain::errors::{LookupError, ParseError, ValidationError};
pub use domain::ports::{CountryLookup, ResolutionCache};
pub use domain::value_objects::CanonicalAddress;
pub use infrastructure::ShutdownController;
