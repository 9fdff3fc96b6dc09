//! Application Layer
//!
//! Use cases that drive the domain through its ports.

mod location_service;

pub use location_service::{CheckError, LocationService};
