//! Domain Layer
//!
//! Value objects, entities, errors, ports and pure domain services.
//! Nothing in here knows about HTTP or the provider's wire format.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use value_objects::CanonicalAddress;
