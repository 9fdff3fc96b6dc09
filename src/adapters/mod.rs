//! Adapters Layer
//!
//! Inbound adapters expose the application over HTTP; outbound adapters
//! implement the domain ports against the provider and in-memory storage.

pub mod inbound;
pub mod outbound;
