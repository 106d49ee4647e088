//! Access to the external game catalog.

/// Catalog client with demo-mode and failure fallbacks.
pub mod client;
/// Bundled sample dataset.
pub mod demo;
/// Raw record to [`crate::models::Game`] conversion.
pub mod normalize;
/// Wire shapes of catalog responses.
pub mod raw;
/// Facade composing client and normalizer.
pub mod service;
/// HTTP transport seam.
pub mod transport;

pub use client::{CatalogClient, EnrichmentPolicy, Listing, Mode, Origin};
pub use normalize::normalize;
pub use raw::RawGame;
pub use service::{CatalogService, GamePage, PageQuery, FALLBACK_ADVISORY};
pub use transport::{HttpTransport, Transport};
