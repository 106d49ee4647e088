#![allow(missing_docs)]

//! Wire shapes returned by the catalog API.
//!
//! Every field is optional so that sparse or partially-null records still
//! decode; normalization substitutes defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A game record as served by the list, search and by-id endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawGame {
    pub id: u64,
    pub name: Option<String>,
    /// Rich-text description (HTML).
    pub description: Option<String>,
    /// Pre-stripped plain-text description.
    pub description_raw: Option<String>,
    pub rating: Option<f64>,
    pub rating_top: Option<f64>,
    pub ratings_count: Option<u32>,
    pub metacritic: Option<u32>,
    pub released: Option<String>,
    pub background_image: Option<String>,
    pub genres: Option<Vec<NamedRef>>,
    pub platforms: Option<Vec<PlatformEntry>>,
    pub developers: Option<Vec<NamedRef>>,
    pub publishers: Option<Vec<NamedRef>>,
    pub playtime: Option<u32>,
    pub website: Option<String>,
    pub stores: Option<Vec<StoreEntry>>,
}

/// `{ id, name }` pair used for genres, developers and publishers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedRef {
    pub id: Option<u64>,
    pub name: Option<String>,
}

/// Entry of the `platforms` array, which nests the platform itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformEntry {
    pub platform: Option<NamedRef>,
}

/// Storefront listing for a game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreEntry {
    pub id: Option<u64>,
    pub store: Option<StoreRef>,
    pub url: Option<String>,
}

/// Storefront identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreRef {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub domain: Option<String>,
}

/// Paginated envelope of the list endpoints. `results` is kept undecoded so
/// a single malformed record can be skipped without losing the page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPage {
    pub count: Option<u64>,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Option<Vec<Value>>,
}

impl RawPage {
    /// Decode every result, skipping entries that do not fit [`RawGame`].
    pub fn into_games(self) -> Vec<RawGame> {
        self.results
            .unwrap_or_default()
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<RawGame>(value) {
                Ok(game) => Some(game),
                Err(err) => {
                    warn!(%err, "Skipping malformed catalog record");
                    None
                }
            })
            .collect()
    }
}

/// Envelope of the screenshots endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawScreenshots {
    pub count: Option<u64>,
    pub results: Option<Vec<RawScreenshot>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawScreenshot {
    pub id: Option<u64>,
    pub image: Option<String>,
}

impl RawScreenshots {
    /// Image URLs in upstream order, dropping blank entries.
    pub fn into_urls(self) -> Vec<String> {
        self.results
            .unwrap_or_default()
            .into_iter()
            .filter_map(|shot| shot.image)
            .filter(|url| !url.trim().is_empty())
            .collect()
    }
}
