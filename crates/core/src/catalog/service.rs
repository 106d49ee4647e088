//! Catalog facade: client calls mapped through the normalizer.

use parking_lot::RwLock;
use tracing::{info, warn};

use super::{
    client::{CatalogClient, Listing, Mode, Origin},
    demo,
    normalize::normalize,
    transport::{HttpTransport, Transport},
};
use crate::{config::AppConfig, error::CatalogError, models::Game};

/// Message shown while fallback data replaces a failed listing.
pub const FALLBACK_ADVISORY: &str = "Failed to load games. Using fallback data.";

/// Which listing a page belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageQuery {
    /// Highly rated games.
    Popular,
    /// Free-text search results.
    Search(String),
    /// Recently released games.
    Recent,
}

/// A page of normalized games.
#[derive(Debug, Clone)]
pub struct GamePage {
    /// Normalized games in catalog order.
    pub games: Vec<Game>,
    /// Source of the games.
    pub origin: Origin,
    /// Total matches reported upstream, when known.
    pub total: Option<u64>,
}

impl GamePage {
    /// Advisory message belonging to this page, set when it holds fallback data.
    pub fn advisory(&self) -> Option<&'static str> {
        match self.origin {
            Origin::Fallback { .. } => Some(FALLBACK_ADVISORY),
            Origin::Live | Origin::Demo => None,
        }
    }
}

impl From<Listing> for GamePage {
    fn from(listing: Listing) -> Self {
        Self {
            games: listing.records.iter().map(normalize).collect(),
            origin: listing.origin,
            total: listing.total,
        }
    }
}

/// Explicitly constructed facade over a [`CatalogClient`].
///
/// Operations never fail for upstream problems: they return bundled data and
/// leave an advisory message readable through [`CatalogService::advisory`].
pub struct CatalogService<T = HttpTransport> {
    client: CatalogClient<T>,
    page_size: usize,
    advisory: RwLock<Option<String>>,
}

impl CatalogService<HttpTransport> {
    /// Build the facade and its client from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        let client = CatalogClient::from_config(config)?;
        Ok(Self::new(client, config.page_size as usize))
    }
}

impl<T: Transport> CatalogService<T> {
    /// Wrap `client`, requesting `page_size` games per page.
    pub fn new(client: CatalogClient<T>, page_size: usize) -> Self {
        Self {
            client,
            page_size: page_size.max(1),
            advisory: RwLock::new(None),
        }
    }

    /// Operating mode of the underlying client.
    pub fn mode(&self) -> Mode {
        self.client.mode()
    }

    /// Games requested per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Message describing the most recent fallback, cleared by the next live success.
    ///
    /// This tracks call completion order. Callers that may have several loads in
    /// flight should use [`GamePage::advisory`] of the page they keep instead.
    pub fn advisory(&self) -> Option<String> {
        self.advisory.read().clone()
    }

    /// Load one page of `query` using the configured page size.
    pub async fn load(&self, query: &PageQuery, page: u32) -> GamePage {
        match query {
            PageQuery::Popular => self.popular(self.page_size, page).await,
            PageQuery::Search(term) => self.search(term, self.page_size, page).await,
            PageQuery::Recent => self.recent(self.page_size, page).await,
        }
    }

    /// Search the catalog.
    pub async fn search(&self, query: &str, limit: usize, page: u32) -> GamePage {
        let listing = self.client.search(query, limit, page).await;
        self.record(&listing.origin);
        listing.into()
    }

    /// Popular games. An empty live page is treated as a failure and replaced
    /// by the bundled dataset.
    pub async fn popular(&self, limit: usize, page: u32) -> GamePage {
        let mut listing = self.client.popular(limit, page).await;
        if listing.origin == Origin::Live && listing.records.is_empty() {
            warn!(page, "Catalog returned no popular games, using demo data");
            listing = Listing {
                records: demo::demo_listing(limit),
                origin: Origin::Fallback {
                    reason: "catalog returned no games".to_string(),
                },
                total: None,
            };
        }
        self.record(&listing.origin);
        listing.into()
    }

    /// Recently released games.
    pub async fn recent(&self, limit: usize, page: u32) -> GamePage {
        let listing = self.client.recent(limit, page).await;
        self.record(&listing.origin);
        listing.into()
    }

    /// Normalized details for `id`.
    pub async fn details(&self, id: u64) -> Option<Game> {
        self.client.details(id).await.as_ref().map(normalize)
    }

    /// Screenshot URLs for `id`.
    pub async fn screenshots(&self, id: u64) -> Vec<String> {
        self.client.screenshots(id).await
    }

    fn record(&self, origin: &Origin) {
        let mut advisory = self.advisory.write();
        match origin {
            Origin::Live => *advisory = None,
            Origin::Demo => {}
            Origin::Fallback { reason } => {
                info!(%reason, "Serving fallback catalog data");
                *advisory = Some(FALLBACK_ADVISORY.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::client::tests::{basic, ScriptedTransport};
    use crate::catalog::EnrichmentPolicy;
    use crate::models::GameStatus;
    use serde_json::json;
    use std::time::Duration;

    fn instant() -> EnrichmentPolicy {
        EnrichmentPolicy {
            limit: 0,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn live_pages_are_normalized() {
        let transport = ScriptedTransport::default().respond(
            "games",
            json!({ "count": 2, "results": [basic(1), basic(2)] }),
        );
        let client = CatalogClient::live(transport).with_enrichment(instant(), instant());
        let service = CatalogService::new(client, 20);

        let page = service.load(&PageQuery::Popular, 1).await;
        assert_eq!(page.origin, Origin::Live);
        assert_eq!(page.total, Some(2));
        assert_eq!(page.games.len(), 2);
        assert_eq!(page.games[0].title, "Game 1");
        assert_eq!(page.games[0].status, GameStatus::NotStarted);
        assert!(service.advisory().is_none());
    }

    #[tokio::test]
    async fn failures_leave_an_advisory_that_live_success_clears() {
        let failing = CatalogService::new(
            CatalogClient::live(ScriptedTransport::default().fail("games", 500)),
            20,
        );
        let page = failing.load(&PageQuery::Search("portal".into()), 1).await;
        assert!(page.origin.is_bundled());
        assert_eq!(page.games.len(), 2);
        assert_eq!(failing.advisory().as_deref(), Some(FALLBACK_ADVISORY));

        let transport = ScriptedTransport::default()
            .respond("games", json!({ "results": [basic(9)] }));
        let service = CatalogService::new(
            CatalogClient::live(transport).with_enrichment(instant(), instant()),
            20,
        );
        service.record(&Origin::Fallback {
            reason: "earlier failure".into(),
        });
        service.load(&PageQuery::Recent, 1).await;
        assert!(service.advisory().is_none());
    }

    #[tokio::test]
    async fn empty_popular_page_falls_back() {
        let transport = ScriptedTransport::default().respond("games", json!({ "results": [] }));
        let service = CatalogService::new(CatalogClient::live(transport), 4);

        let page = service.load(&PageQuery::Popular, 1).await;
        assert!(matches!(page.origin, Origin::Fallback { .. }));
        assert_eq!(page.games.len(), 4);
        assert!(service.advisory().is_some());
    }

    #[tokio::test]
    async fn demo_mode_has_no_advisory() {
        let service: CatalogService<ScriptedTransport> =
            CatalogService::new(CatalogClient::demo(), 20);
        assert_eq!(service.mode(), Mode::Demo);

        let page = service.load(&PageQuery::Popular, 1).await;
        assert_eq!(page.origin, Origin::Demo);
        assert_eq!(page.games.len(), 6);
        assert!(service.advisory().is_none());

        let witcher = service.details(3328).await.unwrap();
        assert_eq!(witcher.genre, "RPG");
        assert!(witcher.links_to_steam());
    }
}
