//! Catalog client: live HTTP access with demo-mode and failure fallbacks.

use std::time::Duration;

use chrono::{Local, Months, NaiveDate};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{
    demo,
    raw::{RawGame, RawPage, RawScreenshots},
    transport::{HttpTransport, Transport},
};
use crate::{
    config::{AppConfig, MAX_PAGE_SIZE},
    error::CatalogError,
};

/// Popular listings only include games at or above this metacritic range.
const POPULAR_METACRITIC: &str = "70,100";
const POPULAR_ORDERING: &str = "-rating,-metacritic";
const SEARCH_ORDERING: &str = "-rating";
const RECENT_ORDERING: &str = "-released";
const RECENT_WINDOW_MONTHS: u32 = 3;
const SEARCH_ENRICHMENT_DELAY: Duration = Duration::from_millis(150);

/// How the client was configured at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Requests go to the upstream catalog.
    Live,
    /// Requests are served from the bundled dataset.
    Demo,
}

/// Where the records of a [`Listing`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Upstream catalog.
    Live,
    /// Bundled dataset because the client runs in demo mode.
    Demo,
    /// Bundled dataset because the live request failed.
    Fallback {
        /// Description of the failure that triggered the fallback.
        reason: String,
    },
}

impl Origin {
    /// Whether the records came from the bundled dataset.
    pub fn is_bundled(&self) -> bool {
        !matches!(self, Origin::Live)
    }
}

/// Result of a list or search call.
#[derive(Debug, Clone)]
pub struct Listing {
    /// Records in upstream order, the first few possibly enriched.
    pub records: Vec<RawGame>,
    /// Source of the records.
    pub origin: Origin,
    /// Total matches reported upstream, when known.
    pub total: Option<u64>,
}

impl Listing {
    fn bundled(records: Vec<RawGame>, origin: Origin) -> Self {
        Self {
            records,
            origin,
            total: None,
        }
    }
}

/// Staggered detail fetches applied to the head of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentPolicy {
    /// Number of leading records to enrich.
    pub limit: usize,
    /// Pause between consecutive detail requests.
    pub delay: Duration,
}

impl EnrichmentPolicy {
    /// Default policy for popular listings.
    pub const POPULAR: EnrichmentPolicy = EnrichmentPolicy {
        limit: 10,
        delay: Duration::from_millis(100),
    };
    /// Default policy for search results.
    pub const SEARCH: EnrichmentPolicy = EnrichmentPolicy {
        limit: 5,
        delay: SEARCH_ENRICHMENT_DELAY,
    };
}

/// Client for the game catalog. The mode is fixed at construction: with a
/// transport the client is live, without one it serves demo data.
pub struct CatalogClient<T = HttpTransport> {
    transport: Option<T>,
    popular_enrichment: EnrichmentPolicy,
    search_enrichment: EnrichmentPolicy,
}

impl CatalogClient<HttpTransport> {
    /// Build a live client when `config` carries an API key, a demo client otherwise.
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        let Some(api_key) = config.api_key.as_deref() else {
            info!("No API key configured, running in demo mode");
            return Ok(Self::demo());
        };

        info!(key = %config.masked_key(), base_url = %config.base_url, "Catalog client in live mode");
        let transport = HttpTransport::new(
            config.base_url.clone(),
            api_key,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let popular = EnrichmentPolicy {
            delay: Duration::from_millis(config.enrichment_delay_ms),
            ..EnrichmentPolicy::POPULAR
        };
        Ok(Self::live(transport).with_enrichment(popular, EnrichmentPolicy::SEARCH))
    }
}

impl<T: Transport> CatalogClient<T> {
    /// Live client issuing requests through `transport`.
    pub fn live(transport: T) -> Self {
        Self {
            transport: Some(transport),
            popular_enrichment: EnrichmentPolicy::POPULAR,
            search_enrichment: EnrichmentPolicy::SEARCH,
        }
    }

    /// Client serving only the bundled dataset.
    pub fn demo() -> Self {
        Self {
            transport: None,
            popular_enrichment: EnrichmentPolicy::POPULAR,
            search_enrichment: EnrichmentPolicy::SEARCH,
        }
    }

    /// Override the enrichment policies for popular and search listings.
    pub fn with_enrichment(mut self, popular: EnrichmentPolicy, search: EnrichmentPolicy) -> Self {
        self.popular_enrichment = popular;
        self.search_enrichment = search;
        self
    }

    /// Current operating mode.
    pub fn mode(&self) -> Mode {
        if self.transport.is_some() {
            Mode::Live
        } else {
            Mode::Demo
        }
    }

    /// Free-text search ordered by rating.
    pub async fn search(&self, query: &str, limit: usize, page: u32) -> Listing {
        let Some(transport) = &self.transport else {
            debug!(%query, "Demo search");
            return Listing::bundled(demo::demo_search(query, limit), Origin::Demo);
        };

        let params = vec![
            ("search", query.to_string()),
            ("page_size", page_size(limit).to_string()),
            ("page", page.max(1).to_string()),
            ("ordering", SEARCH_ORDERING.to_string()),
        ];
        match self.fetch_page(transport, params).await {
            Ok(raw_page) => {
                let total = raw_page.count;
                let records = raw_page.into_games();
                info!(%query, found = records.len(), "Search completed");
                let records = self
                    .enrich(transport, records, self.search_enrichment)
                    .await;
                Listing {
                    records,
                    origin: Origin::Live,
                    total,
                }
            }
            Err(err) => {
                warn!(%query, %err, "Search failed, using demo data");
                Listing::bundled(
                    demo::demo_search(query, limit),
                    Origin::Fallback {
                        reason: err.to_string(),
                    },
                )
            }
        }
    }

    /// Highly rated games, ordered by rating then metacritic.
    pub async fn popular(&self, limit: usize, page: u32) -> Listing {
        let Some(transport) = &self.transport else {
            return Listing::bundled(demo::demo_listing(limit), Origin::Demo);
        };

        let params = vec![
            ("page_size", page_size(limit).to_string()),
            ("page", page.max(1).to_string()),
            ("ordering", POPULAR_ORDERING.to_string()),
            ("metacritic", POPULAR_METACRITIC.to_string()),
        ];
        match self.fetch_page(transport, params).await {
            Ok(raw_page) => {
                let total = raw_page.count;
                let records = raw_page.into_games();
                info!(fetched = records.len(), "Popular games fetched");
                let records = self
                    .enrich(transport, records, self.popular_enrichment)
                    .await;
                Listing {
                    records,
                    origin: Origin::Live,
                    total,
                }
            }
            Err(err) => {
                warn!(%err, "Popular listing failed, using demo data");
                Listing::bundled(
                    demo::demo_listing(limit),
                    Origin::Fallback {
                        reason: err.to_string(),
                    },
                )
            }
        }
    }

    /// Games released in the trailing three months, newest first.
    pub async fn recent(&self, limit: usize, page: u32) -> Listing {
        let Some(transport) = &self.transport else {
            return Listing::bundled(demo::demo_listing(limit), Origin::Demo);
        };

        let params = vec![
            ("page_size", page_size(limit).to_string()),
            ("page", page.max(1).to_string()),
            ("ordering", RECENT_ORDERING.to_string()),
            ("dates", recent_window(Local::now().date_naive())),
        ];
        match self.fetch_page(transport, params).await {
            Ok(raw_page) => {
                let total = raw_page.count;
                Listing {
                    records: raw_page.into_games(),
                    origin: Origin::Live,
                    total,
                }
            }
            Err(err) => {
                warn!(%err, "Recent listing failed, using demo data");
                Listing::bundled(
                    demo::demo_listing(limit),
                    Origin::Fallback {
                        reason: err.to_string(),
                    },
                )
            }
        }
    }

    /// Full record for `id`. Failures fall back to a bundled record with the same id.
    pub async fn details(&self, id: u64) -> Option<RawGame> {
        let Some(transport) = &self.transport else {
            return demo::demo_details(id);
        };
        match self.fetch_details(transport, id).await {
            Ok(game) => Some(game),
            Err(err) => {
                warn!(game_id = id, %err, "Details request failed");
                demo::demo_details(id)
            }
        }
    }

    /// Screenshot URLs for `id`; empty when unavailable.
    pub async fn screenshots(&self, id: u64) -> Vec<String> {
        let Some(transport) = &self.transport else {
            return demo::demo_screenshots(id);
        };
        let path = format!("games/{id}/screenshots");
        let result = transport
            .get_json(&path, &[])
            .await
            .and_then(|value| {
                serde_json::from_value::<RawScreenshots>(value).map_err(|source| {
                    CatalogError::Decode {
                        endpoint: path.clone(),
                        source,
                    }
                })
            });
        match result {
            Ok(shots) => shots.into_urls(),
            Err(err) => {
                warn!(game_id = id, %err, "Screenshots request failed");
                Vec::new()
            }
        }
    }

    async fn fetch_page(
        &self,
        transport: &T,
        params: Vec<(&'static str, String)>,
    ) -> Result<RawPage, CatalogError> {
        let value = transport.get_json("games", &params).await?;
        serde_json::from_value(value).map_err(|source| CatalogError::Decode {
            endpoint: "games".to_string(),
            source,
        })
    }

    async fn fetch_details(&self, transport: &T, id: u64) -> Result<RawGame, CatalogError> {
        let path = format!("games/{id}");
        let value = transport.get_json(&path, &[]).await?;
        serde_json::from_value(value).map_err(|source| CatalogError::Decode {
            endpoint: path,
            source,
        })
    }

    /// Replace the leading records with their detail records, one request at
    /// a time. A failed detail fetch keeps the basic record.
    async fn enrich(
        &self,
        transport: &T,
        records: Vec<RawGame>,
        policy: EnrichmentPolicy,
    ) -> Vec<RawGame> {
        let mut enriched = Vec::with_capacity(records.len());
        for (index, basic) in records.into_iter().enumerate() {
            if index >= policy.limit {
                enriched.push(basic);
                continue;
            }
            if index > 0 && !policy.delay.is_zero() {
                sleep(policy.delay).await;
            }
            match self.fetch_details(transport, basic.id).await {
                Ok(detailed) => enriched.push(detailed),
                Err(err) => {
                    warn!(game_id = basic.id, %err, "Detail fetch failed, keeping basic record");
                    enriched.push(basic);
                }
            }
        }
        enriched
    }
}

fn page_size(limit: usize) -> usize {
    limit.clamp(1, MAX_PAGE_SIZE as usize)
}

/// `dates` filter covering the trailing three months up to `today`.
pub fn recent_window(today: NaiveDate) -> String {
    let start = today
        .checked_sub_months(Months::new(RECENT_WINDOW_MONTHS))
        .unwrap_or(today);
    format!("{},{}", start.format("%Y-%m-%d"), today.format("%Y-%m-%d"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// In-memory transport answering from a path-keyed script.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        responses: HashMap<String, Result<Value, u16>>,
        requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl ScriptedTransport {
        pub(crate) fn respond(mut self, path: &str, body: Value) -> Self {
            self.responses.insert(path.to_string(), Ok(body));
            self
        }

        pub(crate) fn fail(mut self, path: &str, status: u16) -> Self {
            self.responses.insert(path.to_string(), Err(status));
            self
        }

        pub(crate) fn requested_paths(&self) -> Vec<String> {
            self.requests
                .lock()
                .iter()
                .map(|(path, _)| path.clone())
                .collect()
        }

        pub(crate) fn query_of(&self, path: &str) -> Option<Vec<(String, String)>> {
            self.requests
                .lock()
                .iter()
                .find(|(requested, _)| requested == path)
                .map(|(_, query)| query.clone())
        }
    }

    impl Transport for ScriptedTransport {
        async fn get_json(
            &self,
            path: &str,
            query: &[(&str, String)],
        ) -> Result<Value, CatalogError> {
            self.requests.lock().push((
                path.to_string(),
                query
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.clone()))
                    .collect(),
            ));
            match self.responses.get(path) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(CatalogError::Status {
                    endpoint: path.to_string(),
                    status: *status,
                }),
                None => Err(CatalogError::Status {
                    endpoint: path.to_string(),
                    status: 404,
                }),
            }
        }
    }

    pub(crate) fn basic(id: u64) -> Value {
        json!({ "id": id, "name": format!("Game {id}"), "rating": 4.0 })
    }

    pub(crate) fn detailed(id: u64) -> Value {
        json!({
            "id": id,
            "name": format!("Game {id}"),
            "rating": 4.0,
            "description_raw": format!("Details for {id}")
        })
    }

    fn no_delay(limit: usize) -> EnrichmentPolicy {
        EnrichmentPolicy {
            limit,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn failed_detail_fetch_keeps_basic_record() {
        let results: Vec<Value> = (1..=10).map(basic).collect();
        let mut transport = ScriptedTransport::default()
            .respond("games", json!({ "count": 10, "results": results }));
        for id in (1..=10).filter(|id| *id != 3) {
            transport = transport.respond(&format!("games/{id}"), detailed(id));
        }
        transport = transport.fail("games/3", 500);

        let client =
            CatalogClient::live(transport).with_enrichment(no_delay(10), no_delay(5));
        let listing = client.popular(20, 1).await;

        assert_eq!(listing.origin, Origin::Live);
        assert_eq!(listing.total, Some(10));
        assert_eq!(listing.records.len(), 10);
        let expected_basic: RawGame = serde_json::from_value(basic(3)).unwrap();
        assert_eq!(listing.records[2], expected_basic);
        for (idx, record) in listing.records.iter().enumerate() {
            if idx != 2 {
                assert_eq!(
                    record.description_raw.as_deref(),
                    Some(format!("Details for {}", idx + 1).as_str())
                );
            }
        }
    }

    #[tokio::test]
    async fn search_enriches_only_the_first_five() {
        let results: Vec<Value> = (1..=8).map(basic).collect();
        let mut transport =
            ScriptedTransport::default().respond("games", json!({ "results": results }));
        for id in 1..=8 {
            transport = transport.respond(&format!("games/{id}"), detailed(id));
        }
        let client =
            CatalogClient::live(transport).with_enrichment(no_delay(10), no_delay(5));

        let listing = client.search("game", 50, 2).await;
        assert_eq!(listing.records.len(), 8);
        assert!(listing.records[4].description_raw.is_some());
        assert!(listing.records[5].description_raw.is_none());

        let transport = client.transport.as_ref().unwrap();
        let detail_calls = transport
            .requested_paths()
            .into_iter()
            .filter(|path| path.starts_with("games/"))
            .count();
        assert_eq!(detail_calls, 5);

        let query = transport.query_of("games").unwrap();
        assert!(query.contains(&("search".to_string(), "game".to_string())));
        assert!(query.contains(&("page_size".to_string(), "20".to_string())));
        assert!(query.contains(&("page".to_string(), "2".to_string())));
        assert!(query.contains(&("ordering".to_string(), "-rating".to_string())));
    }

    #[tokio::test]
    async fn popular_requests_quality_threshold() {
        let transport = ScriptedTransport::default().respond("games", json!({ "results": [] }));
        let client = CatalogClient::live(transport);
        let listing = client.popular(5, 0).await;
        assert_eq!(listing.origin, Origin::Live);
        assert!(listing.records.is_empty());

        let query = client.transport.as_ref().unwrap().query_of("games").unwrap();
        assert!(query.contains(&("metacritic".to_string(), "70,100".to_string())));
        assert!(query.contains(&("ordering".to_string(), "-rating,-metacritic".to_string())));
        assert!(query.contains(&("page_size".to_string(), "5".to_string())));
        assert!(query.contains(&("page".to_string(), "1".to_string())));
    }

    #[tokio::test]
    async fn recent_orders_by_release_within_window() {
        let transport = ScriptedTransport::default().respond("games", json!({ "results": [] }));
        let client = CatalogClient::live(transport);
        let before = recent_window(Local::now().date_naive());
        let listing = client.recent(20, 2).await;
        let after = recent_window(Local::now().date_naive());
        assert_eq!(listing.origin, Origin::Live);

        let query = client.transport.as_ref().unwrap().query_of("games").unwrap();
        assert!(query.contains(&("ordering".to_string(), "-released".to_string())));
        assert!(query.contains(&("page".to_string(), "2".to_string())));
        let dates = query
            .iter()
            .find(|(key, _)| key == "dates")
            .map(|(_, value)| value.clone())
            .unwrap();
        assert!(dates == before || dates == after, "unexpected window {dates}");
    }

    #[tokio::test(start_paused = true)]
    async fn enrichment_waits_between_detail_requests() {
        let results: Vec<Value> = (1..=4).map(basic).collect();
        let mut transport = ScriptedTransport::default()
            .respond("games", json!({ "count": 4, "results": results }));
        for id in 1..=4 {
            transport = transport.respond(&format!("games/{id}"), detailed(id));
        }
        let delay = Duration::from_millis(100);
        let policy = EnrichmentPolicy { limit: 4, delay };
        let client = CatalogClient::live(transport).with_enrichment(policy, no_delay(0));

        let started = tokio::time::Instant::now();
        let listing = client.popular(20, 1).await;
        let elapsed = started.elapsed();

        assert_eq!(listing.records.len(), 4);
        assert!(listing
            .records
            .iter()
            .all(|record| record.description_raw.is_some()));
        assert!(elapsed >= delay * 3, "enrichment took {elapsed:?}");
    }

    #[tokio::test]
    async fn list_failure_falls_back_to_demo_data() {
        let client = CatalogClient::live(ScriptedTransport::default().fail("games", 503));

        let popular = client.popular(3, 1).await;
        assert!(matches!(popular.origin, Origin::Fallback { .. }));
        assert_eq!(popular.records.len(), 3);

        let search = client.search("witcher", 20, 1).await;
        assert!(search.origin.is_bundled());
        assert_eq!(search.records.len(), 1);
        assert_eq!(search.records[0].id, 3328);

        let recent = client.recent(2, 1).await;
        assert!(recent.origin.is_bundled());
        assert_eq!(recent.records.len(), 2);
    }

    #[tokio::test]
    async fn details_and_screenshots_degrade() {
        let transport = ScriptedTransport::default()
            .fail("games/4200", 500)
            .respond(
                "games/7/screenshots",
                json!({ "results": [{ "image": "https://img.test/a.jpg" }] }),
            );
        let client = CatalogClient::live(transport);

        let details = client.details(4200).await;
        assert_eq!(details.map(|game| game.id), Some(4200));
        assert!(client.details(999).await.is_none());

        assert_eq!(
            client.screenshots(7).await,
            vec!["https://img.test/a.jpg".to_string()]
        );
        assert!(client.screenshots(8).await.is_empty());
    }

    #[tokio::test]
    async fn demo_client_serves_bundled_dataset() {
        let client: CatalogClient<ScriptedTransport> = CatalogClient::demo();
        assert_eq!(client.mode(), Mode::Demo);

        let popular = client.popular(20, 3).await;
        assert_eq!(popular.origin, Origin::Demo);
        assert_eq!(popular.records.len(), 6);

        assert_eq!(client.search("tomb", 20, 1).await.records.len(), 1);
        assert_eq!(client.details(3328).await.map(|game| game.id), Some(3328));
        assert_eq!(client.screenshots(3328).await.len(), 1);
    }

    #[test]
    fn recent_window_spans_three_months() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        assert_eq!(recent_window(today), "2024-02-29,2024-05-31");
    }
}
