use std::time::Duration;

use chimix_core::{
    catalog::{EnrichmentPolicy, Transport},
    error::CatalogError,
    library::PAGE_SIZE,
    CatalogClient, CatalogService, Command, GameStatus, Library, Mode, Origin, PageQuery, SortKey,
};
use serde_json::{json, Value};

/// Answers list requests with fixed games and fails every detail request.
struct CannedCatalog;

impl Transport for CannedCatalog {
    async fn get_json(&self, path: &str, _query: &[(&str, String)]) -> Result<Value, CatalogError> {
        if path != "games" {
            return Err(CatalogError::Status {
                endpoint: path.to_string(),
                status: 503,
            });
        }
        Ok(json!({
            "count": 95,
            "results": [
                {
                    "id": 11,
                    "name": "Hollow Knight",
                    "released": "2017-02-24",
                    "rating": 4.4,
                    "genres": [{ "name": "Action" }, { "name": "Platformer" }],
                    "platforms": [{ "platform": { "name": "PC" } }]
                },
                {
                    "id": 12,
                    "name": "Disco Elysium",
                    "released": "2019-10-15",
                    "rating": 4.6,
                    "genres": [{ "name": "RPG" }]
                },
                { "id": "not-a-number", "name": "Broken" }
            ]
        }))
    }
}

struct Offline;

impl Transport for Offline {
    async fn get_json(&self, path: &str, _query: &[(&str, String)]) -> Result<Value, CatalogError> {
        Err(CatalogError::Status {
            endpoint: path.to_string(),
            status: 500,
        })
    }
}

fn quick() -> EnrichmentPolicy {
    EnrichmentPolicy {
        limit: 2,
        delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn live_page_flows_into_the_library() {
    let client = CatalogClient::live(CannedCatalog).with_enrichment(quick(), quick());
    let service = CatalogService::new(client, PAGE_SIZE);
    assert_eq!(service.mode(), Mode::Live);

    let mut library = Library::default();
    let request = library.initial_load();
    let page = service.load(&request.query, request.page).await;
    assert!(library.receive(&request, page));

    assert_eq!(library.origin(), Some(&Origin::Live));
    assert_eq!(library.pager().total_pages, 5);
    assert_eq!(library.games().len(), 2);
    assert_eq!(library.genre_facets(), vec!["Action", "Platformer", "RPG"]);

    let titles: Vec<_> = library.visible().iter().map(|g| g.title.as_str()).collect();
    assert_eq!(titles, vec!["Disco Elysium", "Hollow Knight"]);
    assert!(service.advisory().is_none());
}

#[tokio::test]
async fn offline_catalog_serves_one_page_of_demo_games() {
    let service = CatalogService::new(CatalogClient::live(Offline), PAGE_SIZE);
    let mut library = Library::default();

    library
        .apply(Command::SetSearchTerm("portal".into()))
        .unwrap();
    let request = library.apply(Command::SubmitSearch).unwrap().unwrap();
    assert_eq!(request.query, PageQuery::Search("portal".into()));

    let page = service.load(&request.query, request.page).await;
    assert!(library.receive(&request, page));
    assert!(matches!(library.origin(), Some(Origin::Fallback { .. })));
    assert_eq!(library.pager().total_pages, 1);
    assert_eq!(library.visible().len(), 2);
    assert!(service.advisory().is_some());
}

#[tokio::test]
async fn demo_browse_session() {
    let service: CatalogService<Offline> = CatalogService::new(CatalogClient::demo(), PAGE_SIZE);
    let mut library = Library::default();
    let request = library.initial_load();
    let page = service.load(&request.query, request.page).await;
    library.receive(&request, page);
    assert_eq!(library.games().len(), 6);

    library
        .apply(Command::SelectGenre(Some("RPG".into())))
        .unwrap();
    let rpgs: Vec<_> = library.visible().iter().map(|g| g.id).collect();
    assert_eq!(rpgs, vec![3328]);

    library.apply(Command::SelectGenre(None)).unwrap();
    library
        .apply(Command::Annotate {
            id: 4200,
            annotation: chimix_core::Annotation::Status(GameStatus::Completed),
        })
        .unwrap();
    library
        .apply(Command::SelectStatus(Some(GameStatus::Completed)))
        .unwrap();
    let done: Vec<_> = library.visible().iter().map(|g| g.title.as_str()).collect();
    assert_eq!(done, vec!["Portal 2"]);

    library.apply(Command::SelectStatus(None)).unwrap();
    library.apply(Command::SortBy(SortKey::Title)).unwrap();
    library.apply(Command::ToggleSortOrder).unwrap();
    let first = library.visible()[0].title.clone();
    assert_eq!(first, "Counter-Strike: Global Offensive");
}
