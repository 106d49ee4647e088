//! In-memory application state driven by [`Command`] messages.
//!
//! The library owns the loaded page of games plus the user's filters, sort
//! and pagination. Commands that need catalog data hand back a
//! [`FetchRequest`]; the caller performs it and passes the result to
//! [`Library::receive`], which drops anything older than the latest request.

mod draft;

pub use draft::GameDraft;

use chrono::Utc;
use tracing::{debug, info};

use crate::{
    catalog::{GamePage, Origin, PageQuery},
    error::LibraryError,
    models::{Game, GameStatus},
    view::{self, Filters, SortKey, SortSpec},
};

/// Games per catalog page.
pub const PAGE_SIZE: usize = 20;
/// Highest reachable page for popular and recent listings.
pub const POPULAR_PAGE_CAP: u32 = 50;
/// Highest reachable page for search results.
pub const SEARCH_PAGE_CAP: u32 = 10;
/// Shortest term that triggers a catalog search.
pub const MIN_SEARCH_LEN: usize = 3;

/// A personal annotation applied to one game.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// Play status.
    Status(GameStatus),
    /// Hours played.
    HoursPlayed(u32),
    /// Personal rating, 0-10.
    PersonalRating(u8),
    /// Free-form notes.
    Notes(String),
}

/// User intents understood by [`Library::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Update the local search filter.
    SetSearchTerm(String),
    /// Search the catalog with the current term.
    SubmitSearch,
    /// Restrict to a genre, or clear with `None`.
    SelectGenre(Option<String>),
    /// Restrict to a status, or clear with `None`.
    SelectStatus(Option<GameStatus>),
    /// Sort by a key, keeping the current direction.
    SortBy(SortKey),
    /// Flip the sort direction.
    ToggleSortOrder,
    /// Jump to a page of the current listing.
    GoToPage(u32),
    /// Drop the search and go back to popular games.
    ResetToPopular,
    /// Load games released in the last three months.
    ShowRecent,
    /// Add a game built from a draft.
    Add(GameDraft),
    /// Replace the game with `id` by the draft's contents.
    #[allow(missing_docs)]
    Update { id: u64, draft: GameDraft },
    /// Remove a game.
    Delete(u64),
    /// Change a personal annotation.
    #[allow(missing_docs)]
    Annotate { id: u64, annotation: Annotation },
}

/// A catalog page the caller should load and pass back to [`Library::receive`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Generation of the request; newer requests supersede older ones.
    pub ticket: u64,
    /// Listing to load.
    pub query: PageQuery,
    /// 1-based page number.
    pub page: u32,
}

/// Issues monotonically increasing tickets and remembers which one is current.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
    settled: u64,
}

impl RequestTracker {
    /// Start a new generation, superseding every outstanding ticket.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Whether `ticket` belongs to the latest generation.
    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.latest
    }

    /// Mark the latest generation as answered.
    pub fn settle(&mut self, ticket: u64) {
        if self.is_current(ticket) {
            self.settled = ticket;
        }
    }

    /// Whether the latest request is still unanswered.
    pub fn pending(&self) -> bool {
        self.settled < self.latest
    }
}

/// Position within the current listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Pager {
    /// Listing being paged through.
    pub query: PageQuery,
    /// Current 1-based page.
    pub page: u32,
    /// Reachable pages, at least 1.
    pub total_pages: u32,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            query: PageQuery::Popular,
            page: 1,
            total_pages: 1,
        }
    }
}

impl Pager {
    /// Clamp `page` into `[1, total_pages]`.
    pub fn clamp(&self, page: u32) -> u32 {
        page.clamp(1, self.total_pages.max(1))
    }
}

fn page_cap(query: &PageQuery) -> u32 {
    match query {
        PageQuery::Search(_) => SEARCH_PAGE_CAP,
        PageQuery::Popular | PageQuery::Recent => POPULAR_PAGE_CAP,
    }
}

/// Page count for a loaded listing.
pub fn total_pages(query: &PageQuery, page: &GamePage, page_size: usize) -> u32 {
    if page.origin.is_bundled() {
        return 1;
    }
    let cap = page_cap(query);
    match page.total {
        Some(total) => {
            let size = page_size.max(1) as u64;
            let pages = total.div_ceil(size).max(1);
            pages.min(cap as u64) as u32
        }
        None => cap,
    }
}

/// Loaded games together with filters, sort and pagination.
#[derive(Debug)]
pub struct Library {
    games: Vec<Game>,
    filters: Filters,
    sort: SortSpec,
    pager: Pager,
    tracker: RequestTracker,
    origin: Option<Origin>,
    advisory: Option<String>,
    page_size: usize,
}

impl Default for Library {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Library {
    /// Empty library requesting `page_size` games per page.
    pub fn new(page_size: usize) -> Self {
        Self {
            games: Vec::new(),
            filters: Filters::default(),
            sort: SortSpec::default(),
            pager: Pager::default(),
            tracker: RequestTracker::default(),
            origin: None,
            advisory: None,
            page_size: page_size.max(1),
        }
    }

    /// Request for the first page of popular games.
    pub fn initial_load(&mut self) -> FetchRequest {
        self.request(PageQuery::Popular, 1)
    }

    /// Loaded games in catalog order.
    pub fn games(&self) -> &[Game] {
        &self.games
    }

    /// Active filters.
    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Active sort.
    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    /// Current pagination.
    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// Source of the loaded page, once one has arrived.
    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    /// Fallback notice for the installed page, if it holds fallback data.
    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    /// Whether the latest fetch is still outstanding.
    pub fn is_loading(&self) -> bool {
        self.tracker.pending()
    }

    /// Games after filtering and sorting.
    pub fn visible(&self) -> Vec<&Game> {
        view::derive(&self.games, &self.filters, self.sort)
    }

    /// Distinct genres among loaded games.
    pub fn genre_facets(&self) -> Vec<String> {
        view::genre_facets(&self.games)
    }

    /// Distinct statuses among loaded games.
    pub fn status_facets(&self) -> Vec<GameStatus> {
        view::status_facets(&self.games)
    }

    /// Loaded game with `id`.
    pub fn find(&self, id: u64) -> Option<&Game> {
        self.games.iter().find(|game| game.id == id)
    }

    /// Apply a command, returning a fetch the caller must perform if any.
    pub fn apply(&mut self, command: Command) -> Result<Option<FetchRequest>, LibraryError> {
        match command {
            Command::SetSearchTerm(term) => {
                self.filters.search = term;
                Ok(None)
            }
            Command::SubmitSearch => {
                let term = self.filters.search.trim().to_string();
                if term.chars().count() < MIN_SEARCH_LEN {
                    debug!(%term, "Search term too short for a catalog query");
                    return Ok(None);
                }
                Ok(Some(self.request(PageQuery::Search(term), 1)))
            }
            Command::SelectGenre(genre) => {
                self.filters.genre = genre;
                Ok(None)
            }
            Command::SelectStatus(status) => {
                self.filters.status = status;
                Ok(None)
            }
            Command::SortBy(key) => {
                self.sort.key = key;
                Ok(None)
            }
            Command::ToggleSortOrder => {
                self.sort.order = self.sort.order.toggled();
                Ok(None)
            }
            Command::GoToPage(page) => {
                let page = self.pager.clamp(page);
                if page == self.pager.page {
                    return Ok(None);
                }
                let query = self.pager.query.clone();
                Ok(Some(self.request(query, page)))
            }
            Command::ResetToPopular => {
                self.filters.search.clear();
                Ok(Some(self.request(PageQuery::Popular, 1)))
            }
            Command::ShowRecent => Ok(Some(self.request(PageQuery::Recent, 1))),
            Command::Add(draft) => {
                let id = self.next_id();
                let game = draft.into_game(id)?;
                info!(id, title = %game.title, "Added game");
                self.games.push(game);
                Ok(None)
            }
            Command::Update { id, draft } => {
                let game = draft.into_game(id)?;
                let slot = self.slot(id)?;
                *slot = game;
                info!(id, "Updated game");
                Ok(None)
            }
            Command::Delete(id) => {
                let index = self
                    .games
                    .iter()
                    .position(|game| game.id == id)
                    .ok_or(LibraryError::UnknownGame(id))?;
                let removed = self.games.remove(index);
                info!(id, title = %removed.title, "Deleted game");
                Ok(None)
            }
            Command::Annotate { id, annotation } => {
                let game = self.slot(id)?;
                match annotation {
                    Annotation::Status(status) => game.status = status,
                    Annotation::HoursPlayed(hours) => game.hours_played = hours,
                    Annotation::PersonalRating(rating) if rating > 10 => {
                        return Err(LibraryError::PersonalRatingOutOfRange(rating));
                    }
                    Annotation::PersonalRating(rating) => game.personal_rating = rating,
                    Annotation::Notes(notes) => game.notes = notes,
                }
                Ok(None)
            }
        }
    }

    /// Install a loaded page if `request` is still the latest one.
    ///
    /// Returns `false` when the response was stale and has been dropped.
    pub fn receive(&mut self, request: &FetchRequest, page: GamePage) -> bool {
        if !self.tracker.is_current(request.ticket) {
            debug!(ticket = request.ticket, "Dropping stale catalog response");
            return false;
        }
        self.tracker.settle(request.ticket);

        let total_pages = total_pages(&request.query, &page, self.page_size);
        self.pager = Pager {
            query: request.query.clone(),
            page: request.page.min(total_pages).max(1),
            total_pages,
        };
        debug!(
            count = page.games.len(),
            page = self.pager.page,
            total_pages,
            "Installed catalog page"
        );
        self.advisory = page.advisory().map(str::to_string);
        self.games = page.games;
        self.origin = Some(page.origin);
        true
    }

    fn request(&mut self, query: PageQuery, page: u32) -> FetchRequest {
        FetchRequest {
            ticket: self.tracker.issue(),
            query,
            page: page.max(1),
        }
    }

    fn slot(&mut self, id: u64) -> Result<&mut Game, LibraryError> {
        self.games
            .iter_mut()
            .find(|game| game.id == id)
            .ok_or(LibraryError::UnknownGame(id))
    }

    fn next_id(&self) -> u64 {
        let mut id = Utc::now().timestamp_millis().max(0) as u64;
        while self.games.iter().any(|game| game.id == id) {
            id += 1;
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::SortOrder;

    fn game(id: u64, title: &str, rating: f64) -> Game {
        Game {
            id,
            title: title.to_string(),
            genre: "Action".to_string(),
            rating,
            ..Game::default()
        }
    }

    fn live(games: Vec<Game>, total: Option<u64>) -> GamePage {
        GamePage {
            games,
            origin: Origin::Live,
            total,
        }
    }

    fn loaded(games: Vec<Game>) -> Library {
        let mut library = Library::default();
        let request = library.initial_load();
        assert!(library.receive(&request, live(games, Some(400))));
        library
    }

    #[test]
    fn defaults_sort_by_rating_descending() {
        let library = loaded(vec![game(1, "Low", 3.0), game(2, "High", 9.0)]);
        assert_eq!(library.sort(), SortSpec::new(SortKey::Rating, SortOrder::Descending));
        let titles: Vec<_> = library.visible().iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["High", "Low"]);
    }

    #[test]
    fn short_search_terms_stay_local() {
        let mut library = loaded(vec![]);
        library.apply(Command::SetSearchTerm("wi".into())).unwrap();
        assert_eq!(library.apply(Command::SubmitSearch).unwrap(), None);

        library.apply(Command::SetSearchTerm(" witcher ".into())).unwrap();
        let request = library.apply(Command::SubmitSearch).unwrap().unwrap();
        assert_eq!(request.query, PageQuery::Search("witcher".into()));
        assert_eq!(request.page, 1);
        assert!(library.is_loading());
    }

    #[test]
    fn stale_responses_are_dropped() {
        let mut library = loaded(vec![game(1, "Start", 5.0)]);
        library.apply(Command::SetSearchTerm("portal".into())).unwrap();
        let first = library.apply(Command::SubmitSearch).unwrap().unwrap();
        let second = library.apply(Command::ResetToPopular).unwrap().unwrap();
        assert!(second.ticket > first.ticket);

        assert!(library.receive(&second, live(vec![game(2, "Popular", 8.0)], None)));
        assert!(!library.receive(&first, live(vec![game(3, "Late search", 7.0)], None)));
        assert_eq!(library.games()[0].title, "Popular");
        assert_eq!(library.pager().query, PageQuery::Popular);
        assert!(!library.is_loading());
    }

    #[test]
    fn late_fallback_does_not_leave_an_advisory() {
        let mut library = loaded(vec![game(1, "Start", 5.0)]);
        library.apply(Command::SetSearchTerm("portal".into())).unwrap();
        let search = library.apply(Command::SubmitSearch).unwrap().unwrap();
        let popular = library.apply(Command::ResetToPopular).unwrap().unwrap();

        assert!(library.receive(&popular, live(vec![game(2, "Popular", 8.0)], Some(20))));
        let fallback = GamePage {
            games: vec![game(3, "Portal", 9.0)],
            origin: Origin::Fallback {
                reason: "catalog returned 500".into(),
            },
            total: None,
        };
        assert!(!library.receive(&search, fallback.clone()));
        assert_eq!(library.origin(), Some(&Origin::Live));
        assert_eq!(library.advisory(), None);

        let retry = library.apply(Command::ShowRecent).unwrap().unwrap();
        assert!(library.receive(&retry, fallback));
        assert_eq!(library.advisory(), Some(crate::catalog::FALLBACK_ADVISORY));

        let back = library.apply(Command::ResetToPopular).unwrap().unwrap();
        assert!(library.receive(&back, live(vec![], Some(0))));
        assert_eq!(library.advisory(), None);
    }

    #[test]
    fn pagination_follows_count_and_caps() {
        let popular = live(vec![], Some(100_000));
        assert_eq!(total_pages(&PageQuery::Popular, &popular, 20), 50);
        let search = PageQuery::Search("zelda".into());
        assert_eq!(total_pages(&search, &popular, 20), 10);
        assert_eq!(total_pages(&search, &live(vec![], Some(41)), 20), 3);
        assert_eq!(total_pages(&search, &live(vec![], Some(0)), 20), 1);
        assert_eq!(total_pages(&PageQuery::Popular, &live(vec![], None), 20), 50);

        let demo = GamePage {
            games: vec![],
            origin: Origin::Demo,
            total: Some(400),
        };
        assert_eq!(total_pages(&PageQuery::Popular, &demo, 20), 1);
    }

    #[test]
    fn page_navigation_is_clamped() {
        let mut library = loaded(vec![game(1, "A", 1.0)]);
        assert_eq!(library.pager().total_pages, 20);

        let request = library.apply(Command::GoToPage(99)).unwrap().unwrap();
        assert_eq!(request.page, 20);
        assert!(library.receive(&request, live(vec![], Some(400))));
        assert_eq!(library.pager().page, 20);

        let back = library.apply(Command::GoToPage(0)).unwrap().unwrap();
        assert_eq!(back.page, 1);
        assert_eq!(library.apply(Command::GoToPage(20)).unwrap(), None);

        let recent = library.apply(Command::ShowRecent).unwrap().unwrap();
        assert_eq!(recent.query, PageQuery::Recent);
        assert_eq!(recent.page, 1);
    }

    #[test]
    fn add_update_delete_round() {
        let mut library = loaded(vec![game(1, "Existing", 5.0)]);
        let draft = GameDraft {
            title: "Celeste".into(),
            genres: "Platformer".into(),
            rating: 9.0,
            ..GameDraft::default()
        };
        library.apply(Command::Add(draft.clone())).unwrap();
        library.apply(Command::Add(draft.clone())).unwrap();
        assert_eq!(library.games().len(), 3);
        let first = library.games()[1].id;
        let second = library.games()[2].id;
        assert_ne!(first, second);

        let mut edited = GameDraft::from_game(&library.games()[1]);
        edited.title = "Celeste Classic".into();
        library
            .apply(Command::Update {
                id: first,
                draft: edited,
            })
            .unwrap();
        assert_eq!(library.games()[1].title, "Celeste Classic");
        assert_eq!(library.games()[1].id, first);

        library.apply(Command::Delete(second)).unwrap();
        assert_eq!(library.games().len(), 2);
        assert_eq!(
            library.apply(Command::Delete(second)),
            Err(LibraryError::UnknownGame(second))
        );
    }

    #[test]
    fn invalid_drafts_leave_library_untouched() {
        let mut library = loaded(vec![game(1, "Existing", 5.0)]);
        let result = library.apply(Command::Update {
            id: 1,
            draft: GameDraft::default(),
        });
        assert_eq!(result, Err(LibraryError::MissingTitle));
        assert_eq!(library.games()[0].title, "Existing");
    }

    #[test]
    fn annotations_update_one_game() {
        let mut library = loaded(vec![game(1, "A", 5.0), game(2, "B", 6.0)]);
        for annotation in [
            Annotation::Status(GameStatus::Playing),
            Annotation::HoursPlayed(12),
            Annotation::PersonalRating(8),
            Annotation::Notes("great soundtrack".into()),
        ] {
            library.apply(Command::Annotate { id: 2, annotation }).unwrap();
        }
        let b = library.find(2).unwrap();
        assert_eq!(b.status, GameStatus::Playing);
        assert_eq!(b.hours_played, 12);
        assert_eq!(b.personal_rating, 8);
        assert_eq!(b.notes, "great soundtrack");
        assert_eq!(library.find(1).unwrap().status, GameStatus::NotStarted);

        assert_eq!(
            library.apply(Command::Annotate {
                id: 2,
                annotation: Annotation::PersonalRating(11),
            }),
            Err(LibraryError::PersonalRatingOutOfRange(11))
        );
        assert_eq!(library.status_facets(), vec![GameStatus::NotStarted, GameStatus::Playing]);
    }

    #[test]
    fn local_filters_apply_without_fetching() {
        let mut library = loaded(vec![game(1, "Alpha", 5.0), game(2, "Beta", 6.0)]);
        assert_eq!(
            library
                .apply(Command::SelectStatus(Some(GameStatus::Completed)))
                .unwrap(),
            None
        );
        assert!(library.visible().is_empty());
        library.apply(Command::SelectStatus(None)).unwrap();
        library.apply(Command::SortBy(SortKey::Title)).unwrap();
        library.apply(Command::ToggleSortOrder).unwrap();
        let titles: Vec<_> = library.visible().iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta"]);
    }
}
