#![allow(missing_docs)]

//! Filter and sort derivation over the loaded game list.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate};

use crate::models::{Game, GameStatus};

/// Field a listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Title,
    #[default]
    Rating,
    ReleaseDate,
    HoursPlayed,
}

impl SortKey {
    /// Every key in menu order.
    pub const ALL: [SortKey; 4] = [
        SortKey::Title,
        SortKey::Rating,
        SortKey::ReleaseDate,
        SortKey::HoursPlayed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Title => "Title",
            SortKey::Rating => "Rating",
            SortKey::ReleaseDate => "Release Date",
            SortKey::HoursPlayed => "Hours Played",
        }
    }

    /// The key following `self`, wrapping around.
    pub fn next(self) -> SortKey {
        let idx = Self::ALL.iter().position(|key| *key == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> SortOrder {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortOrder::Ascending => "↑",
            SortOrder::Descending => "↓",
        }
    }
}

/// Sort key plus direction. Defaults to rating, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }
}

/// Optional predicates, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    /// Case-insensitive substring over title, description, developer and genres.
    pub search: String,
    /// Exact genre name.
    pub genre: Option<String>,
    pub status: Option<GameStatus>,
}

impl Filters {
    /// Whether any predicate is active.
    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty() || self.genre.is_some() || self.status.is_some()
    }

    /// Whether `game` passes every active predicate.
    pub fn matches(&self, game: &Game) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() && !matches_search(game, &needle) {
            return false;
        }
        if let Some(genre) = &self.genre {
            if !game.genre_list().contains(&genre.as_str()) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if game.status != status {
                return false;
            }
        }
        true
    }
}

fn matches_search(game: &Game, needle: &str) -> bool {
    game.title.to_lowercase().contains(needle)
        || game.description.to_lowercase().contains(needle)
        || game.developer.to_lowercase().contains(needle)
        || game
            .genre_list()
            .iter()
            .any(|genre| genre.to_lowercase().contains(needle))
}

/// Derive the displayed subset of `games`: filter, then stable-sort.
///
/// Pure and deterministic. Games comparing equal keep their input order in
/// both directions. Release dates that do not parse sort after every valid
/// date regardless of direction.
pub fn derive<'a>(games: &'a [Game], filters: &Filters, sort: SortSpec) -> Vec<&'a Game> {
    let mut subset: Vec<&Game> = games.iter().filter(|game| filters.matches(game)).collect();
    subset.sort_by(|a, b| compare(a, b, sort));
    subset
}

fn compare(a: &Game, b: &Game, sort: SortSpec) -> Ordering {
    if sort.key == SortKey::ReleaseDate {
        return compare_dates(
            parse_release_date(&a.release_date),
            parse_release_date(&b.release_date),
            sort.order,
        );
    }

    let (left, right) = match sort.order {
        SortOrder::Ascending => (a, b),
        SortOrder::Descending => (b, a),
    };
    match sort.key {
        SortKey::Title => left.title.to_lowercase().cmp(&right.title.to_lowercase()),
        SortKey::Rating => left.rating.total_cmp(&right.rating),
        SortKey::HoursPlayed => left.hours_played.cmp(&right.hours_played),
        SortKey::ReleaseDate => Ordering::Equal,
    }
}

fn compare_dates(a: Option<NaiveDate>, b: Option<NaiveDate>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::Ascending => a.cmp(&b),
            SortOrder::Descending => b.cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Parse a `YYYY-MM-DD` date or an RFC 3339 timestamp.
pub fn parse_release_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Distinct genres across `games` in first-seen order.
pub fn genre_facets(games: &[Game]) -> Vec<String> {
    let mut facets: Vec<String> = Vec::new();
    for genre in games.iter().flat_map(|game| game.genre_list()) {
        if !genre.is_empty() && !facets.iter().any(|known| known == genre) {
            facets.push(genre.to_string());
        }
    }
    facets
}

/// Distinct statuses present in `games` in first-seen order.
pub fn status_facets(games: &[Game]) -> Vec<GameStatus> {
    let mut facets = Vec::new();
    for game in games {
        if !facets.contains(&game.status) {
            facets.push(game.status);
        }
    }
    facets
}
