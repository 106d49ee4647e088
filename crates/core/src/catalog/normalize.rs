//! Conversion from catalog records into [`Game`] entries.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use super::raw::{NamedRef, RawGame};
use crate::models::{Game, GameStatus, PLACEHOLDER_IMAGE};

const DEFAULT_GENRE: &str = "Unknown";
const DEFAULT_PLATFORM: &str = "PC";
const DEFAULT_DEVELOPER: &str = "Unknown Developer";
const DEFAULT_PUBLISHER: &str = "Unknown Publisher";
const MAX_RATING: f64 = 10.0;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("invalid tag regex"));
static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("invalid space regex"));

/// Normalize a raw catalog record. Pure: never fails and never touches the
/// input. Annotation fields always start at their defaults.
pub fn normalize(raw: &RawGame) -> Game {
    let genres = collect_names(raw.genres.as_deref());
    let platforms: Vec<String> = raw
        .platforms
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|entry| entry.platform.as_ref())
        .filter_map(|platform| non_blank(platform.name.as_deref()))
        .collect();

    let genre = genres
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_GENRE.to_string());
    let platform = platforms
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_PLATFORM.to_string());

    let developer = first_name(raw.developers.as_deref())
        .unwrap_or_else(|| DEFAULT_DEVELOPER.to_string());
    let publisher = first_name(raw.publishers.as_deref())
        .unwrap_or_else(|| DEFAULT_PUBLISHER.to_string());
    let release_date = raw.released.clone().unwrap_or_default();

    Game {
        id: raw.id,
        title: raw.name.clone().unwrap_or_default(),
        description: resolve_description(raw, &genres),
        genre,
        genres,
        platform,
        platforms,
        developer,
        publisher,
        release_date,
        rating: normalize_rating(raw.rating),
        image_url: non_blank(raw.background_image.as_deref())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        status: GameStatus::NotStarted,
        hours_played: 0,
        personal_rating: 0,
        notes: String::new(),
        website_url: resolve_website(raw),
        metacritic: raw.metacritic.unwrap_or(0),
        ratings_count: raw.ratings_count.unwrap_or(0),
    }
}

/// Remove markup tags and collapse runs of whitespace.
pub fn strip_html(input: &str) -> String {
    let without_tags = TAG_RE.replace_all(input, "");
    SPACE_RE.replace_all(&without_tags, " ").trim().to_string()
}

/// Round to one decimal place and clamp into `[0, 10]`.
pub fn normalize_rating(rating: Option<f64>) -> f64 {
    match rating {
        Some(value) if value.is_finite() => ((value * 10.0).round() / 10.0).clamp(0.0, MAX_RATING),
        _ => 0.0,
    }
}

fn resolve_description(raw: &RawGame, genres: &[String]) -> String {
    if let Some(text) = non_blank(raw.description_raw.as_deref()) {
        return text;
    }
    if let Some(html) = raw.description.as_deref() {
        let stripped = strip_html(html);
        if !stripped.is_empty() {
            return stripped;
        }
    }
    if genres.is_empty() {
        return String::new();
    }

    let genre_text = genres.join(", ").to_lowercase();
    match release_year(raw.released.as_deref()) {
        Some(year) => format!(
            "An exciting {genre_text} game that offers an immersive gaming experience. \
             Released in {year}, this title has captured the attention of gamers worldwide."
        ),
        None => format!(
            "An exciting {genre_text} game that offers an immersive gaming experience. \
             This title has captured the attention of gamers worldwide."
        ),
    }
}

fn resolve_website(raw: &RawGame) -> String {
    let steam = raw
        .stores
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|entry| {
            entry
                .store
                .as_ref()
                .and_then(|store| store.name.as_deref())
                .map(|name| name.to_lowercase().contains("steam"))
                .unwrap_or(false)
        })
        .find_map(|entry| non_blank(entry.url.as_deref()));

    steam
        .or_else(|| non_blank(raw.website.as_deref()))
        .unwrap_or_default()
}

fn release_year(released: Option<&str>) -> Option<i32> {
    let released = released?.trim();
    NaiveDate::parse_from_str(released, "%Y-%m-%d")
        .ok()
        .map(|date| date.year())
        .or_else(|| released.get(..4).and_then(|year| year.parse().ok()))
}

fn collect_names(refs: Option<&[NamedRef]>) -> Vec<String> {
    refs.unwrap_or_default()
        .iter()
        .filter_map(|named| non_blank(named.name.as_deref()))
        .collect()
}

fn first_name(refs: Option<&[NamedRef]>) -> Option<String> {
    collect_names(refs).into_iter().next()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
