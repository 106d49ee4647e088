#![allow(missing_docs)]

//! Shared domain models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cover image used when a record has none.
pub const PLACEHOLDER_IMAGE: &str =
    "https://images.unsplash.com/photo-1550745165-9bc0b252726f?w=400&h=600&fit=crop";

/// Play status a user assigns to a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    Playing,
    Completed,
    #[serde(rename = "On Hold")]
    OnHold,
    Dropped,
}

impl GameStatus {
    /// Every status in display order.
    pub const ALL: [GameStatus; 5] = [
        GameStatus::NotStarted,
        GameStatus::Playing,
        GameStatus::Completed,
        GameStatus::OnHold,
        GameStatus::Dropped,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            GameStatus::NotStarted => "Not Started",
            GameStatus::Playing => "Playing",
            GameStatus::Completed => "Completed",
            GameStatus::OnHold => "On Hold",
            GameStatus::Dropped => "Dropped",
        }
    }

    /// The status following `self`, wrapping around.
    pub fn next(self) -> GameStatus {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A normalized, UI-ready game entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Catalog id, or a millisecond timestamp for user-added entries.
    pub id: u64,
    pub title: String,
    /// Primary genre; equals `genres[0]` when `genres` is non-empty.
    pub genre: String,
    pub genres: Vec<String>,
    /// Primary platform; equals `platforms[0]` when `platforms` is non-empty.
    pub platform: String,
    pub platforms: Vec<String>,
    pub developer: String,
    pub publisher: String,
    /// ISO date (`YYYY-MM-DD`) or empty.
    pub release_date: String,
    /// Community rating rounded to one decimal, within `[0, 10]`.
    pub rating: f64,
    /// Plain-text description, never markup.
    pub description: String,
    pub image_url: String,
    pub status: GameStatus,
    pub hours_played: u32,
    pub personal_rating: u8,
    pub notes: String,
    pub website_url: String,
    /// Metacritic score, `0` when absent.
    pub metacritic: u32,
    /// Number of community ratings, `0` when absent.
    pub ratings_count: u32,
}

impl Game {
    /// Genres to display or filter on, falling back to the primary genre.
    pub fn genre_list(&self) -> Vec<&str> {
        if self.genres.is_empty() {
            vec![self.genre.as_str()]
        } else {
            self.genres.iter().map(String::as_str).collect()
        }
    }

    /// Platforms to display, falling back to the primary platform.
    pub fn platform_list(&self) -> Vec<&str> {
        if self.platforms.is_empty() {
            vec![self.platform.as_str()]
        } else {
            self.platforms.iter().map(String::as_str).collect()
        }
    }

    /// Whether the website link points at a Steam storefront.
    pub fn links_to_steam(&self) -> bool {
        self.website_url.to_lowercase().contains("steam")
    }
}
