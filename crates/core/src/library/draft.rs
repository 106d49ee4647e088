#![allow(missing_docs)]

//! Editable form state for adding or updating a game.

use chrono::NaiveDate;

use crate::{
    error::LibraryError,
    models::{Game, GameStatus, PLACEHOLDER_IMAGE},
};

const MAX_RATING: f64 = 10.0;
const MAX_PERSONAL_RATING: u8 = 10;

/// Text-oriented mirror of [`Game`] used by the add/edit form.
///
/// `genres` and `platforms` hold comma-separated lists; the first entry
/// becomes the primary value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameDraft {
    pub title: String,
    pub description: String,
    pub developer: String,
    pub publisher: String,
    pub genres: String,
    pub platforms: String,
    pub release_date: String,
    pub rating: f64,
    pub image_url: String,
    pub website_url: String,
    pub status: GameStatus,
    pub hours_played: u32,
    pub personal_rating: u8,
    pub notes: String,
    pub metacritic: u32,
    pub ratings_count: u32,
}

impl GameDraft {
    /// Prefill a draft from an existing game.
    pub fn from_game(game: &Game) -> Self {
        Self {
            title: game.title.clone(),
            description: game.description.clone(),
            developer: game.developer.clone(),
            publisher: game.publisher.clone(),
            genres: game.genre_list().join(", "),
            platforms: game.platform_list().join(", "),
            release_date: game.release_date.clone(),
            rating: game.rating,
            image_url: game.image_url.clone(),
            website_url: game.website_url.clone(),
            status: game.status,
            hours_played: game.hours_played,
            personal_rating: game.personal_rating,
            notes: game.notes.clone(),
            metacritic: game.metacritic,
            ratings_count: game.ratings_count,
        }
    }

    /// Check the draft without building a game.
    pub fn validate(&self) -> Result<(), LibraryError> {
        if self.title.trim().is_empty() {
            return Err(LibraryError::MissingTitle);
        }
        if !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(LibraryError::RatingOutOfRange(self.rating));
        }
        if self.personal_rating > MAX_PERSONAL_RATING {
            return Err(LibraryError::PersonalRatingOutOfRange(self.personal_rating));
        }
        let date = self.release_date.trim();
        if !date.is_empty() && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(LibraryError::InvalidReleaseDate(date.to_string()));
        }
        Ok(())
    }

    /// Build a game with the given id after validation.
    pub fn into_game(self, id: u64) -> Result<Game, LibraryError> {
        self.validate()?;

        let genres = split_list(&self.genres);
        let platforms = split_list(&self.platforms);
        let genre = genres.first().cloned().unwrap_or_default();
        let platform = platforms.first().cloned().unwrap_or_default();
        let image_url = match self.image_url.trim() {
            "" => PLACEHOLDER_IMAGE.to_string(),
            url => url.to_string(),
        };

        Ok(Game {
            id,
            title: self.title.trim().to_string(),
            genre,
            genres,
            platform,
            platforms,
            developer: self.developer.trim().to_string(),
            publisher: self.publisher.trim().to_string(),
            release_date: self.release_date.trim().to_string(),
            rating: (self.rating * 10.0).round() / 10.0,
            description: self.description.trim().to_string(),
            image_url,
            status: self.status,
            hours_played: self.hours_played,
            personal_rating: self.personal_rating,
            notes: self.notes,
            website_url: self.website_url.trim().to_string(),
            metacritic: self.metacritic,
            ratings_count: self.ratings_count,
        })
    }
}

fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
