#![warn(clippy::all, missing_docs)]

//! Core domain logic for the chimix game catalog browser.
//!
//! This crate hosts the catalog client and its demo fallback, the
//! normalizer that turns wire records into [`Game`] values, configuration
//! handling, and the library state that the terminal UI drives.

pub mod catalog;
pub mod config;
pub mod error;
pub mod library;
pub mod models;
pub mod view;

pub use catalog::{CatalogClient, CatalogService, GamePage, Mode, Origin, PageQuery};
pub use config::AppConfig;
pub use error::{CatalogError, LibraryError};
pub use library::{Annotation, Command, FetchRequest, GameDraft, Library};
pub use models::{Game, GameStatus};
pub use view::{Filters, SortKey, SortOrder, SortSpec};
