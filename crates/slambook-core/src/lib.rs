//! Slambook Core Library
//!
//! This crate provides the core functionality for slambook, a local
//! digital slam book: books of questions that friends answer, with
//! pages, media, responses and unlockable achievements.
//!
//! # Architecture
//!
//! - **Store**: whole-collection read-modify-write over a storage backend
//! - **Storage**: JSON files in the data directory, or in memory
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open()?;
//!
//! // Create a book
//! let book = store.create_book("Trip 2024", Theme::Default, Layout::Single)?;
//!
//! // Record a response
//! store.add_response(&book.id, NewResponse::new("Sam"))?;
//!
//! // See what got unlocked
//! let report = store.check_achievements()?;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: Books, pages, questions, media and responses
//! - `storage`: Storage backends
//! - `achievements`: Statistics and unlock rules
//! - `export`: JSON export and import
//! - `share`: Share links and their decorative pattern
//! - `media`: Loading image and video files
//! - `validation`: Checks run before store calls
//! - `config`: Application configuration

pub mod achievements;
pub mod config;
pub mod error;
pub mod export;
pub mod id;
pub mod media;
pub mod models;
pub mod share;
pub mod storage;
pub mod store;
pub mod validation;

pub use achievements::{Achievement, AchievementProgress, AchievementReport, Stats};
pub use config::Config;
pub use error::Error;
pub use models::{
    Book, BookPatch, Layout, Media, MediaPatch, MediaType, NewMedia, NewQuestion, NewResponse,
    Page, Question, QuestionPatch, QuestionType, Response, Theme,
};
pub use share::{ShareLink, SharePattern, SharePayload};
pub use storage::{BookBackend, InMemoryBackend, JsonFileBackend, StorageError, StorageStats};
pub use store::Store;
