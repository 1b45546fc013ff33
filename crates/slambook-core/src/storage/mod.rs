//! Storage layer
//!
//! Persists the whole book collection and the set of unlocked achievements.
//!
//! ## Backends
//!
//! - **JSON files** (`JsonFileBackend`): one file per collection in the data
//!   directory, written atomically
//! - **In-memory** (`InMemoryBackend`): for tests and embedding
//!
//! Every write replaces the whole collection. There is no locking between
//! processes; the last writer wins.

pub mod error;
pub mod memory;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryBackend;
pub use persistence::{JsonFileBackend, StorageStats};

use crate::models::Book;

/// Whole-collection persistence for books and achievements
pub trait BookBackend: Send {
    /// Read every stored book
    fn load_books(&self) -> StorageResult<Vec<Book>>;

    /// Replace the stored books with `books`
    fn save_books(&self, books: &[Book]) -> StorageResult<()>;

    /// Read the IDs of unlocked achievements
    fn load_unlocked(&self) -> StorageResult<Vec<String>>;

    /// Replace the stored achievement IDs
    fn save_unlocked(&self, unlocked: &[String]) -> StorageResult<()>;

    /// Short human-readable description of where data lives
    fn describe(&self) -> String;
}
