//! In-memory backend
//!
//! Keeps the collections in process memory. Clones share the same
//! underlying state, which lets tests open two stores over one "device".

use std::sync::{Arc, Mutex, MutexGuard};

use super::error::{StorageError, StorageResult};
use super::BookBackend;
use crate::models::Book;

#[derive(Debug, Default)]
struct State {
    books: Vec<Book>,
    unlocked: Vec<String>,
    writes: usize,
}

/// A backend holding everything in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<State>>,
}

impl InMemoryBackend {
    /// Creates a new, empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of book-collection writes performed so far
    pub fn write_count(&self) -> usize {
        self.lock().map(|s| s.writes).unwrap_or(0)
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| StorageError::Unavailable("in-memory state lock poisoned".to_string()))
    }
}

impl BookBackend for InMemoryBackend {
    fn load_books(&self) -> StorageResult<Vec<Book>> {
        Ok(self.lock()?.books.clone())
    }

    fn save_books(&self, books: &[Book]) -> StorageResult<()> {
        let mut state = self.lock()?;
        state.books = books.to_vec();
        state.writes += 1;
        Ok(())
    }

    fn load_unlocked(&self) -> StorageResult<Vec<String>> {
        Ok(self.lock()?.unlocked.clone())
    }

    fn save_unlocked(&self, unlocked: &[String]) -> StorageResult<()> {
        self.lock()?.unlocked = unlocked.to_vec();
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Layout, Theme};

    #[test]
    fn test_round_trip() {
        let backend = InMemoryBackend::new();
        assert!(backend.load_books().unwrap().is_empty());

        let book = Book::new("Memory", Theme::Default, Layout::Single);
        backend.save_books(&[book.clone()]).unwrap();
        assert_eq!(backend.load_books().unwrap(), vec![book]);
        assert_eq!(backend.write_count(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let backend = InMemoryBackend::new();
        let other = backend.clone();

        other.save_unlocked(&["first_book".to_string()]).unwrap();
        assert_eq!(backend.load_unlocked().unwrap(), vec!["first_book"]);
    }
}
