//! Unified storage interface
//!
//! The `Store` is the single entry point for reading and changing books.
//! It sits on top of a `BookBackend` and works on the whole collection:
//! every mutation loads all books, edits the owning book, stamps its
//! `updated_at` and writes everything back.
//!
//! ## Failure model
//!
//! - Reads are fail-soft: a collection that can't be read is logged and
//!   treated as empty.
//! - A mutation that names a missing book, page, question, media item or
//!   response returns `None` (or `false`) and writes nothing.
//! - Write failures are returned as errors.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open()?;
//!
//! let book = store.create_book("Trip 2024", Theme::Default, Layout::Single)?;
//! let page = &book.pages[0];
//! store.add_question(&book.id, &page.id, NewQuestion::new("Best moment?"))?;
//!
//! let books = store.get_all_books()?;
//! ```

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::achievements::{self, AchievementProgress, AchievementReport, Stats, ACHIEVEMENTS};
use crate::config::Config;
use crate::export;
use crate::models::{
    Book, BookPatch, Layout, Media, MediaPatch, NewMedia, NewQuestion, NewResponse, Page,
    Question, QuestionPatch, Response, Theme,
};
use crate::storage::{BookBackend, JsonFileBackend};

/// Unified storage interface for slam books
pub struct Store {
    backend: Box<dyn BookBackend>,
    config: Config,
}

impl Store {
    /// Open the store using the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config)
    }

    /// Open the JSON file store described by `config`
    pub fn open_with_config(config: Config) -> Result<Self> {
        let backend = JsonFileBackend::new(&config);
        debug!("Opening store at {:?}", config.data_dir);
        Ok(Self {
            backend: Box::new(backend),
            config,
        })
    }

    /// Open a store over an arbitrary backend
    pub fn with_backend(backend: impl BookBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            config: Config::default(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Where the data lives, for display
    pub fn storage_description(&self) -> String {
        self.backend.describe()
    }

    // ==================== Collection ====================

    fn load_all(&self) -> Vec<Book> {
        match self.backend.load_books() {
            Ok(books) => books,
            Err(e) => {
                warn!("Could not read books, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    fn save_all(&mut self, books: &[Book]) -> Result<()> {
        self.backend
            .save_books(books)
            .context("Failed to save books")
    }

    /// Apply `f` to one book and persist the result
    ///
    /// Returns `None` without writing if the book is missing or `f`
    /// returns `None`. Otherwise the book is touched and every book saved.
    fn modify_book<T>(
        &mut self,
        book_id: &str,
        f: impl FnOnce(&mut Book) -> Option<T>,
    ) -> Result<Option<T>> {
        let mut books = self.load_all();
        let Some(book) = books.iter_mut().find(|b| b.id == book_id) else {
            debug!("Book {} not found", book_id);
            return Ok(None);
        };

        let Some(result) = f(book) else {
            return Ok(None);
        };
        book.touch();

        self.save_all(&books)?;
        Ok(Some(result))
    }

    /// Like `modify_book`, for changes scoped to one page
    fn modify_page<T>(
        &mut self,
        book_id: &str,
        page_id: &str,
        f: impl FnOnce(&mut Page) -> Option<T>,
    ) -> Result<Option<T>> {
        self.modify_book(book_id, |book| {
            let page = book.page_mut(page_id)?;
            f(page)
        })
    }

    // ==================== Book Operations ====================

    /// Get every book
    pub fn get_all_books(&self) -> Result<Vec<Book>> {
        Ok(self.load_all())
    }

    /// Get a book by ID
    pub fn get_book(&self, id: &str) -> Result<Option<Book>> {
        Ok(self.load_all().into_iter().find(|b| b.id == id))
    }

    /// Create a book with one empty page
    pub fn create_book(&mut self, title: &str, theme: Theme, layout: Layout) -> Result<Book> {
        let book = Book::new(title, theme, layout);
        let mut books = self.load_all();
        books.push(book.clone());
        self.save_all(&books)
            .context("Failed to create book")?;

        info!("Created book {} ({:?})", book.id, book.title);
        Ok(book)
    }

    /// Update a book's title, theme or layout
    pub fn update_book(&mut self, id: &str, patch: BookPatch) -> Result<Option<Book>> {
        debug!("Updating book {}", id);
        self.modify_book(id, |book| {
            book.apply(patch);
            Some(())
        })?;
        self.get_book(id)
    }

    /// Delete a book and everything it owns
    ///
    /// Returns whether the book existed. The collection is written either way.
    pub fn delete_book(&mut self, id: &str) -> Result<bool> {
        let mut books = self.load_all();
        let before = books.len();
        books.retain(|b| b.id != id);
        let removed = books.len() != before;

        self.save_all(&books)
            .context("Failed to delete book")?;

        if removed {
            info!("Deleted book {}", id);
        } else {
            debug!("Delete of unknown book {}", id);
        }
        Ok(removed)
    }

    // ==================== Page Operations ====================

    /// Append an empty page to a book
    pub fn add_page(&mut self, book_id: &str) -> Result<Option<Page>> {
        debug!("Adding page to book {}", book_id);
        self.modify_book(book_id, |book| Some(book.push_page().clone()))
    }

    /// Delete a page and renumber the remaining ones
    pub fn delete_page(&mut self, book_id: &str, page_id: &str) -> Result<Option<Book>> {
        debug!("Deleting page {} from book {}", page_id, book_id);
        let removed = self.modify_book(book_id, |book| book.remove_page(page_id).then_some(()))?;
        match removed {
            Some(()) => self.get_book(book_id),
            None => Ok(None),
        }
    }

    // ==================== Question Operations ====================

    /// Add a question to a page
    pub fn add_question(
        &mut self,
        book_id: &str,
        page_id: &str,
        input: NewQuestion,
    ) -> Result<Option<Question>> {
        debug!("Adding question to page {} of book {}", page_id, book_id);
        self.modify_page(book_id, page_id, |page| {
            let question = Question::new(input);
            page.questions.push(question.clone());
            Some(question)
        })
    }

    /// Change fields of a question
    pub fn update_question(
        &mut self,
        book_id: &str,
        page_id: &str,
        question_id: &str,
        patch: QuestionPatch,
    ) -> Result<Option<Question>> {
        debug!("Updating question {}", question_id);
        self.modify_page(book_id, page_id, |page| {
            let question = page.question_mut(question_id)?;
            question.apply(patch);
            Some(question.clone())
        })
    }

    /// Delete a question, returning the page without it
    ///
    /// Answers already recorded for the question are left in place.
    pub fn delete_question(
        &mut self,
        book_id: &str,
        page_id: &str,
        question_id: &str,
    ) -> Result<Option<Page>> {
        debug!("Deleting question {}", question_id);
        self.modify_page(book_id, page_id, |page| {
            page.remove_question(question_id).then(|| page.clone())
        })
    }

    // ==================== Media Operations ====================

    /// Attach media to a page
    pub fn add_media(
        &mut self,
        book_id: &str,
        page_id: &str,
        input: NewMedia,
    ) -> Result<Option<Media>> {
        debug!("Adding {} to page {} of book {}", input.media_type, page_id, book_id);
        self.modify_page(book_id, page_id, |page| {
            let media = Media::new(input);
            page.media.push(media.clone());
            Some(media)
        })
    }

    /// Change a media item's caption
    pub fn update_media(
        &mut self,
        book_id: &str,
        page_id: &str,
        media_id: &str,
        patch: MediaPatch,
    ) -> Result<Option<Media>> {
        debug!("Updating media {}", media_id);
        self.modify_page(book_id, page_id, |page| {
            let media = page.media_item_mut(media_id)?;
            media.apply(patch);
            Some(media.clone())
        })
    }

    /// Delete a media item, returning the page without it
    pub fn delete_media(
        &mut self,
        book_id: &str,
        page_id: &str,
        media_id: &str,
    ) -> Result<Option<Page>> {
        debug!("Deleting media {}", media_id);
        self.modify_page(book_id, page_id, |page| {
            page.remove_media(media_id).then(|| page.clone())
        })
    }

    // ==================== Response Operations ====================

    /// Record a response to a book
    ///
    /// Answers are stored as given; see `validation::validate_answers`.
    pub fn add_response(&mut self, book_id: &str, input: NewResponse) -> Result<Option<Response>> {
        let response = self.modify_book(book_id, |book| {
            let response = Response::new(input);
            book.responses.push(response.clone());
            Some(response)
        })?;
        if let Some(response) = &response {
            info!(
                "Recorded response {} from {:?} on book {}",
                response.id, response.responder_name, book_id
            );
        }
        Ok(response)
    }

    /// Get every response to a book (empty if the book is missing)
    pub fn get_book_responses(&self, book_id: &str) -> Result<Vec<Response>> {
        Ok(self
            .get_book(book_id)?
            .map(|b| b.responses)
            .unwrap_or_default())
    }

    /// Get one response
    pub fn get_response(&self, book_id: &str, response_id: &str) -> Result<Option<Response>> {
        Ok(self
            .get_book(book_id)?
            .and_then(|b| b.response(response_id).cloned()))
    }

    /// Delete a response; returns whether it existed
    pub fn delete_response(&mut self, book_id: &str, response_id: &str) -> Result<bool> {
        debug!("Deleting response {} from book {}", response_id, book_id);
        let removed = self.modify_book(book_id, |book| {
            let before = book.responses.len();
            book.responses.retain(|r| r.id != response_id);
            (book.responses.len() != before).then_some(())
        })?;
        Ok(removed.is_some())
    }

    // ==================== Import ====================

    /// Import an exported book as a new book
    ///
    /// Fails with `Error::InvalidFormat` (reachable via `downcast_ref`)
    /// when the content is not a book; nothing is written in that case.
    pub fn import_book(&mut self, contents: &str) -> Result<Book> {
        let book = export::parse_import(contents).context("Failed to import book")?;

        let mut books = self.load_all();
        books.push(book.clone());
        self.save_all(&books)?;

        info!("Imported book {} ({:?})", book.id, book.title);
        Ok(book)
    }

    // ==================== Achievements ====================

    /// Aggregate statistics over every book
    pub fn stats(&self) -> Result<Stats> {
        Ok(Stats::compute(&self.load_all()))
    }

    fn load_unlocked(&self) -> Vec<String> {
        match self.backend.load_unlocked() {
            Ok(unlocked) => unlocked,
            Err(e) => {
                warn!("Could not read achievements, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Unlock every achievement whose rule now holds
    ///
    /// The unlocked set is only written when it grows.
    pub fn check_achievements(&mut self) -> Result<AchievementReport> {
        let stats = self.stats()?;
        let mut unlocked = self.load_unlocked();
        let newly_unlocked = achievements::evaluate(&stats, &mut unlocked);

        if !newly_unlocked.is_empty() {
            self.backend
                .save_unlocked(&unlocked)
                .context("Failed to save achievements")?;
            for achievement in &newly_unlocked {
                info!("Achievement unlocked: {}", achievement.id);
            }
        }

        Ok(AchievementReport {
            total_unlocked: unlocked.len(),
            total_achievements: ACHIEVEMENTS.len(),
            unlocked,
            newly_unlocked,
            stats,
        })
    }

    /// Every achievement with its unlocked and met state
    pub fn achievement_progress(&self) -> Result<Vec<AchievementProgress>> {
        let stats = self.stats()?;
        Ok(achievements::progress(&stats, &self.load_unlocked()))
    }
}
