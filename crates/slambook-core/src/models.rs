//! Data models for slambook
//!
//! Defines the book tree: a `Book` owns its `Page`s and `Response`s, a
//! `Page` owns its `Question`s and `Media`. Everything is stored by value;
//! the persisted JSON uses camelCase field names and millisecond
//! timestamps.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::id::new_id;

/// Title given to books created without one
pub const UNTITLED_BOOK: &str = "Untitled Slam Book";

/// Name recorded for responses submitted without one
pub const ANONYMOUS: &str = "Anonymous";

/// Current time truncated to millisecond precision
///
/// Persisted timestamps only carry milliseconds, so anything we stamp is
/// truncated up front to survive a save/load unchanged.
pub fn now_millis() -> DateTime<Utc> {
    let ms = Utc::now().timestamp_millis();
    Utc.timestamp_millis_opt(ms).single().unwrap_or_else(Utc::now)
}

/// A timestamp strictly later than `previous`
///
/// Uses the wall clock when it has moved on, otherwise `previous + 1ms`.
/// Returns `None` when `previous` is already the latest representable
/// millisecond.
pub fn checked_next_timestamp(previous: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let now = now_millis();
    if now > previous {
        Some(now)
    } else {
        previous.checked_add_signed(Duration::milliseconds(1))
    }
}

/// Like `checked_next_timestamp`, but stays at `previous` at the upper bound
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    checked_next_timestamp(previous).unwrap_or(previous)
}

// ==================== Enums ====================

/// Visual theme of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Theme {
    #[default]
    Default,
    Colorful,
    Elegant,
    Dark,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Default, Theme::Colorful, Theme::Elegant, Theme::Dark];

    /// Stored identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Colorful => "colorful",
            Theme::Elegant => "elegant",
            Theme::Dark => "dark",
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Theme::Default => "Default",
            Theme::Colorful => "Colorful",
            Theme::Elegant => "Elegant",
            Theme::Dark => "Dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown theme '{}'. Valid themes: default, colorful, elegant, dark",
                    s
                )
            })
    }
}

/// Page layout of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Layout {
    #[default]
    Single,
    TwoColumns,
    Grid,
}

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::Single, Layout::TwoColumns, Layout::Grid];

    /// Stored identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Single => "single",
            Layout::TwoColumns => "twoColumns",
            Layout::Grid => "grid",
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Layout::Single => "Single Column",
            Layout::TwoColumns => "Two Columns",
            Layout::Grid => "Grid",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Layout::Single => "One column layout with full width content",
            Layout::TwoColumns => "Two column layout for side-by-side content",
            Layout::Grid => "Grid layout for organized content",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.trim().chars().filter(|c| *c != '-' && *c != '_').collect();
        Layout::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                format!(
                    "Unknown layout '{}'. Valid layouts: single, twoColumns, grid",
                    s
                )
            })
    }
}

/// Kind of answer a question expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionType {
    #[default]
    Text,
    Textarea,
    Rating,
    Choice,
}

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [
        QuestionType::Text,
        QuestionType::Textarea,
        QuestionType::Rating,
        QuestionType::Choice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Textarea => "textarea",
            QuestionType::Rating => "rating",
            QuestionType::Choice => "choice",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuestionType::Text => "Short Text",
            QuestionType::Textarea => "Long Text",
            QuestionType::Rating => "Rating (1-5)",
            QuestionType::Choice => "Multiple Choice",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown question type '{}'. Valid types: text, textarea, rating, choice",
                    s
                )
            })
    }
}

/// Kind of media attached to a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            _ => Err(format!(
                "Unknown media type '{}'. Valid types: image, video",
                s
            )),
        }
    }
}

// ==================== Book ====================

/// A slam book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier, never changes after creation
    pub id: String,
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Advances on every mutation of the book or anything it owns
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub layout: Layout,
    /// Pages in display order; `order` always equals the index
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub responses: Vec<Response>,
}

impl Book {
    /// Create a new book with a single empty page
    ///
    /// A blank title is replaced with [`UNTITLED_BOOK`].
    pub fn new(title: impl Into<String>, theme: Theme, layout: Layout) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            UNTITLED_BOOK.to_string()
        } else {
            title
        };
        let now = now_millis();
        Self {
            id: new_id(),
            title,
            created_at: now,
            updated_at: now,
            theme,
            layout,
            pages: vec![Page::new(0)],
            responses: Vec::new(),
        }
    }

    /// Mark the book as modified
    pub fn touch(&mut self) {
        self.updated_at = next_timestamp(self.updated_at);
    }

    /// Apply a field-level patch
    pub fn apply(&mut self, patch: BookPatch) {
        if let Some(title) = patch.title {
            if !title.trim().is_empty() {
                self.title = title;
            }
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(layout) = patch.layout {
            self.layout = layout;
        }
    }

    pub fn page_mut(&mut self, page_id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == page_id)
    }

    /// Append a new empty page at the end
    pub fn push_page(&mut self) -> &Page {
        let page = Page::new(self.pages.len());
        self.pages.push(page);
        &self.pages[self.pages.len() - 1]
    }

    /// Remove a page and renumber the rest; returns false if absent
    pub fn remove_page(&mut self, page_id: &str) -> bool {
        let Some(pos) = self.pages.iter().position(|p| p.id == page_id) else {
            return false;
        };
        self.pages.remove(pos);
        self.renumber_pages();
        true
    }

    /// Make page `order` values equal to their position
    pub fn renumber_pages(&mut self) {
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.order = index;
        }
    }

    /// All questions across all pages, in page order
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.pages.iter().flat_map(|p| p.questions.iter())
    }

    pub fn find_question(&self, question_id: &str) -> Option<&Question> {
        self.questions().find(|q| q.id == question_id)
    }

    pub fn question_count(&self) -> usize {
        self.pages.iter().map(|p| p.questions.len()).sum()
    }

    pub fn media_count(&self) -> usize {
        self.pages.iter().map(|p| p.media.len()).sum()
    }

    pub fn response(&self, response_id: &str) -> Option<&Response> {
        self.responses.iter().find(|r| r.id == response_id)
    }
}

/// Fields of a book that can be changed after creation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub theme: Option<Theme>,
    pub layout: Option<Layout>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.theme.is_none() && self.layout.is_none()
    }
}

// ==================== Page ====================

/// One page of a book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    /// Zero-based position among the book's pages
    pub order: usize,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub media: Vec<Media>,
}

impl Page {
    pub fn new(order: usize) -> Self {
        Self {
            id: new_id(),
            order,
            questions: Vec::new(),
            media: Vec::new(),
        }
    }

    pub fn question_mut(&mut self, question_id: &str) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.id == question_id)
    }

    pub fn media_item_mut(&mut self, media_id: &str) -> Option<&mut Media> {
        self.media.iter_mut().find(|m| m.id == media_id)
    }

    /// Remove a question; returns false if absent
    pub fn remove_question(&mut self, question_id: &str) -> bool {
        let before = self.questions.len();
        self.questions.retain(|q| q.id != question_id);
        self.questions.len() != before
    }

    /// Remove a media item; returns false if absent
    pub fn remove_media(&mut self, media_id: &str) -> bool {
        let before = self.media.len();
        self.media.retain(|m| m.id != media_id);
        self.media.len() != before
    }
}

// ==================== Question ====================

/// A question on a page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
    /// The question text
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub required: bool,
    /// Answer choices; present only for `choice` questions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Question {
    /// Build a question from caller input, applying defaults
    pub fn new(input: NewQuestion) -> Self {
        let mut question = Self {
            id: new_id(),
            question_type: input.question_type.unwrap_or_default(),
            question: input.question,
            required: input.required.unwrap_or(false),
            options: input.options,
        };
        question.normalize_options();
        question
    }

    /// Apply a field-level patch
    pub fn apply(&mut self, patch: QuestionPatch) {
        if let Some(question_type) = patch.question_type {
            self.question_type = question_type;
        }
        if let Some(text) = patch.question {
            self.question = text;
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
        if let Some(options) = patch.options {
            self.options = Some(options);
        }
        self.normalize_options();
    }

    /// Options exist iff the question is a `choice` question
    fn normalize_options(&mut self) {
        if self.question_type == QuestionType::Choice {
            if self.options.is_none() {
                self.options = Some(Vec::new());
            }
        } else {
            self.options = None;
        }
    }

    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }
}

/// Caller input for a new question
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    #[serde(rename = "type", default)]
    pub question_type: Option<QuestionType>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl NewQuestion {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, question_type: QuestionType) -> Self {
        self.question_type = Some(question_type);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }
}

/// Field-level changes to a question
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionPatch {
    pub question_type: Option<QuestionType>,
    pub question: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
}

// ==================== Media ====================

/// An image or video attached to a page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Content as a `data:` URI
    pub url: String,
    #[serde(default)]
    pub caption: String,
}

impl Media {
    pub fn new(input: NewMedia) -> Self {
        Self {
            id: new_id(),
            media_type: input.media_type,
            url: input.url,
            caption: input.caption.unwrap_or_default(),
        }
    }

    pub fn apply(&mut self, patch: MediaPatch) {
        if let Some(caption) = patch.caption {
            self.caption = caption;
        }
    }
}

/// Caller input for new media
#[derive(Debug, Clone, PartialEq)]
pub struct NewMedia {
    pub media_type: MediaType,
    pub url: String,
    pub caption: Option<String>,
}

/// Field-level changes to media
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaPatch {
    pub caption: Option<String>,
}

// ==================== Response ====================

/// A filled-out copy of a book
///
/// `answers` maps question IDs to answer text. Keys are not checked
/// against the book's questions and may outlive them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: String,
    pub responder_name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
}

impl Response {
    pub fn new(input: NewResponse) -> Self {
        let name = input.responder_name.trim();
        Self {
            id: new_id(),
            responder_name: if name.is_empty() {
                ANONYMOUS.to_string()
            } else {
                name.to_string()
            },
            created_at: now_millis(),
            answers: input.answers,
        }
    }

    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }
}

/// Caller input for a new response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewResponse {
    pub responder_name: String,
    pub answers: BTreeMap<String, String>,
}

impl NewResponse {
    pub fn new(responder_name: impl Into<String>) -> Self {
        Self {
            responder_name: responder_name.into(),
            answers: BTreeMap::new(),
        }
    }

    pub fn answer(mut self, question_id: impl Into<String>, value: impl Into<String>) -> Self {
        self.answers.insert(question_id.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_new() {
        let book = Book::new("Trip 2024", Theme::Default, Layout::Single);
        assert_eq!(book.title, "Trip 2024");
        assert_eq!(book.pages.len(), 1);
        assert_eq!(book.pages[0].order, 0);
        assert!(book.pages[0].questions.is_empty());
        assert!(book.pages[0].media.is_empty());
        assert!(book.responses.is_empty());
        assert_eq!(book.created_at, book.updated_at);
    }

    #[test]
    fn test_book_blank_title() {
        let book = Book::new("   ", Theme::Dark, Layout::Grid);
        assert_eq!(book.title, UNTITLED_BOOK);
    }

    #[test]
    fn test_touch_advances() {
        let mut book = Book::new("Book", Theme::Default, Layout::Single);
        let before = book.updated_at;
        book.touch();
        assert!(book.updated_at > before);
        let second = book.updated_at;
        book.touch();
        assert!(book.updated_at > second);
    }

    #[test]
    fn test_next_timestamp_when_clock_behind() {
        let future = now_millis() + Duration::hours(1);
        let next = next_timestamp(future);
        assert_eq!(next, future + Duration::milliseconds(1));
    }

    #[test]
    fn test_next_timestamp_at_upper_bound() {
        let last_ms = DateTime::<Utc>::MAX_UTC.timestamp_millis();
        let latest = DateTime::<Utc>::from_timestamp_millis(last_ms).unwrap();

        assert!(checked_next_timestamp(latest).is_none());
        assert_eq!(next_timestamp(latest), latest);

        let mut book = Book::new("Book", Theme::Default, Layout::Single);
        book.updated_at = latest;
        book.touch();
        assert_eq!(book.updated_at, latest);
    }

    #[test]
    fn test_page_renumbering() {
        let mut book = Book::new("Book", Theme::Default, Layout::Single);
        book.push_page();
        book.push_page();
        let middle = book.pages[1].id.clone();

        assert!(book.remove_page(&middle));
        let orders: Vec<usize> = book.pages.iter().map(|p| p.order).collect();
        assert_eq!(orders, vec![0, 1]);
        assert!(!book.remove_page(&middle));
    }

    #[test]
    fn test_question_defaults() {
        let q = Question::new(NewQuestion::new("Favourite colour?"));
        assert_eq!(q.question_type, QuestionType::Text);
        assert!(!q.required);
        assert!(q.options.is_none());
    }

    #[test]
    fn test_question_options_only_for_choice() {
        let q = Question::new(NewQuestion::new("Pick").with_options(["A", "B"]));
        assert!(q.options.is_none());

        let q = Question::new(
            NewQuestion::new("Pick")
                .with_type(QuestionType::Choice)
                .with_options(["A", "B"]),
        );
        assert_eq!(q.options(), &["A".to_string(), "B".to_string()]);

        let q = Question::new(NewQuestion::new("Pick").with_type(QuestionType::Choice));
        assert_eq!(q.options, Some(Vec::new()));
    }

    #[test]
    fn test_question_patch_drops_options() {
        let mut q = Question::new(
            NewQuestion::new("Pick")
                .with_type(QuestionType::Choice)
                .with_options(["A", "B"]),
        );
        q.apply(QuestionPatch {
            question_type: Some(QuestionType::Rating),
            ..Default::default()
        });
        assert_eq!(q.question_type, QuestionType::Rating);
        assert!(q.options.is_none());
    }

    #[test]
    fn test_response_anonymous() {
        let r = Response::new(NewResponse::new("  "));
        assert_eq!(r.responder_name, ANONYMOUS);

        let r = Response::new(NewResponse::new(" Sam ").answer("q1", "yes"));
        assert_eq!(r.responder_name, "Sam");
        assert_eq!(r.answer("q1"), Some("yes"));
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("colorful".parse::<Theme>().unwrap(), Theme::Colorful);
        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("neon".parse::<Theme>().is_err());

        assert_eq!("twoColumns".parse::<Layout>().unwrap(), Layout::TwoColumns);
        assert_eq!("two-columns".parse::<Layout>().unwrap(), Layout::TwoColumns);
        assert_eq!("grid".parse::<Layout>().unwrap(), Layout::Grid);

        assert_eq!("choice".parse::<QuestionType>().unwrap(), QuestionType::Choice);
        assert_eq!("video".parse::<MediaType>().unwrap(), MediaType::Video);
    }

    #[test]
    fn test_persisted_field_names() {
        let mut book = Book::new("Book", Theme::Elegant, Layout::TwoColumns);
        book.pages[0]
            .questions
            .push(Question::new(NewQuestion::new("Why?")));
        let json = serde_json::to_value(&book).unwrap();

        assert!(json["createdAt"].is_i64());
        assert!(json["updatedAt"].is_i64());
        assert_eq!(json["theme"], "elegant");
        assert_eq!(json["layout"], "twoColumns");
        assert_eq!(json["pages"][0]["questions"][0]["type"], "text");
        assert!(json["pages"][0]["questions"][0].get("options").is_none());
    }

    #[test]
    fn test_book_serialization() {
        let mut book = Book::new("Book", Theme::Default, Layout::Single);
        book.responses
            .push(Response::new(NewResponse::new("Ana").answer("q", "4")));
        let json = serde_json::to_string(&book).unwrap();
        let deserialized: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(book, deserialized);
    }

    #[test]
    fn test_tolerant_deserialization() {
        let json = r#"{
            "id": "abc",
            "title": "Old",
            "createdAt": 1700000000000,
            "updatedAt": 1700000000000,
            "pages": [{"id": "p1", "order": 0, "questions": [
                {"id": "q1", "type": "text", "question": "Hi", "answer": "", "required": false}
            ]}]
        }"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.theme, Theme::Default);
        assert_eq!(book.layout, Layout::Single);
        assert!(book.responses.is_empty());
        assert!(book.pages[0].media.is_empty());
        assert_eq!(book.question_count(), 1);
    }
}
