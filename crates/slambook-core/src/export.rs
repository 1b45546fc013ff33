//! Export and import
//!
//! A book is exported as a single pretty-printed JSON object. Importing
//! accepts that shape back, checks the minimum structure, and gives the
//! book a fresh identity so it never collides with an existing one.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::id::new_id;
use crate::models::{checked_next_timestamp, Book};
use crate::storage::persistence::atomic_write;
use crate::storage::StorageError;

/// Suffix of exported file names
pub const EXPORT_SUFFIX: &str = "_slam_book.json";

/// Serialize a book for export
pub fn export_json(book: &Book) -> Result<String> {
    Ok(serde_json::to_string_pretty(book)?)
}

/// File name for an exported book
///
/// Every character outside `[A-Za-z0-9]` becomes `_`.
pub fn export_file_name(title: &str) -> String {
    let sanitized: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}{}", sanitized, EXPORT_SUFFIX)
}

/// Write an exported book into `dir`, returning the file path
pub fn write_export(book: &Book, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(export_file_name(&book.title));
    let json = export_json(book)?;
    atomic_write(&path, json.as_bytes())?;
    debug!("Exported book {} to {:?}", book.id, path);
    Ok(path)
}

/// Read an import file from disk
///
/// Only `.json` files are accepted.
pub fn read_import_file(path: &Path) -> Result<String> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        return Err(Error::UnsupportedFileType {
            found: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)")
                .to_string(),
            expected: "a JSON (.json) file".to_string(),
        });
    }

    fs::read_to_string(path).map_err(|e| StorageError::read_failure(e, path).into())
}

/// Parse exported JSON into a new book
///
/// The content must be an object with a non-empty `id`, a `title` and an
/// array of `pages`. The result gets a new ID and new timestamps.
pub fn parse_import(contents: &str) -> Result<Book> {
    let mut value: Value = serde_json::from_str(contents)
        .map_err(|e| Error::InvalidFormat(format!("Failed to parse JSON file: {}", e)))?;

    let has_id = value
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.is_empty());
    let has_title = value
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.is_empty());
    let has_pages = value.get("pages").is_some_and(Value::is_array);

    if !(has_id && has_title && has_pages) {
        return Err(Error::InvalidFormat(
            "Invalid book format: expected an object with id, title and pages".to_string(),
        ));
    }

    let previous = [
        value.get("createdAt").and_then(Value::as_i64),
        value.get("updatedAt").and_then(Value::as_i64),
    ]
    .into_iter()
    .flatten()
    .max()
    .and_then(DateTime::<Utc>::from_timestamp_millis)
    .unwrap_or_default();
    let stamp = checked_next_timestamp(previous)
        .ok_or_else(|| {
            Error::InvalidFormat("Invalid book format: timestamps are out of range".to_string())
        })?
        .timestamp_millis();

    if let Some(object) = value.as_object_mut() {
        object.insert("id".to_string(), Value::String(new_id()));
        object.insert("createdAt".to_string(), Value::from(stamp));
        object.insert("updatedAt".to_string(), Value::from(stamp));
    }

    let mut book: Book = serde_json::from_value(value)
        .map_err(|e| Error::InvalidFormat(format!("Invalid book format: {}", e)))?;
    book.renumber_pages();
    Ok(book)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Layout, NewQuestion, NewResponse, Question, QuestionType, Response, Theme};
    use tempfile::TempDir;

    fn sample_book() -> Book {
        let mut book = Book::new("Trip 2024", Theme::Colorful, Layout::TwoColumns);
        book.push_page();
        book.pages[0].questions.push(Question::new(
            NewQuestion::new("Best moment?")
                .with_type(QuestionType::Choice)
                .with_options(["Beach", "Hike"]),
        ));
        book.responses
            .push(Response::new(NewResponse::new("Ana").answer("x", "Beach")));
        book
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("Trip 2024"), "Trip_2024_slam_book.json");
        assert_eq!(export_file_name("a/b:c"), "a_b_c_slam_book.json");
        assert_eq!(export_file_name("Été"), "_t__slam_book.json");
    }

    #[test]
    fn test_export_is_pretty() {
        let json = export_json(&sample_book()).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"title\": \"Trip 2024\""));
    }

    #[test]
    fn test_round_trip_gets_new_identity() {
        let book = sample_book();
        let imported = parse_import(&export_json(&book).unwrap()).unwrap();

        assert_ne!(imported.id, book.id);
        assert_ne!(imported.created_at, book.created_at);
        assert_ne!(imported.updated_at, book.updated_at);

        let mut expected = book.clone();
        expected.id = imported.id.clone();
        expected.created_at = imported.created_at;
        expected.updated_at = imported.updated_at;
        assert_eq!(imported, expected);
    }

    #[test]
    fn test_missing_fields_rejected() {
        let err = parse_import(r#"{"title":"x"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));

        let err = parse_import(r#"{"id":"","title":"x","pages":[]}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));

        let err = parse_import(r#"{"id":"a","title":"x","pages":{}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));

        let err = parse_import("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = parse_import("not json at all").unwrap_err();
        match err {
            Error::InvalidFormat(msg) => assert!(msg.starts_with("Failed to parse JSON file")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_latest_timestamp_rejected() {
        let last_ms = DateTime::<Utc>::MAX_UTC.timestamp_millis();
        let contents = format!(
            r#"{{"id":"a","title":"x","pages":[],"createdAt":{0},"updatedAt":{0}}}"#,
            last_ms
        );
        let err = parse_import(&contents).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_minimal_import() {
        let book = parse_import(r#"{"id":"old","title":"Bare","pages":[]}"#).unwrap();
        assert_eq!(book.title, "Bare");
        assert!(book.pages.is_empty());
        assert_eq!(book.theme, Theme::Default);
        assert!(book.responses.is_empty());
    }

    #[test]
    fn test_write_and_read_file() {
        let temp_dir = TempDir::new().unwrap();
        let book = sample_book();

        let path = write_export(&book, temp_dir.path()).unwrap();
        assert!(path.ends_with("Trip_2024_slam_book.json"));

        let contents = read_import_file(&path).unwrap();
        let imported = parse_import(&contents).unwrap();
        assert_eq!(imported.title, book.title);
        assert_eq!(imported.pages.len(), 2);
    }

    #[test]
    fn test_non_json_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.txt");
        fs::write(&path, "{}").unwrap();

        let err = read_import_file(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileType { .. }));
    }
}
