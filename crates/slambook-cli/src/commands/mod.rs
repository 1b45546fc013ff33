//! Command handlers
//!
//! IDs on the command line may be given in full or as any unique prefix.
//! Pages can also be named by their 1-based position.

pub mod achievement;
pub mod book;
pub mod config;
pub mod media;
pub mod page;
pub mod question;
pub mod response;
pub mod share;
pub mod status;

use anyhow::{bail, Result};
use tracing::debug;

use slambook_core::{Book, Error, Media, Page, Question, Response, StorageError, Store};

use crate::output::Output;

/// Pick the one item whose ID equals or starts with `input`
fn resolve<'a, T>(
    kind: &'static str,
    input: &str,
    items: &'a [T],
    id_of: impl Fn(&T) -> &str,
    label_of: impl Fn(&T) -> String,
) -> Result<&'a T> {
    if let Some(exact) = items.iter().find(|item| id_of(item) == input) {
        return Ok(exact);
    }

    let matches: Vec<&T> = items
        .iter()
        .filter(|item| id_of(item).starts_with(input))
        .collect();

    match matches.len() {
        0 => Err(Error::not_found(kind, input).into()),
        1 => Ok(matches[0]),
        _ => {
            eprintln!("Multiple {} IDs match '{}':", kind.to_lowercase(), input);
            for item in &matches {
                eprintln!("  {} - {}", id_of(item), label_of(item));
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// Load a book by ID or prefix
pub fn find_book(store: &Store, id: &str) -> Result<Book> {
    let books = store.get_all_books()?;
    let book = resolve("Book", id, &books, |b| b.id.as_str(), |b| b.title.clone())?;
    Ok(book.clone())
}

/// Find a page by ID, prefix or 1-based page number
pub fn find_page<'a>(book: &'a Book, id: &str) -> Result<&'a Page> {
    if let Ok(number) = id.parse::<usize>() {
        if (1..=book.pages.len()).contains(&number) {
            debug!("Treating '{}' as page number", id);
            return Ok(&book.pages[number - 1]);
        }
    }
    resolve(
        "Page",
        id,
        &book.pages,
        |p| p.id.as_str(),
        |p| format!("page {}", p.order + 1),
    )
}

pub fn find_question<'a>(page: &'a Page, id: &str) -> Result<&'a Question> {
    resolve(
        "Question",
        id,
        &page.questions,
        |q| q.id.as_str(),
        |q| q.question.clone(),
    )
}

pub fn find_media<'a>(page: &'a Page, id: &str) -> Result<&'a Media> {
    resolve(
        "Media",
        id,
        &page.media,
        |m| m.id.as_str(),
        |m| format!("{} {}", m.media_type, m.caption),
    )
}

pub fn find_response<'a>(book: &'a Book, id: &str) -> Result<&'a Response> {
    resolve(
        "Response",
        id,
        &book.responses,
        |r| r.id.as_str(),
        |r| r.responder_name.clone(),
    )
}

/// A hint for fixing a failed command, when storage was the cause
pub fn recovery_hint(error: &anyhow::Error) -> Option<&'static str> {
    error.chain().find_map(|cause| {
        if let Some(storage) = cause.downcast_ref::<StorageError>() {
            return storage.recovery_suggestion();
        }
        match cause.downcast_ref::<Error>() {
            Some(Error::Storage(storage)) => storage.recovery_suggestion(),
            _ => None,
        }
    })
}

/// Run the achievement check after a change and announce new unlocks
///
/// A failure here never fails the command that triggered it.
pub fn check_achievements(store: &mut Store, output: &Output) {
    match store.check_achievements() {
        Ok(report) => output.announce_unlocks(&report),
        Err(e) => {
            if !output.is_quiet() {
                eprintln!("⚠ Could not check achievements: {:#}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slambook_core::{Layout, Theme};

    #[derive(Debug)]
    struct Item {
        id: &'static str,
    }

    fn items() -> Vec<Item> {
        vec![
            Item { id: "abc123" },
            Item { id: "abd456" },
            Item { id: "abc" },
        ]
    }

    fn pick<'a>(items: &'a [Item], input: &str) -> Result<&'a Item> {
        resolve("item", input, items, |i| i.id, |i| i.id.to_string())
    }

    #[test]
    fn test_resolve_exact_beats_prefix() {
        let items = items();
        assert_eq!(pick(&items, "abc").unwrap().id, "abc");
    }

    #[test]
    fn test_resolve_unique_prefix() {
        let items = items();
        assert_eq!(pick(&items, "abd").unwrap().id, "abd456");
        assert_eq!(pick(&items, "abc1").unwrap().id, "abc123");
    }

    #[test]
    fn test_resolve_ambiguous_and_missing() {
        let items = items();
        assert!(pick(&items, "ab").is_err());
        assert!(pick(&items, "zzz").is_err());
    }

    #[test]
    fn test_missing_id_is_not_found() {
        let items = items();
        let err = pick(&items, "zzz").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NotFound { kind: "item", .. })
        ));
    }

    #[test]
    fn test_recovery_hint() {
        let full = StorageError::write_failure(
            std::io::Error::new(std::io::ErrorKind::Other, "No space left on device"),
            "/data/slam_books.json",
        );
        let err = anyhow::Error::new(full).context("Failed to save books");
        assert!(recovery_hint(&err).is_some());

        let wrapped = anyhow::Error::new(Error::Storage(StorageError::write_failure(
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            "/data",
        )));
        assert!(recovery_hint(&wrapped).is_some());

        let err = anyhow::anyhow!("Nothing to change");
        assert!(recovery_hint(&err).is_none());
    }

    #[test]
    fn test_find_page_by_number() {
        let mut book = Book::new("Pages", Theme::Default, Layout::Single);
        book.push_page();
        let second = book.pages[1].id.clone();

        assert_eq!(find_page(&book, "2").unwrap().id, second);
        assert_eq!(find_page(&book, &second[..8]).unwrap().id, second);
        assert!(find_page(&book, "zz").is_err());
    }
}
