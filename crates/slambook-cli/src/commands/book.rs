//! Book command handlers

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use slambook_core::export::{read_import_file, write_export};
use slambook_core::id::short;
use slambook_core::validation::validate_title;
use slambook_core::{BookPatch, Error, Layout, Store, Theme};

use crate::output::Output;
use crate::prompt::confirm;

use super::find_book;

/// Create a new book
pub fn create(
    store: &mut Store,
    title: String,
    theme: Theme,
    layout: Layout,
    output: &Output,
) -> Result<()> {
    validate_title(&title)?;
    let book = store
        .create_book(title.trim(), theme, layout)
        .context("Failed to create book")?;

    output.success(&format!("Created book: {}", book.id));
    output.print_book(&book);
    Ok(())
}

/// List all books
pub fn list(store: &Store, output: &Output) -> Result<()> {
    let books = store.get_all_books()?;
    output.print_books(&books);
    Ok(())
}

/// Show a single book
pub fn show(store: &Store, id: String, output: &Output) -> Result<()> {
    let book = find_book(store, &id)?;
    output.print_book(&book);
    Ok(())
}

/// Change a book's title, theme or layout
pub fn edit(
    store: &mut Store,
    id: String,
    title: Option<String>,
    theme: Option<Theme>,
    layout: Option<Layout>,
    output: &Output,
) -> Result<()> {
    if let Some(ref title) = title {
        validate_title(title)?;
    }
    let patch = BookPatch {
        title,
        theme,
        layout,
    };
    if patch.is_empty() {
        bail!("Nothing to change. Use --title, --theme or --layout.");
    }

    let book = find_book(store, &id)?;
    let updated = store
        .update_book(&book.id, patch)
        .context("Failed to update book")?
        .ok_or_else(|| Error::not_found("Book", &book.id))?;

    output.success("Book updated");
    output.print_book(&updated);
    Ok(())
}

/// Delete a book with all its pages and responses
pub fn delete(store: &mut Store, id: String, yes: bool, output: &Output) -> Result<()> {
    let book = find_book(store, &id)?;

    if output.should_prompt() && !yes {
        println!(
            "Delete book: {} - {} ({} response(s))",
            short(&book.id),
            book.title,
            book.responses.len()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .delete_book(&book.id)
        .context("Failed to delete book")?;

    output.success(&format!("Deleted book: {}", book.id));
    Ok(())
}

/// Write a book to a JSON file
pub fn export(store: &Store, id: String, out: Option<PathBuf>, output: &Output) -> Result<()> {
    let book = find_book(store, &id)?;
    let dir = out.unwrap_or_else(|| PathBuf::from("."));

    let path = write_export(&book, &dir)
        .with_context(|| format!("Failed to export book to {:?}", dir))?;

    if output.is_quiet() {
        println!("{}", path.display());
    } else {
        output.success(&format!("Exported \"{}\" to {}", book.title, path.display()));
    }
    Ok(())
}

/// Import a previously exported book as a new book
pub fn import(store: &mut Store, file: &Path, output: &Output) -> Result<()> {
    let contents = read_import_file(file)
        .with_context(|| format!("Failed to read {:?}", file))?;
    let book = store.import_book(&contents)?;

    output.success(&format!("Imported book: {}", book.id));
    output.print_book(&book);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use slambook_core::InMemoryBackend;

    #[test]
    fn test_create_rejects_blank_title() {
        let mut store = Store::with_backend(InMemoryBackend::new());
        let output = Output::new(OutputFormat::Quiet);

        for title in ["", "   "] {
            let err = create(
                &mut store,
                title.to_string(),
                Theme::Default,
                Layout::Single,
                &output,
            )
            .unwrap_err();
            assert!(matches!(
                err.downcast_ref::<Error>(),
                Some(Error::ValidationFailed { .. })
            ));
        }
        assert!(store.get_all_books().unwrap().is_empty());
    }

    #[test]
    fn test_create_trims_title() {
        let mut store = Store::with_backend(InMemoryBackend::new());
        let output = Output::new(OutputFormat::Quiet);

        create(&mut store, "  Trip 2024 ".to_string(), Theme::Dark, Layout::Grid, &output)
            .unwrap();
        let books = store.get_all_books().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Trip 2024");
    }
}
