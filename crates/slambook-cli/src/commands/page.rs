//! Page command handlers

use anyhow::{Context, Result};

use slambook_core::{Error, Store};

use crate::output::Output;
use crate::prompt::confirm;

use super::{find_book, find_page};

/// Append an empty page to a book
pub fn add(store: &mut Store, book_id: String, output: &Output) -> Result<()> {
    let book = find_book(store, &book_id)?;
    let page = store
        .add_page(&book.id)
        .context("Failed to add page")?
        .ok_or_else(|| Error::not_found("Book", &book.id))?;

    output.success(&format!("Added page {} to \"{}\"", page.order + 1, book.title));
    output.print_page(&page);
    Ok(())
}

/// Delete a page with its questions and media
pub fn delete(
    store: &mut Store,
    book_id: String,
    page_id: String,
    yes: bool,
    output: &Output,
) -> Result<()> {
    let book = find_book(store, &book_id)?;
    let page = find_page(&book, &page_id)?;

    let has_content = !page.questions.is_empty() || !page.media.is_empty();
    if output.should_prompt() && has_content && !yes {
        println!(
            "Delete page {} ({} question(s), {} media item(s))",
            page.order + 1,
            page.questions.len(),
            page.media.len()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let updated = store
        .delete_page(&book.id, &page.id)
        .context("Failed to delete page")?
        .ok_or_else(|| Error::not_found("Page", &page.id))?;

    output.success(&format!(
        "Deleted page, {} page(s) left",
        updated.pages.len()
    ));
    Ok(())
}
