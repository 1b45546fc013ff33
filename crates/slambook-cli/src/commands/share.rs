//! Share command handlers

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use slambook_core::share::{decode_share_fragment, share_link};
use slambook_core::Store;

use crate::output::{Output, OutputFormat};

use super::find_book;

/// Print a book's share link, optionally drawing or saving its pattern
pub fn link(
    store: &Store,
    book_id: String,
    pattern: bool,
    svg: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let book = find_book(store, &book_id)?;
    let link = share_link(&book, &store.config().share_base_url)
        .context("Failed to build share link")?;

    let text = pattern.then(|| link.pattern().to_text());
    output.print_share(&book, &link, text.as_deref());

    if let Some(path) = svg {
        fs::write(&path, link.pattern().to_svg())
            .with_context(|| format!("Failed to write pattern to {:?}", path))?;
        if !output.is_json() {
            output.success(&format!("Saved pattern to {}", path.display()));
        }
    }

    Ok(())
}

/// Show which book a share link points at
pub fn decode(store: &Store, url: String, output: &Output) -> Result<()> {
    let payload = decode_share_fragment(&url)
        .ok_or_else(|| anyhow::anyhow!("Not a slambook share link: {}", url))?;
    let local = store.get_book(&payload.id)?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "payload": payload,
                    "found": local.is_some(),
                })
            );
        }
        OutputFormat::Quiet => println!("{}", payload.id),
        OutputFormat::Human => {
            println!("Book:  {}", payload.title);
            println!("ID:    {}", payload.id);
            match local {
                Some(book) => {
                    println!("Found locally ({} page(s))", book.pages.len());
                }
                None => println!("Not in this collection"),
            }
        }
    }

    Ok(())
}
