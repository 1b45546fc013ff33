//! Media command handlers

use std::path::Path;

use anyhow::{Context, Result};

use slambook_core::media::load_media_file;
use slambook_core::{Error, MediaPatch, MediaType, Store};

use crate::output::Output;

use super::{find_book, find_media, find_page};

/// Attach an image or video file to a page
pub fn add(
    store: &mut Store,
    book_id: String,
    page_id: String,
    file: &Path,
    media_type: Option<MediaType>,
    caption: Option<String>,
    output: &Output,
) -> Result<()> {
    let media_type = match media_type.or_else(|| MediaType::infer(file)) {
        Some(media_type) => media_type,
        None => anyhow::bail!(
            "Cannot tell whether {:?} is an image or a video. Pass --type.",
            file
        ),
    };

    let book = find_book(store, &book_id)?;
    let page = find_page(&book, &page_id)?;

    let input = load_media_file(file, media_type, caption)
        .with_context(|| format!("Failed to load {:?}", file))?;
    let media = store
        .add_media(&book.id, &page.id, input)
        .context("Failed to add media")?
        .ok_or_else(|| Error::not_found("Page", &page.id))?;

    output.success(&format!("Added {}: {}", media.media_type, media.id));
    output.print_media(&media);
    Ok(())
}

/// Replace a media item's caption
pub fn caption(
    store: &mut Store,
    book_id: String,
    page_id: String,
    media_id: String,
    caption: String,
    output: &Output,
) -> Result<()> {
    let book = find_book(store, &book_id)?;
    let page = find_page(&book, &page_id)?;
    let media = find_media(page, &media_id)?;

    let updated = store
        .update_media(
            &book.id,
            &page.id,
            &media.id,
            MediaPatch {
                caption: Some(caption),
            },
        )
        .context("Failed to update media")?
        .ok_or_else(|| Error::not_found("Media", &media.id))?;

    output.success("Caption updated");
    output.print_media(&updated);
    Ok(())
}

/// Remove a media item from a page
pub fn delete(
    store: &mut Store,
    book_id: String,
    page_id: String,
    media_id: String,
    output: &Output,
) -> Result<()> {
    let book = find_book(store, &book_id)?;
    let page = find_page(&book, &page_id)?;
    let media = find_media(page, &media_id)?;

    let page = store
        .delete_media(&book.id, &page.id, &media.id)
        .context("Failed to delete media")?
        .ok_or_else(|| Error::not_found("Media", &media.id))?;

    output.success(&format!(
        "Deleted media, {} item(s) left on page {}",
        page.media.len(),
        page.order + 1
    ));
    Ok(())
}
