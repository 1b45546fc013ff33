//! Status command handler

use anyhow::Result;

use slambook_core::achievements::ACHIEVEMENTS;
use slambook_core::{JsonFileBackend, Store};

use crate::output::{Output, OutputFormat};

/// Show where data lives and how much there is
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let config = store.config();
    let storage = JsonFileBackend::new(config).stats();
    let stats = store.stats()?;
    let unlocked = store
        .achievement_progress()?
        .iter()
        .filter(|p| p.unlocked)
        .count();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "share_base_url": config.share_base_url,
                    "storage": {
                        "books_exists": storage.books_exists,
                        "books_size": storage.books_size,
                        "achievements_size": storage.achievements_size,
                        "total_size": storage.total_size()
                    },
                    "counts": stats,
                    "achievements": {
                        "unlocked": unlocked,
                        "total": ACHIEVEMENTS.len()
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.storage_description());
        }
        OutputFormat::Human => {
            println!("Slambook Status");
            println!("===============");
            println!();
            println!("Storage:");
            println!("  Location: {}", store.storage_description());
            println!("  Size:     {}", storage.total_size_human());
            println!();
            println!("Sharing:");
            println!("  Base URL: {}", config.share_base_url);
            println!();
            println!("Contents:");
            println!("  Books:     {}", stats.total_books);
            println!("  Pages:     {}", stats.total_pages);
            println!("  Questions: {}", stats.total_questions);
            println!("  Responses: {}", stats.total_responses);
            println!();
            println!("Achievements: {} of {}", unlocked, ACHIEVEMENTS.len());
        }
    }

    Ok(())
}
