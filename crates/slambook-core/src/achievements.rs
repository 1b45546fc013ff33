//! Achievements
//!
//! Aggregate statistics over every book, and a fixed catalogue of
//! threshold rules evaluated against them. Unlocked IDs are persisted and
//! never revoked.

use std::collections::HashSet;

use chrono::{Local, Timelike};
use serde::Serialize;

use crate::models::Book;

/// Usage statistics across all books
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_books: usize,
    pub total_questions: usize,
    pub total_pages: usize,
    pub total_media: usize,
    pub total_responses: usize,
    /// Number of distinct themes in use
    pub unique_themes: usize,
    /// Books created before 08:00 local time
    #[serde(rename = "createdBefore8AM")]
    pub created_before_8am: usize,
}

impl Stats {
    pub fn compute(books: &[Book]) -> Self {
        let mut stats = Stats {
            total_books: books.len(),
            ..Default::default()
        };
        let mut themes = HashSet::new();

        for book in books {
            themes.insert(book.theme);
            if book.created_at.with_timezone(&Local).hour() < 8 {
                stats.created_before_8am += 1;
            }
            stats.total_pages += book.pages.len();
            stats.total_questions += book.question_count();
            stats.total_media += book.media_count();
            stats.total_responses += book.responses.len();
        }

        stats.unique_themes = themes.len();
        stats
    }
}

/// A rule-gated unlock
#[derive(Debug, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    #[serde(skip)]
    condition: fn(&Stats) -> bool,
}

impl Achievement {
    /// Whether the rule holds for `stats`
    pub fn is_met(&self, stats: &Stats) -> bool {
        (self.condition)(stats)
    }
}

/// Every achievement, in evaluation order
pub static ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "first_book",
        name: "Getting Started",
        description: "Create your first slam book",
        icon: "📖",
        condition: |s| s.total_books >= 1,
    },
    Achievement {
        id: "book_collector",
        name: "Book Collector",
        description: "Create 5 slam books",
        icon: "📚",
        condition: |s| s.total_books >= 5,
    },
    Achievement {
        id: "prolific_creator",
        name: "Prolific Creator",
        description: "Create 10 slam books",
        icon: "⭐",
        condition: |s| s.total_books >= 10,
    },
    Achievement {
        id: "question_master",
        name: "Question Master",
        description: "Create 50 questions across all books",
        icon: "❓",
        condition: |s| s.total_questions >= 50,
    },
    Achievement {
        id: "social_butterfly",
        name: "Social Butterfly",
        description: "Get 10 responses to your books",
        icon: "🦋",
        condition: |s| s.total_responses >= 10,
    },
    Achievement {
        id: "popular_creator",
        name: "Popular Creator",
        description: "Get 25 responses to your books",
        icon: "🌟",
        condition: |s| s.total_responses >= 25,
    },
    Achievement {
        id: "media_maven",
        name: "Media Maven",
        description: "Add 20 media items to your books",
        icon: "📸",
        condition: |s| s.total_media >= 20,
    },
    Achievement {
        id: "page_turner",
        name: "Page Turner",
        description: "Create 20 pages across all books",
        icon: "📄",
        condition: |s| s.total_pages >= 20,
    },
    Achievement {
        id: "theme_explorer",
        name: "Theme Explorer",
        description: "Use all 4 themes",
        icon: "🎨",
        condition: |s| s.unique_themes >= 4,
    },
    Achievement {
        id: "early_bird",
        name: "Early Bird",
        description: "Create a book before 8 AM",
        icon: "🌅",
        condition: |s| s.created_before_8am > 0,
    },
];

/// Unlock every achievement whose rule now holds
///
/// Newly satisfied IDs are appended to `unlocked` in catalogue order and
/// returned. Already-unlocked achievements are skipped.
pub fn evaluate(stats: &Stats, unlocked: &mut Vec<String>) -> Vec<&'static Achievement> {
    let mut newly = Vec::new();
    for achievement in ACHIEVEMENTS {
        if !unlocked.iter().any(|id| id == achievement.id) && achievement.is_met(stats) {
            unlocked.push(achievement.id.to_string());
            newly.push(achievement);
        }
    }
    newly
}

/// Outcome of an achievement check
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementReport {
    pub unlocked: Vec<String>,
    pub newly_unlocked: Vec<&'static Achievement>,
    pub stats: Stats,
    pub total_unlocked: usize,
    pub total_achievements: usize,
}

/// One catalogue entry with its current state
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementProgress {
    #[serde(flatten)]
    pub achievement: &'static Achievement,
    pub unlocked: bool,
    /// Whether the rule holds right now
    pub met: bool,
}

/// State of every achievement
pub fn progress(stats: &Stats, unlocked: &[String]) -> Vec<AchievementProgress> {
    ACHIEVEMENTS
        .iter()
        .map(|achievement| AchievementProgress {
            achievement,
            unlocked: unlocked.iter().any(|id| id == achievement.id),
            met: achievement.is_met(stats),
        })
        .collect()
}
