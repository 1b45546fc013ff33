//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use slambook_core::achievements::{AchievementProgress, AchievementReport, Stats};
use slambook_core::id::short;
use slambook_core::share::ShareLink;
use slambook_core::{Book, Media, Page, Question, QuestionType, Response};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is JSON
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print any serializable value as pretty JSON
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize output: {}", e),
        }
    }

    /// Print a single book with its pages
    pub fn print_book(&self, book: &Book) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:        {}", book.id);
                println!("Title:     {}", book.title);
                println!("Theme:     {}", book.theme.name());
                println!("Layout:    {}", book.layout.name());
                println!("Created:   {}", local_time(book.created_at));
                println!("Updated:   {}", local_time(book.updated_at));
                println!("Responses: {}", book.responses.len());

                for page in &book.pages {
                    println!();
                    self.print_page_body(page);
                }
            }
            OutputFormat::Json => self.print_json(book),
            OutputFormat::Quiet => println!("{}", book.id),
        }
    }

    /// Print a list of books
    pub fn print_books(&self, books: &[Book]) {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("No slam books yet.");
                    return;
                }
                for book in books {
                    println!(
                        "{} | {} | {} page(s), {} question(s) | {} response(s)",
                        short(&book.id),
                        truncate(&book.title, 35),
                        book.pages.len(),
                        book.question_count(),
                        book.responses.len()
                    );
                }
                println!("\n{} book(s)", books.len());
            }
            OutputFormat::Json => self.print_json(books),
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id);
                }
            }
        }
    }

    /// Print a single page
    pub fn print_page(&self, page: &Page) {
        match self.format {
            OutputFormat::Human => self.print_page_body(page),
            OutputFormat::Json => self.print_json(page),
            OutputFormat::Quiet => println!("{}", page.id),
        }
    }

    fn print_page_body(&self, page: &Page) {
        println!("── Page {} ({}) ──", page.order + 1, short(&page.id));
        if page.questions.is_empty() && page.media.is_empty() {
            println!("  (empty)");
        }
        for question in &page.questions {
            println!("  {}", question_line(question));
        }
        for media in &page.media {
            println!("  {}", media_line(media));
        }
    }

    /// Print a single question
    pub fn print_question(&self, question: &Question) {
        match self.format {
            OutputFormat::Human => println!("{}", question_line(question)),
            OutputFormat::Json => self.print_json(question),
            OutputFormat::Quiet => println!("{}", question.id),
        }
    }

    /// Print a single media item (the data itself is left out)
    pub fn print_media(&self, media: &Media) {
        match self.format {
            OutputFormat::Human => println!("{}", media_line(media)),
            OutputFormat::Json => self.print_json(media),
            OutputFormat::Quiet => println!("{}", media.id),
        }
    }

    /// Print the responses to a book
    pub fn print_responses(&self, book: &Book, responses: &[Response]) {
        match self.format {
            OutputFormat::Human => {
                println!("Responses to: {} - {}", short(&book.id), book.title);
                println!();

                if responses.is_empty() {
                    println!("No responses yet.");
                    return;
                }

                for response in responses {
                    println!(
                        "{} | {} | {} | {} answer(s)",
                        short(&response.id),
                        truncate(&response.responder_name, 25),
                        local_time(response.created_at),
                        response.answers.len()
                    );
                }
                println!("\n{} response(s)", responses.len());
            }
            OutputFormat::Json => self.print_json(responses),
            OutputFormat::Quiet => {
                for response in responses {
                    println!("{}", response.id);
                }
            }
        }
    }

    /// Print one response with its answers next to their questions
    pub fn print_response(&self, book: &Book, response: &Response) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:        {}", response.id);
                println!("From:      {}", response.responder_name);
                println!(
                    "Submitted: {}",
                    local_time(response.created_at)
                );
                println!();

                for question in book.questions() {
                    let answer = response.answer(&question.id).unwrap_or("");
                    println!("Q: {}", question.question);
                    println!("A: {}", if answer.is_empty() { "(no answer)" } else { answer });
                    println!();
                }

                // Answers to questions that have since been deleted
                let orphaned = response
                    .answers
                    .iter()
                    .filter(|(id, _)| book.find_question(id).is_none())
                    .count();
                if orphaned > 0 {
                    println!("({} answer(s) to removed questions)", orphaned);
                }
            }
            OutputFormat::Json => self.print_json(response),
            OutputFormat::Quiet => println!("{}", response.id),
        }
    }

    /// Print aggregate statistics
    pub fn print_stats(&self, stats: &Stats) {
        match self.format {
            OutputFormat::Human => {
                for (label, value) in stat_rows(stats) {
                    println!("{:<12} {}", format!("{}:", label), value);
                }
            }
            OutputFormat::Json => self.print_json(stats),
            OutputFormat::Quiet => println!("{}", stats.total_books),
        }
    }

    /// Announce achievements unlocked by the last change
    pub fn announce_unlocks(&self, report: &AchievementReport) {
        if report.newly_unlocked.is_empty() {
            return;
        }
        match self.format {
            OutputFormat::Human => {
                for achievement in &report.newly_unlocked {
                    println!(
                        "🏆 Achievement unlocked: {} {} - {}",
                        achievement.icon, achievement.name, achievement.description
                    );
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({ "newlyUnlocked": report.newly_unlocked })
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print every achievement and whether it is unlocked
    pub fn print_achievements(&self, report: &AchievementReport, progress: &[AchievementProgress]) {
        match self.format {
            OutputFormat::Human => {
                for entry in progress {
                    let mark = if entry.unlocked { "✓" } else { " " };
                    let achievement = entry.achievement;
                    println!(
                        "[{}] {} {:<18} {}",
                        mark, achievement.icon, achievement.name, achievement.description
                    );
                }
                println!(
                    "\n{} of {} unlocked",
                    report.total_unlocked, report.total_achievements
                );
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "achievements": progress,
                        "newlyUnlocked": report.newly_unlocked,
                        "totalUnlocked": report.total_unlocked,
                        "totalAchievements": report.total_achievements,
                    })
                );
            }
            OutputFormat::Quiet => {
                for id in &report.unlocked {
                    println!("{}", id);
                }
            }
        }
    }

    /// Print a share link, optionally with its pattern drawn underneath
    pub fn print_share(&self, book: &Book, link: &ShareLink, pattern: Option<&str>) {
        match self.format {
            OutputFormat::Human => {
                println!("Share \"{}\":", book.title);
                println!("{}", link.url);
                if let Some(pattern) = pattern {
                    println!();
                    print!("{}", pattern);
                }
            }
            OutputFormat::Json => self.print_json(link),
            OutputFormat::Quiet => println!("{}", link.url),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn question_line(question: &Question) -> String {
    let mut line = format!(
        "{} [{}] {}",
        short(&question.id),
        question.question_type.label(),
        truncate_line(&question.question, 60)
    );
    if question.required {
        line.push_str(" *");
    }
    if question.question_type == QuestionType::Choice {
        line.push_str(&format!(" ({})", question.options().join(" / ")));
    }
    line
}

fn media_line(media: &Media) -> String {
    let caption = if media.caption.is_empty() {
        "(no caption)".to_string()
    } else {
        truncate_line(&media.caption, 50)
    };
    format!(
        "{} [{}] {} ({})",
        short(&media.id),
        media.media_type,
        caption,
        human_size(media.url.len())
    )
}

/// Truncate a string to max length in characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}

fn human_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

fn stat_rows(stats: &Stats) -> [(&'static str, usize); 7] {
    [
        ("Books", stats.total_books),
        ("Pages", stats.total_pages),
        ("Questions", stats.total_questions),
        ("Media", stats.total_media),
        ("Responses", stats.total_responses),
        ("Themes", stats.unique_themes),
        ("Before 8 AM", stats.created_before_8am),
    ]
}

/// Timestamp in the local time zone, to the minute
fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use slambook_core::{MediaType, NewMedia, NewQuestion};

    #[test]
    fn test_stat_rows_cover_every_stat() {
        let stats = Stats {
            total_books: 2,
            created_before_8am: 1,
            ..Stats::default()
        };
        let rows = stat_rows(&stats);
        assert_eq!(rows[0], ("Books", 2));
        assert_eq!(rows[6], ("Before 8 AM", 1));
    }

    #[test]
    fn test_local_time() {
        let at = Utc::now();
        assert_eq!(
            local_time(at),
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
        );
        assert_eq!(local_time(at).len(), "2024-01-01 08:00".len());
    }

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        // Multi-byte characters are never split
        assert_eq!(truncate("ééééééééééé", 5), "éé...");
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("single line", 20), "single line");
        assert_eq!(truncate_line("line one\nline two", 20), "line one");
        assert_eq!(
            truncate_line("very long single line here", 10),
            "very lo..."
        );
    }

    #[test]
    fn test_question_line() {
        let question = Question::new(
            NewQuestion::new("Pick one")
                .with_type(QuestionType::Choice)
                .with_options(["A", "B"])
                .required(true),
        );
        let line = question_line(&question);
        assert!(line.starts_with(short(&question.id)));
        assert!(line.contains("Pick one *"));
        assert!(line.ends_with("(A / B)"));
    }

    #[test]
    fn test_media_line() {
        let media = Media::new(NewMedia {
            media_type: MediaType::Video,
            url: "data:video/mp4;base64,AAAA".to_string(),
            caption: None,
        });
        let line = media_line(&media);
        assert!(line.contains("[video] (no caption)"));
        assert!(line.ends_with("B)"));
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(10), "10 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }
}
