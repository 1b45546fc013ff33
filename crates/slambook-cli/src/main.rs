//! Slambook CLI
//!
//! Command-line interface for slambook - create slam books, collect
//! responses and unlock achievements.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use slambook_core::{Config, Layout, MediaType, QuestionType, Store, Theme};

mod commands;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "slambook")]
#[command(about = "Slambook - digital slam books for friends")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage slam books
    Book {
        #[command(subcommand)]
        command: BookCommands,
    },
    /// Manage pages of a book
    Page {
        #[command(subcommand)]
        command: PageCommands,
    },
    /// Manage questions on a page
    Question {
        #[command(subcommand)]
        command: QuestionCommands,
    },
    /// Manage images and videos on a page
    Media {
        #[command(subcommand)]
        command: MediaCommands,
    },
    /// Fill in books and read responses
    Response {
        #[command(subcommand)]
        command: ResponseCommands,
    },
    /// Share links
    Share {
        #[command(subcommand)]
        command: ShareCommands,
    },
    /// Check and list achievements
    Achievements,
    /// Show statistics across all books
    Stats,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show storage status
    Status,
}

#[derive(Subcommand)]
enum BookCommands {
    /// Create a new book
    #[command(alias = "new")]
    Create {
        /// Book title
        title: String,
        /// Theme: default, colorful, elegant, dark
        #[arg(long, default_value = "default")]
        theme: Theme,
        /// Layout: single, two-columns, grid
        #[arg(long, default_value = "single")]
        layout: Layout,
    },
    /// List all books
    #[command(alias = "ls")]
    List,
    /// Show a book with its pages
    Show {
        /// Book ID (full or prefix)
        id: String,
    },
    /// Change title, theme or layout
    Edit {
        /// Book ID (full or prefix)
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        theme: Option<Theme>,
        #[arg(long)]
        layout: Option<Layout>,
    },
    /// Delete a book and all its responses
    #[command(alias = "rm")]
    Delete {
        /// Book ID (full or prefix)
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Export a book to a JSON file
    Export {
        /// Book ID (full or prefix)
        id: String,
        /// Directory to write into (current directory by default)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Import a book from an exported JSON file
    Import {
        /// Exported .json file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum PageCommands {
    /// Append an empty page
    Add {
        /// Book ID (full or prefix)
        book: String,
    },
    /// Delete a page and everything on it
    #[command(alias = "rm")]
    Delete {
        /// Book ID (full or prefix)
        book: String,
        /// Page ID, prefix or page number
        page: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum QuestionCommands {
    /// Add a question to a page
    Add {
        /// Book ID (full or prefix)
        book: String,
        /// Page ID, prefix or page number
        page: String,
        /// Question text
        text: String,
        /// Type: text, textarea, rating, choice
        #[arg(short = 't', long = "type", default_value = "text")]
        question_type: QuestionType,
        /// Answer required
        #[arg(short, long)]
        required: bool,
        /// Choice option (repeat for each)
        #[arg(short, long = "option")]
        options: Vec<String>,
    },
    /// Edit a question
    Edit {
        /// Book ID (full or prefix)
        book: String,
        /// Page ID, prefix or page number
        page: String,
        /// Question ID (full or prefix)
        question: String,
        /// New question text
        #[arg(long)]
        text: Option<String>,
        /// New type
        #[arg(short = 't', long = "type")]
        question_type: Option<QuestionType>,
        /// Whether an answer is required
        #[arg(long)]
        required: Option<bool>,
        /// Replacement choice options (repeat for each)
        #[arg(short, long = "option")]
        options: Vec<String>,
    },
    /// Delete a question
    #[command(alias = "rm")]
    Delete {
        /// Book ID (full or prefix)
        book: String,
        /// Page ID, prefix or page number
        page: String,
        /// Question ID (full or prefix)
        question: String,
    },
}

#[derive(Subcommand)]
enum MediaCommands {
    /// Attach an image or video file
    Add {
        /// Book ID (full or prefix)
        book: String,
        /// Page ID, prefix or page number
        page: String,
        /// Image (JPG, PNG, GIF, WebP) or video (MP4, WebM, OGG), up to 10 MB
        file: PathBuf,
        /// image or video (guessed from the extension if omitted)
        #[arg(short = 't', long = "type")]
        media_type: Option<MediaType>,
        #[arg(short, long)]
        caption: Option<String>,
    },
    /// Change a caption
    Caption {
        /// Book ID (full or prefix)
        book: String,
        /// Page ID, prefix or page number
        page: String,
        /// Media ID (full or prefix)
        media: String,
        caption: String,
    },
    /// Remove a media item
    #[command(alias = "rm")]
    Delete {
        /// Book ID (full or prefix)
        book: String,
        /// Page ID, prefix or page number
        page: String,
        /// Media ID (full or prefix)
        media: String,
    },
}

#[derive(Subcommand)]
enum ResponseCommands {
    /// Fill in a book
    Add {
        /// Book ID (full or prefix)
        book: String,
        /// Your name
        #[arg(short, long)]
        name: String,
        /// Answer as QUESTION_ID=VALUE (repeat for each)
        #[arg(short, long = "answer")]
        answers: Vec<String>,
    },
    /// List responses to a book
    #[command(alias = "ls")]
    List {
        /// Book ID (full or prefix)
        book: String,
    },
    /// Show a response
    Show {
        /// Book ID (full or prefix)
        book: String,
        /// Response ID (full or prefix)
        response: String,
    },
    /// Delete a response
    #[command(alias = "rm")]
    Delete {
        /// Book ID (full or prefix)
        book: String,
        /// Response ID (full or prefix)
        response: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ShareCommands {
    /// Print a book's share link
    Link {
        /// Book ID (full or prefix)
        book: String,
        /// Draw the share pattern in the terminal
        #[arg(long)]
        pattern: bool,
        /// Save the share pattern as an SVG file
        #[arg(long)]
        svg: Option<PathBuf>,
    },
    /// Show which book a share link points at
    Decode {
        /// Share URL or #book= fragment
        url: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, share_base_url, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

impl Commands {
    /// Whether the command can change stored data
    fn is_write(&self) -> bool {
        match self {
            Commands::Book { command } => !matches!(
                command,
                BookCommands::List | BookCommands::Show { .. } | BookCommands::Export { .. }
            ),
            Commands::Page { .. } | Commands::Question { .. } | Commands::Media { .. } => true,
            Commands::Response { command } => matches!(
                command,
                ResponseCommands::Add { .. } | ResponseCommands::Delete { .. }
            ),
            _ => false,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&config);

    let mut store = Store::open_with_config(config)?;
    let is_write = cli.command.is_write();

    let result = match cli.command {
        Commands::Book { command } => handle_book_command(command, &mut store, &output),
        Commands::Page { command } => handle_page_command(command, &mut store, &output),
        Commands::Question { command } => handle_question_command(command, &mut store, &output),
        Commands::Media { command } => handle_media_command(command, &mut store, &output),
        Commands::Response { command } => handle_response_command(command, &mut store, &output),
        Commands::Share { command } => handle_share_command(command, &store, &output),
        Commands::Achievements => commands::achievement::list(&mut store, &output),
        Commands::Stats => commands::achievement::stats(&store, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Status => commands::status::show(&store, &output),
    };

    // Every change may unlock something
    if is_write && result.is_ok() {
        commands::check_achievements(&mut store, &output);
    }

    if let Err(ref e) = result {
        if let Some(hint) = commands::recovery_hint(e) {
            eprintln!("Hint: {}", hint);
        }
    }

    result
}

fn handle_book_command(command: BookCommands, store: &mut Store, output: &Output) -> Result<()> {
    match command {
        BookCommands::Create {
            title,
            theme,
            layout,
        } => commands::book::create(store, title, theme, layout, output),
        BookCommands::List => commands::book::list(store, output),
        BookCommands::Show { id } => commands::book::show(store, id, output),
        BookCommands::Edit {
            id,
            title,
            theme,
            layout,
        } => commands::book::edit(store, id, title, theme, layout, output),
        BookCommands::Delete { id, yes } => commands::book::delete(store, id, yes, output),
        BookCommands::Export { id, out } => commands::book::export(store, id, out, output),
        BookCommands::Import { file } => commands::book::import(store, &file, output),
    }
}

fn handle_page_command(command: PageCommands, store: &mut Store, output: &Output) -> Result<()> {
    match command {
        PageCommands::Add { book } => commands::page::add(store, book, output),
        PageCommands::Delete { book, page, yes } => {
            commands::page::delete(store, book, page, yes, output)
        }
    }
}

fn handle_question_command(
    command: QuestionCommands,
    store: &mut Store,
    output: &Output,
) -> Result<()> {
    match command {
        QuestionCommands::Add {
            book,
            page,
            text,
            question_type,
            required,
            options,
        } => commands::question::add(
            store,
            book,
            page,
            text,
            question_type,
            required,
            options,
            output,
        ),
        QuestionCommands::Edit {
            book,
            page,
            question,
            text,
            question_type,
            required,
            options,
        } => commands::question::edit(
            store,
            book,
            page,
            question,
            text,
            question_type,
            required,
            options,
            output,
        ),
        QuestionCommands::Delete {
            book,
            page,
            question,
        } => commands::question::delete(store, book, page, question, output),
    }
}

fn handle_media_command(command: MediaCommands, store: &mut Store, output: &Output) -> Result<()> {
    match command {
        MediaCommands::Add {
            book,
            page,
            file,
            media_type,
            caption,
        } => commands::media::add(store, book, page, &file, media_type, caption, output),
        MediaCommands::Caption {
            book,
            page,
            media,
            caption,
        } => commands::media::caption(store, book, page, media, caption, output),
        MediaCommands::Delete { book, page, media } => {
            commands::media::delete(store, book, page, media, output)
        }
    }
}

fn handle_response_command(
    command: ResponseCommands,
    store: &mut Store,
    output: &Output,
) -> Result<()> {
    match command {
        ResponseCommands::Add {
            book,
            name,
            answers,
        } => commands::response::add(store, book, name, answers, output),
        ResponseCommands::List { book } => commands::response::list(store, book, output),
        ResponseCommands::Show { book, response } => {
            commands::response::show(store, book, response, output)
        }
        ResponseCommands::Delete {
            book,
            response,
            yes,
        } => commands::response::delete(store, book, response, yes, output),
    }
}

fn handle_share_command(command: ShareCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        ShareCommands::Link { book, pattern, svg } => {
            commands::share::link(store, book, pattern, svg, output)
        }
        ShareCommands::Decode { url } => commands::share::decode(store, url, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging when SLAMBOOK_LOG is set
///
/// Logs go to the configured log file, or stderr when none is set.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("SLAMBOOK_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "slambook_core={},slambook_cli={}",
        log_level, log_level
    ));

    match &config.log_file {
        Some(log_path) => {
            let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
                    return;
                }
            };
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(log_file)
                .try_init();
            info!("Logging to {:?}", log_path);
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
