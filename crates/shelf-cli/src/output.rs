//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use shelf_core::{Book, ValidationErrors};

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

/// One page of a listing, as printed by `shelf list`
pub struct PageView<'a> {
    pub books: &'a [&'a Book],
    pub page: usize,
    pub page_count: usize,
    /// Books matching the filters across all pages
    pub total: usize,
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

    /// Print a single book
    pub fn print_book(&self, book: &Book) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:     {}", book.id);
                println!("Title:  {}", book.title());
                println!("Author: {}", book.author());
                println!("Genre:  {}", book.genre());
                println!("Year:   {}", book.year());
                println!("Status: {}", book.status());
            }
            OutputFormat::Json => {
                println!("{}", to_json(book));
            }
            OutputFormat::Quiet => {
                println!("{}", book.id);
            }
        }
    }

    /// Print one page of books with a pager footer
    pub fn print_page(&self, view: &PageView<'_>) {
        match self.format {
            OutputFormat::Human => {
                if view.books.is_empty() {
                    println!("No books found.");
                    return;
                }
                for book in view.books {
                    println!(
                        "{} | {} | {} | {} | {} | {}",
                        short_id(&book.id),
                        pad(&truncate(book.title(), 30), 30),
                        pad(&truncate(book.author(), 20), 20),
                        pad(book.genre().as_str(), 11),
                        book.year(),
                        book.status()
                    );
                }
                println!(
                    "\nPage {} of {} ({} book(s))",
                    view.page, view.page_count, view.total
                );
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "page": view.page,
                    "page_count": view.page_count,
                    "total": view.total,
                    "books": view.books,
                });
                println!("{}", to_json(&json));
            }
            OutputFormat::Quiet => {
                for book in view.books {
                    println!("{}", book.id);
                }
            }
        }
    }

    /// Print field errors from a rejected draft
    pub fn print_validation_errors(&self, errors: &ValidationErrors) {
        match self.format {
            OutputFormat::Json => {
                let fields: serde_json::Map<String, serde_json::Value> = errors
                    .iter()
                    .map(|(field, error)| (field.label().to_string(), error.message().into()))
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({"status": "invalid", "errors": fields})
                );
            }
            OutputFormat::Human | OutputFormat::Quiet => {
                for (field, error) in errors.iter() {
                    eprintln!("  {}: {}", field.label(), error.message());
                }
            }
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
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

/// First 8 characters of an id
fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn pad(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}
