//! shelf CLI
//!
//! Command-line and terminal interface for shelf - book inventory management.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use shelf_core::{Config, DraftOverrides, Genre, HttpBookStore, InventoryController, Status};

mod commands;
mod output;
mod tui;

use commands::book::ListQuery;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "shelf - Book inventory backed by a REST collection")]
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
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// List books
    #[command(alias = "ls")]
    List {
        /// Case-insensitive match on title or author
        #[arg(short, long)]
        search: Option<String>,
        /// Only this genre (Fiction, Non-fiction, Fantasy, Sci-fi)
        #[arg(short, long)]
        genre: Option<Genre>,
        /// Only this status (Available, Issued)
        #[arg(long)]
        status: Option<Status>,
        /// Page to show
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Add a new book
    #[command(alias = "create")]
    Add {
        #[command(flatten)]
        fields: BookArgs,
    },
    /// Edit a book (only the given fields change)
    Edit {
        /// Book ID
        id: String,
        #[command(flatten)]
        fields: BookArgs,
    },
    /// Delete a book
    #[command(alias = "rm")]
    Delete {
        /// Book ID
        id: String,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

/// Book fields accepted by `add` and `edit`
#[derive(Args)]
struct BookArgs {
    #[arg(short, long)]
    title: Option<String>,
    #[arg(short, long)]
    author: Option<String>,
    /// Fiction, Non-fiction, Fantasy or Sci-fi
    #[arg(short, long)]
    genre: Option<Genre>,
    /// Publication year
    #[arg(short, long)]
    year: Option<String>,
    /// Available or Issued
    #[arg(short, long)]
    status: Option<Status>,
}

impl From<BookArgs> for DraftOverrides {
    fn from(args: BookArgs) -> Self {
        DraftOverrides {
            title: args.title,
            author: args.author,
            genre: args.genre,
            year: args.year,
            status: args.status,
        }
    }
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (base_url, data_dir, log_file, request_timeout_secs)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Commands that don't need the store
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    // Handle TUI (default when no command given)
    if matches!(&cli.command, Some(Commands::Tui) | None) {
        return tui::run(config).await;
    }

    init_cli_logging();

    let store = HttpBookStore::from_config(&config).context("Failed to create HTTP client")?;
    let mut inventory = InventoryController::new(store);

    let Some(command) = cli.command else {
        return Ok(());
    };

    match command {
        Commands::Tui => unreachable!(),           // Handled above
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::List {
            search,
            genre,
            status,
            page,
        } => {
            let query = ListQuery {
                search,
                genre,
                status,
                page,
            };
            commands::book::list(&mut inventory, query, &output).await
        }
        Commands::Add { fields } => {
            commands::book::add(&mut inventory, fields.into(), &output).await
        }
        Commands::Edit { id, fields } => {
            commands::book::edit(&mut inventory, id, fields.into(), &output).await
        }
        Commands::Delete { id } => commands::book::delete(&mut inventory, id, &output).await,
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

/// Log to stderr for one-shot commands, only when SHELF_LOG is set
fn init_cli_logging() {
    let Ok(level) = std::env::var("SHELF_LOG") else {
        return;
    };

    let filter = tracing_subscriber::EnvFilter::new(format!(
        "shelf_core={},shelf_cli={}",
        level, level
    ));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
