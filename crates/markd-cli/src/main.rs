//! Markd CLI
//!
//! Command-line interface for Markd - private bookmarks with live sync.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use markd_core::{Config, RestStore, Session};

mod commands;
mod metadata;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "markd")]
#[command(about = "Markd - private bookmarks with live sync")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved bookmarks
    #[command(alias = "ls")]
    List,
    /// Save a new bookmark
    Add {
        /// URL to save
        url: String,
        /// Title (fetched from the page when omitted)
        #[arg(short = 'T', long)]
        title: Option<String>,
    },
    /// Delete a bookmark
    #[command(alias = "rm")]
    Delete {
        /// Bookmark id
        id: String,
    },
    /// Follow the collection live as other sessions change it
    Watch,
    /// Show session status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (service_url, feed_url, api_key, owner)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need a session
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(&output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, &output)
            }
        };
    }

    let config = Config::load().context("Failed to load configuration")?;
    let session = open_session(&config).await?;

    match cli.command {
        Commands::List => commands::bookmark::list(&session, &output),
        Commands::Add { url, title } => {
            commands::bookmark::add(&session, url, title, &output).await
        }
        Commands::Delete { id } => commands::bookmark::delete(&session, id, &output).await,
        Commands::Watch => commands::watch::run(&session, &config, &output).await,
        Commands::Status => commands::status::show(&session, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Open a session against the configured storage service
async fn open_session(config: &Config) -> Result<Session<RestStore>> {
    let service_url = config.service_url.as_deref().context(
        "Storage service not configured. Set it with: markd config set service_url https://...",
    )?;
    let owner = config
        .owner
        .as_deref()
        .context("Owner not configured. Set it with: markd config set owner <id>")?;

    let mut store = RestStore::new(service_url)?;
    if let Some(key) = &config.api_key {
        store = store.with_api_key(key);
    }

    Session::connect(owner, store)
        .await
        .context("Failed to load bookmarks from storage service")
}
