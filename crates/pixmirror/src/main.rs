//! Pixmirror CLI - mirror a website's images into a local tree.
//!
//! Pixmirror discovers the images a site's pages reference (sitemap,
//! page scraping, open upload listings), downloads them into an
//! `images/` tree that preserves upload-directory structure, optionally
//! re-encodes them for web delivery, and writes a URL-to-path mapping
//! for content rewriting.
//!
//! # Usage
//!
//! ```bash
//! # Mirror a site into ./static
//! pixmirror mirror https://site.example ./static
//!
//! # Keep original bytes, no re-encoding
//! pixmirror mirror https://site.example ./static --no-optimize
//!
//! # View configuration
//! pixmirror config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Pixmirror - mirror a website's images into a local tree.
#[derive(Parser, Debug)]
#[command(name = "pixmirror")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Discover, download, and re-encode a site's images
    Mirror(cli::mirror::MirrorArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI flag overrides.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match pixmirror_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `pixmirror config path`."
            );
            pixmirror_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("pixmirror v{}", pixmirror_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Mirror(args) => cli::mirror::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
