//! CLI entry point for notes-rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "notes-rs")]
#[command(version)]
#[command(about = "A small static site generator for a tree of Markdown notes", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every indexed note
    #[command(alias = "ls")]
    List {
        /// Print the full records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the navigation tree
    Tree {
        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render one note to HTML on stdout
    Render {
        /// Slug of the note, e.g. `javascript/closures`
        slug: String,
    },

    /// Report slug collisions and rendering warnings
    Check,

    /// Write every route to the public directory
    #[command(alias = "g")]
    Build,

    /// Remove the public directory
    Clean,

    /// Serve notes, rendering each request from the content root
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "notes_rs=debug,info"
    } else {
        "notes_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    match cli.command {
        Commands::List { json } => {
            let notes = notes_rs::Notes::new(&base_dir)?;
            notes_rs::commands::list::run(&notes, json)?;
        }

        Commands::Tree { json } => {
            let notes = notes_rs::Notes::new(&base_dir)?;
            notes_rs::commands::tree::run(&notes, json)?;
        }

        Commands::Render { slug } => {
            let notes = notes_rs::Notes::new(&base_dir)?;
            notes_rs::commands::render::run(&notes, &slug)?;
        }

        Commands::Check => {
            let notes = notes_rs::Notes::new(&base_dir)?;
            notes_rs::commands::check::run(&notes)?;
        }

        Commands::Build => {
            let notes = notes_rs::Notes::new(&base_dir)?;
            tracing::info!("Generating static files...");
            notes.build()?;
            println!("Generated successfully!");
        }

        Commands::Clean => {
            let notes = notes_rs::Notes::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            notes.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Serve { port, ip } => {
            let notes = notes_rs::Notes::new(&base_dir)?;
            tracing::info!("Serving notes from {:?}", notes.content_dir);
            notes_rs::server::start(&notes, &ip, port).await?;
        }

        Commands::Version => {
            println!("notes-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
