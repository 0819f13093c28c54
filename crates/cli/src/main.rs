//! ALL IN catalog CLI - store seeding and inspection tools.
//!
//! # Usage
//!
//! ```bash
//! # Push the built-in fallback catalogs into the live store
//! catalog-cli seed
//!
//! # Seed one collection, showing what would be written
//! catalog-cli seed --collection products --dry-run
//!
//! # Print the store's current contents
//! catalog-cli list
//! ```
//!
//! # Commands
//!
//! - `seed` - Push the built-in catalogs into the live store
//! - `list` - Print the store's current contents
//!
//! Both commands read the same environment configuration as the site
//! binary. `seed` refuses to run without live store credentials: the demo
//! store is in-memory and re-seeds itself on every startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

use allin_core::Collection;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(author, version, about = "ALL IN catalog tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Push the built-in fallback catalogs into the live store
    Seed {
        /// Which collection(s) to push
        #[arg(long, value_enum, default_value = "all")]
        collection: CollectionArg,

        /// Log what would be written without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the store's current contents
    List,
}

#[derive(Clone, Copy, ValueEnum)]
enum CollectionArg {
    Products,
    Services,
    All,
}

impl CollectionArg {
    fn collections(self) -> Vec<Collection> {
        match self {
            Self::Products => vec![Collection::Products],
            Self::Services => vec![Collection::Services],
            Self::All => vec![Collection::Products, Collection::Services],
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed {
            collection,
            dry_run,
        } => {
            commands::seed::run(&collection.collections(), dry_run).await?;
        }
        Commands::List => commands::list::run().await?,
    }
    Ok(())
}
