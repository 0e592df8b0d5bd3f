mod commands;

use brewkit::{cache, cellar};
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::DepsFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "brewkit")]
#[command(author, version, about = "Homebrew dependency expansion and version ordering", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Formula index (Homebrew API formula.json)
    #[arg(long, global = true, env = "BREWKIT_INDEX")]
    index: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct FilterArgs {
    /// Include build-time dependencies
    #[arg(long)]
    include_build: bool,

    /// Include optional dependencies
    #[arg(long)]
    include_optional: bool,

    /// Include test dependencies
    #[arg(long)]
    include_test: bool,

    /// Skip recommended dependencies
    #[arg(long)]
    skip_recommended: bool,
}

impl From<FilterArgs> for DepsFilter {
    fn from(args: FilterArgs) -> Self {
        DepsFilter {
            include_build: args.include_build,
            include_optional: args.include_optional,
            include_test: args.include_test,
            skip_recommended: args.skip_recommended,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show dependencies for a formula, dependencies first
    Deps {
        /// Formula name
        formula: String,

        #[command(flatten)]
        filter: FilterArgs,

        /// Show as tree
        #[arg(long)]
        tree: bool,
    },

    /// Show formulae that depend on a formula
    Uses {
        /// Formula name
        formula: String,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Compare two version strings
    Compare {
        left: String,
        right: String,
    },

    /// Detect the version in a download URL
    Detect {
        url: String,

        /// Git tag the URL is checked out at
        #[arg(long)]
        tag: Option<String>,
    },

    /// Show installed formulae that have a newer version
    Outdated {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new(default_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let index_path = cache::index_path(cli.index.as_deref());

    match cli.command {
        Some(Commands::Deps {
            formula,
            filter,
            tree,
        }) => {
            let index = commands::utils::load_index(&index_path)?;
            commands::deps(&index, &formula, filter.into(), tree)?;
        }
        Some(Commands::Uses { formula, filter }) => {
            let index = commands::utils::load_index(&index_path)?;
            commands::uses(&index, &formula, filter.into())?;
        }
        Some(Commands::Compare { left, right }) => {
            commands::compare(&left, &right)?;
        }
        Some(Commands::Detect { url, tag }) => {
            commands::detect(&url, tag.as_deref())?;
        }
        Some(Commands::Outdated { json }) => {
            let index = commands::utils::load_index(&index_path)?;
            commands::outdated(&index, &cellar::cellar_path(), json)?;
        }
        None => {
            println!(
                "{} Homebrew dependency expansion and version ordering",
                "brewkit".bold()
            );
            println!("\nRun {} to see available commands.", "brewkit --help".cyan());
        }
    }

    Ok(())
}
