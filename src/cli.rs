use clap::{Parser, Subcommand, ValueEnum};
use refreshsparse_common::ItemKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "refreshsparse")]
#[command(
    author,
    version,
    about = "Refresh series, seasons and episodes with sparse metadata"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which refresh tasks to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskSelector {
    Episodes,
    Seasons,
    Series,
    All,
}

impl TaskSelector {
    pub fn kinds(self) -> Vec<ItemKind> {
        match self {
            Self::Episodes => vec![ItemKind::Episode],
            Self::Seasons => vec![ItemKind::Season],
            Self::Series => vec![ItemKind::Series],
            Self::All => ItemKind::ALL.to_vec(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh sparse items once
    Run {
        /// Item kinds to refresh
        #[arg(value_enum)]
        task: TaskSelector,

        /// Log what would be refreshed without refreshing
        #[arg(long)]
        dry_run: bool,
    },

    /// List items that need a refresh and why
    List {
        /// Item kinds to list
        #[arg(value_enum)]
        task: TaskSelector,

        /// Read items from a snapshot database instead of Jellyfin
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Copy the Jellyfin catalog into a snapshot database
    Snapshot {
        /// Snapshot database to write
        #[arg(short, long, required = true)]
        output: PathBuf,
    },

    /// Refresh on the configured schedule until interrupted
    Daemon,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
