//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Download the provider's content manifest and explore its item store.
///
/// `download` fetches and unpacks the current manifest into the data
/// directory; `explore` reads it back and builds the category index.
#[derive(Parser, Debug)]
#[command(name = "manifest-explorer")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Data directory holding the store, run record and category index
    #[arg(short = 'd', long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve, download and extract the current manifest (needs BUNGIE_API_KEY)
    Download(DownloadArgs),

    /// Inspect the extracted store and write the category index
    Explore(ExploreArgs),

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct DownloadArgs {
    /// Manifest language to download (e.g. en, de, fr)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Provider origin, for mirrors and testing
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExploreArgs {
    /// Number of categories in the ranking (1-500)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..=500))]
    pub top: Option<u16>,

    /// Item definition table to analyse
    #[arg(long, value_name = "TABLE")]
    pub item_table: Option<String>,

    /// Category definition table to join
    #[arg(long, value_name = "TABLE")]
    pub category_table: Option<String>,

    /// Sample items shown per section (0-100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub samples: Option<u32>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigCommand {
    /// Print the effective configuration and where it came from
    Show,
}
