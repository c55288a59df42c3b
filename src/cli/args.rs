//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Map the structure of a source repository
#[derive(Parser, Debug)]
#[command(name = "repomap")]
#[command(about = "Map the structure of a source repository")]
#[command(version)]
pub struct Args {
    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Clone (or reuse) a repository and map its structure
    Analyze {
        /// Repository URL or owner/name
        repo: String,

        /// Directory holding cached working copies
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Clone timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Output format (json, mermaid, html)
        #[arg(long)]
        format: Option<String>,

        /// Write the report into this directory instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Map a local directory without cloning
    Scan {
        /// Directory to scan
        path: PathBuf,

        /// Label for the graph root (defaults to the directory name)
        #[arg(long)]
        label: Option<String>,

        /// Output format (json, mermaid, html)
        #[arg(long)]
        format: Option<String>,

        /// Write the report into this directory instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a file from a cached working copy
    File {
        /// Repository URL or owner/name
        repo: String,

        /// Path relative to the repository root
        path: String,

        /// Directory holding cached working copies
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },

    /// Summarize a file from a cached working copy
    Summarize {
        /// Repository URL or owner/name
        repo: String,

        /// Path relative to the repository root
        path: String,

        /// Directory holding cached working copies
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },

    /// Show GitHub metadata for owner/name
    Info {
        /// Repository as owner/name or GitHub URL
        repo: String,
    },

    /// Show version information
    Version,
}
