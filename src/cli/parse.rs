//! CLI parse: clap types for frameview. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Frameview CLI - browse conversation threads from a frame stream
#[derive(Parser)]
#[command(name = "frameview")]
#[command(about = "Reconstruct conversation threads from a frame stream")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (for config/config.toml)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// NDJSON frame stream to read; `-` reads stdin
    #[arg(long, short, default_value = "-")]
    pub input: PathBuf,

    /// Blob store base URL (overrides cas.base_url)
    #[arg(long)]
    pub cas_url: Option<String>,

    /// Disable colored output
    #[arg(long, default_value = "false")]
    pub no_color: bool,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List current thread heads, newest identifier first
    Heads {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show the thread ending at a head, newest frame first
    Thread {
        /// Frame id to walk back from (defaults to the first head)
        head_id: Option<String>,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Print a stored frame as JSON
    Frame {
        id: String,
    },
    /// Resolve a content hash through the blob store
    Cat {
        hash: String,
    },
}
