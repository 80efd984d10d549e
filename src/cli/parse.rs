//! CLI parse: clap types for Quill. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Quill CLI - research-backed content generation
#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Generate, track and publish research-backed content")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (where config/ is looked up)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short = 'v', default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q', default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate content for a topic, streaming progress from the backend
    Generate {
        /// Topic to research and write about (3-100 characters)
        topic: String,
        /// Target platform (see `quill platforms`)
        #[arg(long, default_value = "linkedin")]
        platform: String,
        /// Writing tone (see `quill tones`)
        #[arg(long, default_value = "professional")]
        tone: String,
        /// Use the blocking endpoint instead of the progress stream
        #[arg(long)]
        sync: bool,
        /// Do not record the result in history
        #[arg(long)]
        no_history: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Browse and manage past generations
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// List target platforms
    Platforms {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List writing tones
    Tones {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Check backend liveness
    Health {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show backend service and workflow status
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Publish content to LinkedIn
    Publish {
        #[command(subcommand)]
        command: PublishCommands,
    },
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List recorded generations, newest first
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show one generation in full
    Show {
        /// History item id
        id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Remove one generation
    Remove {
        /// History item id
        id: String,
    },
    /// Remove every generation
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Write a plain-text report of one generation
    Export {
        /// History item id
        id: String,
        /// Output path (defaults to content_<topic>_<timestamp>.txt in the workspace directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum PublishCommands {
    /// Post content to LinkedIn
    Post {
        /// Text to post (omit when using --from-history)
        #[arg(required_unless_present = "from_history")]
        content: Option<String>,
        /// Post the content (and image) of a history item
        #[arg(long, conflicts_with = "content")]
        from_history: Option<String>,
        /// Image to attach
        #[arg(long)]
        image: Option<String>,
        /// Audience: PUBLIC, CONNECTIONS or LOGGED_IN_MEMBERS
        #[arg(long, default_value = "PUBLIC")]
        visibility: String,
    },
    /// Show whether LinkedIn publishing is configured
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
