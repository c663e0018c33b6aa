use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hindsight")]
#[command(version)]
#[command(about = "Screen session recorder with compressed activity logs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a session from a scripted event stream
    Record {
        /// Path to the event JSONL script
        #[arg(short, long)]
        input: String,

        /// Session title (defaults to a timestamped one)
        #[arg(short, long)]
        title: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// List archived sessions
    List,

    /// Show one session with its compressed log
    Show { id: String },

    /// Search archived sessions by text relevance
    Search { query: String },

    /// Delete a session by id
    Delete { id: String },

    /// Show data paths and archive health
    Status,

    /// Print version information
    Version,
}
