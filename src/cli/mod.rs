use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yt-transcripts",
    about = "YouTube Transcript Tools - fetch, list, slice and search YouTube transcripts",
    version,
    long_about = "Fetch YouTube video transcripts as plain text or JSON, list available languages, slice by time range and search. Run `serve` to expose the same operations as an MCP server over stdio."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file
    #[arg(long, global = true, env = "YT_TRANSCRIPTS_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the result to a file instead of stdout
    #[arg(short, long, global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the MCP server on stdin/stdout
    Serve,

    /// Print the full transcript as plain text
    Transcript {
        /// YouTube video URL or video ID
        #[arg(value_name = "VIDEO")]
        video: String,

        /// Language code (defaults to the configured language)
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,
    },

    /// Print the transcript as JSON with start times and durations
    Timestamps {
        /// YouTube video URL or video ID
        #[arg(value_name = "VIDEO")]
        video: String,

        /// Language code (defaults to the configured language)
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,
    },

    /// List the transcript languages available for a video
    Languages {
        /// YouTube video URL or video ID
        #[arg(value_name = "VIDEO")]
        video: String,
    },

    /// Print the transcript lines starting between two offsets
    Segment {
        /// YouTube video URL or video ID
        #[arg(value_name = "VIDEO")]
        video: String,

        /// Start time in seconds
        #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
        start: i64,

        /// End time in seconds
        #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
        end: i64,

        /// Language code (defaults to the configured language)
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,
    },

    /// Search a transcript for a term (case-insensitive)
    Search {
        /// YouTube video URL or video ID
        #[arg(value_name = "VIDEO")]
        video: String,

        /// Term to search for
        #[arg(value_name = "TERM")]
        term: String,

        /// Language code (defaults to the configured language)
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,
    },

    /// Print the tool definitions as JSON
    Tools {
        /// Use the stdio server's command names instead of the agent tool names
        #[arg(long)]
        commands: bool,
    },

    /// Show or initialize the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write the default configuration file
        #[arg(long, conflicts_with = "show")]
        init: bool,
    },
}
