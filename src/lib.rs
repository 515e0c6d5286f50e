//! YouTube Transcript Tools - fetch, list, slice and search YouTube transcripts
//!
//! This library normalizes YouTube video references, fetches captions through a
//! pluggable [`TranscriptProvider`], and reshapes them into plain text, JSON or
//! filtered lists. The same five operations are exposed as agent tools
//! ([`tools`]) and as a stdio MCP server ([`server`]).

pub mod cli;
pub mod config;
pub mod output;
pub mod provider;
pub mod server;
pub mod tools;
pub mod transcripts;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use provider::{
    FetchedTranscript, ProviderFetchError, TranscriptProvider, TranscriptSnippet, TranscriptTrack,
};
pub use tools::{TranscriptTool, TranscriptTools};
pub use transcripts::{SearchMatch, TranscriptService};

/// Result type used by the application layers (CLI, config, server I/O)
pub type Result<T> = anyhow::Result<T>;

/// Errors raised by the transcript operations
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    /// The provider could not produce transcript data. The provider's
    /// message is kept as-is.
    #[error(transparent)]
    ProviderFetch(#[from] ProviderFetchError),

    #[error("Failed to encode transcript: {0}")]
    Encoding(#[from] serde_json::Error),
}
