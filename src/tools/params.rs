use serde::Deserialize;

/// Arguments for fetching a whole transcript (text or timestamped JSON)
#[derive(Debug, Clone, Deserialize)]
pub struct GetTranscriptParams {
    /// YouTube video URL or video ID
    pub video_url: String,

    /// Language code, falls back to the configured default
    #[serde(default)]
    pub language: Option<String>,
}

/// Arguments for listing available transcript languages
#[derive(Debug, Clone, Deserialize)]
pub struct ListTranscriptsParams {
    pub video_url: String,
}

/// Arguments for slicing a transcript by time
#[derive(Debug, Clone, Deserialize)]
pub struct GetSegmentParams {
    pub video_url: String,

    /// Start time in seconds
    pub start_time: i64,

    /// End time in seconds
    pub end_time: i64,

    #[serde(default)]
    pub language: Option<String>,
}

/// Arguments for searching a transcript
#[derive(Debug, Clone, Deserialize)]
pub struct SearchTranscriptParams {
    pub video_url: String,

    /// Term to look for, case-insensitive
    pub search_term: String,

    #[serde(default)]
    pub language: Option<String>,
}
