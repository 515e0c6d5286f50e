use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod youtube;

pub use youtube::YoutubeTranscriptProvider;

use crate::utils::watch_url;

/// One captioned line of a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSnippet {
    /// Caption text
    pub text: String,

    /// Start offset in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

/// Metadata for a transcript track available on a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTrack {
    /// Display name of the language (e.g. "English (auto-generated)")
    pub language: String,

    /// Language code (e.g. "en")
    pub language_code: String,

    /// Whether the track was generated by automatic speech recognition
    pub is_generated: bool,

    /// Whether YouTube can machine-translate the track
    pub is_translatable: bool,
}

/// A fetched transcript, snippets ordered by start time
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedTranscript {
    pub video_id: String,
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
    pub snippets: Vec<TranscriptSnippet>,
}

impl FetchedTranscript {
    /// Raw `{text, start, duration}` entries
    pub fn to_raw_data(&self) -> &[TranscriptSnippet] {
        &self.snippets
    }
}

/// Failures reaching or reading the transcript provider
#[derive(thiserror::Error, Debug)]
pub enum ProviderFetchError {
    #[error("Could not retrieve a transcript for the video {}: you provided a URL instead of a video ID", watch_url(.video_id))]
    InvalidVideoId { video_id: String },

    #[error("Could not retrieve a transcript for the video {}: the video is no longer available", watch_url(.video_id))]
    VideoUnavailable { video_id: String },

    #[error("Could not retrieve a transcript for the video {}: the video is unplayable ({reason})", watch_url(.video_id))]
    VideoUnplayable { video_id: String, reason: String },

    #[error("Could not retrieve a transcript for the video {}: the video is age restricted", watch_url(.video_id))]
    AgeRestricted { video_id: String },

    #[error("Could not retrieve a transcript for the video {}: subtitles are disabled for this video", watch_url(.video_id))]
    TranscriptsDisabled { video_id: String },

    #[error(
        "Could not retrieve a transcript for the video {}: no transcript found for any of the requested language codes {requested:?} (available: {available:?})",
        watch_url(.video_id)
    )]
    NoTranscriptFound {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("Could not retrieve a transcript for the video {}: YouTube is blocking requests from this IP", watch_url(.video_id))]
    RequestBlocked { video_id: String },

    #[error("Could not retrieve a transcript for the video {}: YouTube is asking for a captcha, this IP has been blocked", watch_url(.video_id))]
    IpBlocked { video_id: String },

    #[error("Could not retrieve a transcript for the video {}: too many requests", watch_url(.video_id))]
    TooManyRequests { video_id: String },

    #[error("Could not retrieve a transcript for the video {}: failed to automatically give consent to saving cookies", watch_url(.video_id))]
    FailedToCreateConsentCookie { video_id: String },

    #[error("Could not retrieve a transcript for the video {}: the caption track requires a PO token", watch_url(.video_id))]
    PoTokenRequired { video_id: String },

    #[error("Could not retrieve a transcript for the video {}: the data YouTube returned could not be parsed ({detail})", watch_url(.video_id))]
    YouTubeDataUnparsable { video_id: String, detail: String },

    #[error("Could not retrieve a transcript for the video {}: the request to YouTube failed ({source})", watch_url(.video_id))]
    Http {
        video_id: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Source of transcript data for a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// List every transcript track available for a video, in provider order
    async fn list(&self, video_id: &str) -> Result<Vec<TranscriptTrack>, ProviderFetchError>;

    /// Fetch the first transcript matching the preferred language codes
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<FetchedTranscript, ProviderFetchError>;
}

/// Pick the track for the first requested language that has one.
///
/// For each code, a manually created track is preferred over a generated one.
pub fn select_track<'a, T, F>(
    video_id: &str,
    tracks: &'a [T],
    languages: &[String],
    metadata: F,
) -> Result<&'a T, ProviderFetchError>
where
    F: Fn(&T) -> &TranscriptTrack,
{
    for code in languages {
        let mut candidates = tracks
            .iter()
            .filter(|track| metadata(track).language_code == *code);

        let manual = candidates.clone().find(|track| !metadata(track).is_generated);
        if let Some(track) = manual.or_else(|| candidates.next()) {
            return Ok(track);
        }
    }

    Err(ProviderFetchError::NoTranscriptFound {
        video_id: video_id.to_string(),
        requested: languages.to_vec(),
        available: tracks
            .iter()
            .map(|track| metadata(track).language_code.clone())
            .collect(),
    })
}
