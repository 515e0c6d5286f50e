use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::output::to_inline_json;
use crate::provider::{FetchedTranscript, TranscriptProvider, TranscriptTrack};
use crate::utils::{extract_video_id, format_timestamp, normalize_whitespace};
use crate::TranscriptError;

/// A transcript line matching a search term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    /// Start of the line as `M:SS`
    pub timestamp: String,

    /// The matching line, verbatim
    pub text: String,
}

/// Transcript operations over an injected provider.
///
/// Every operation accepts a video URL or bare ID, fetches fresh data from the
/// provider and reshapes it. Provider failures are returned untouched.
#[derive(Clone)]
pub struct TranscriptService {
    provider: Arc<dyn TranscriptProvider>,
}

impl TranscriptService {
    pub fn new(provider: Arc<dyn TranscriptProvider>) -> Self {
        Self { provider }
    }

    async fn fetch(&self, video_url: &str, language: &str) -> Result<FetchedTranscript, TranscriptError> {
        let video_id = extract_video_id(video_url);
        tracing::debug!("Fetching {} transcript for video {}", language, video_id);

        let transcript = self
            .provider
            .fetch(&video_id, &[language.to_string()])
            .await?;
        Ok(transcript)
    }

    /// Full transcript as plain text
    pub async fn get_transcript(&self, video_url: &str, language: &str) -> Result<String, TranscriptError> {
        let transcript = self.fetch(video_url, language).await?;

        Ok(transcript
            .to_raw_data()
            .iter()
            .map(|snippet| normalize_whitespace(&snippet.text))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" "))
    }

    /// Transcript entries with timings as a single-line JSON array
    pub async fn get_transcript_with_timestamps(
        &self,
        video_url: &str,
        language: &str,
    ) -> Result<String, TranscriptError> {
        let transcript = self.fetch(video_url, language).await?;
        Ok(to_inline_json(transcript.to_raw_data())?)
    }

    /// All transcript tracks available for a video
    pub async fn list_available_transcripts(
        &self,
        video_url: &str,
    ) -> Result<Vec<TranscriptTrack>, TranscriptError> {
        let video_id = extract_video_id(video_url);
        tracing::debug!("Listing transcripts for video {}", video_id);

        Ok(self.provider.list(&video_id).await?)
    }

    /// Text of the entries starting within `[start_time, end_time]` seconds
    pub async fn get_transcript_segment(
        &self,
        video_url: &str,
        start_time: i64,
        end_time: i64,
        language: &str,
    ) -> Result<String, TranscriptError> {
        let transcript = self.fetch(video_url, language).await?;
        let (start, end) = (start_time as f64, end_time as f64);

        Ok(transcript
            .to_raw_data()
            .iter()
            .filter(|snippet| start <= snippet.start && snippet.start <= end)
            .map(|snippet| snippet.text.as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }

    /// Entries containing `search_term`, ignoring case
    pub async fn search_transcript(
        &self,
        video_url: &str,
        search_term: &str,
        language: &str,
    ) -> Result<Vec<SearchMatch>, TranscriptError> {
        let transcript = self.fetch(video_url, language).await?;
        let needle = search_term.to_lowercase();

        Ok(transcript
            .to_raw_data()
            .iter()
            .filter(|snippet| snippet.text.to_lowercase().contains(&needle))
            .map(|snippet| SearchMatch {
                timestamp: format_timestamp(snippet.start),
                text: snippet.text.clone(),
            })
            .collect())
    }
}
