use anyhow::Context;
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE};
use reqwest::{Client, Response, StatusCode};
use scraper::Html;
use serde::Deserialize;
use serde_json::json;
use std::sync::OnceLock;
use std::time::Duration;

use super::{
    select_track, FetchedTranscript, ProviderFetchError, TranscriptProvider, TranscriptSnippet,
    TranscriptTrack,
};
use crate::config::ProviderConfig;

const CONSENT_FORM_MARKER: &str = "action=\"https://consent.youtube.com/s\"";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";
const PO_TOKEN_MARKER: &str = "&exp=xpe";

const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

const PLAYABILITY_OK: &str = "OK";
const PLAYABILITY_LOGIN_REQUIRED: &str = "LOGIN_REQUIRED";
const PLAYABILITY_ERROR: &str = "ERROR";
const REASON_BOT_DETECTED: &str = "Sign in to confirm you\u{2019}re not a bot";
const REASON_AGE_RESTRICTED: &str = "This video may be inappropriate for some users.";
const REASON_VIDEO_UNAVAILABLE: &str = "This video is unavailable";

fn innertube_api_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#)
            .expect("Failed to compile API key regex")
    })
}

fn consent_value_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"name="v" value="(.*?)""#).expect("Failed to compile consent regex")
    })
}

fn text_element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<text\b([^>]*?)(?:/>|>(.*?)</text>)")
            .expect("Failed to compile text element regex")
    })
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(\w+)="([^"]*)""#).expect("Failed to compile attribute regex"))
}

/// Innertube player response, reduced to the fields we read
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    caption_tracks: Option<Vec<CaptionTrackData>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrackData {
    base_url: String,
    name: TrackName,
    language_code: String,
    kind: Option<String>,
    #[serde(default)]
    is_translatable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    runs: Option<Vec<TextRun>>,
    simple_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl TrackName {
    fn display(&self) -> String {
        self.runs
            .as_ref()
            .and_then(|runs| runs.first())
            .map(|run| run.text.clone())
            .or_else(|| self.simple_text.clone())
            .unwrap_or_default()
    }
}

/// A caption track together with the URL its timed text is served from
#[derive(Debug, Clone)]
struct CaptionTrack {
    metadata: TranscriptTrack,
    base_url: String,
}

/// Transcript provider backed by YouTube's watch page and innertube player API
pub struct YoutubeTranscriptProvider {
    client: Client,
    base_url: String,
    accept_language: String,
}

impl YoutubeTranscriptProvider {
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str());

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .with_context(|| format!("Invalid proxy URL: {}", proxy))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self::with_client(client, &config.base_url, &config.accept_language))
    }

    fn with_client(client: Client, base_url: &str, accept_language: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            accept_language: accept_language.to_string(),
        }
    }

    /// Resolve every caption track of a video, including where to fetch it from
    async fn caption_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, ProviderFetchError> {
        if video_id.starts_with("http://") || video_id.starts_with("https://") {
            return Err(ProviderFetchError::InvalidVideoId {
                video_id: video_id.to_string(),
            });
        }

        let html = self.fetch_video_html(video_id).await?;
        let api_key = extract_innertube_api_key(video_id, &html)?;
        let player = self.fetch_player_response(video_id, &api_key).await?;

        parse_caption_tracks(video_id, &player)
    }

    async fn fetch_video_html(&self, video_id: &str) -> Result<String, ProviderFetchError> {
        let html = self.get_watch_page(video_id, None).await?;
        if !html.contains(CONSENT_FORM_MARKER) {
            return Ok(html);
        }

        tracing::debug!("Consent form returned for {}, retrying with consent cookie", video_id);
        let consent = consent_cookie(video_id, &html)?;

        let html = self.get_watch_page(video_id, Some(&consent)).await?;
        if html.contains(CONSENT_FORM_MARKER) {
            return Err(ProviderFetchError::FailedToCreateConsentCookie {
                video_id: video_id.to_string(),
            });
        }

        Ok(html)
    }

    async fn get_watch_page(
        &self,
        video_id: &str,
        cookie: Option<&str>,
    ) -> Result<String, ProviderFetchError> {
        let url = format!("{}/watch?v={}", self.base_url, urlencoding::encode(video_id));
        tracing::debug!("Fetching watch page: {}", url);

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str());
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await.map_err(http_error(video_id))?;
        read_body(video_id, response).await
    }

    async fn fetch_player_response(
        &self,
        video_id: &str,
        api_key: &str,
    ) -> Result<String, ProviderFetchError> {
        let url = format!("{}/youtubei/v1/player?key={}", self.base_url, api_key);
        tracing::debug!("Requesting innertube player data for {}", video_id);

        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let response = self
            .client
            .post(&url)
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str())
            .json(&body)
            .send()
            .await
            .map_err(http_error(video_id))?;
        read_body(video_id, response).await
    }

    async fn fetch_timed_text(
        &self,
        video_id: &str,
        track: &CaptionTrack,
    ) -> Result<Vec<TranscriptSnippet>, ProviderFetchError> {
        if track.base_url.contains(PO_TOKEN_MARKER) {
            return Err(ProviderFetchError::PoTokenRequired {
                video_id: video_id.to_string(),
            });
        }

        tracing::debug!(
            "Fetching {} transcript for {}",
            track.metadata.language_code,
            video_id
        );
        let response = self
            .client
            .get(&track.base_url)
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str())
            .send()
            .await
            .map_err(http_error(video_id))?;
        let xml = read_body(video_id, response).await?;

        Ok(parse_timed_text(&xml))
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeTranscriptProvider {
    async fn list(&self, video_id: &str) -> Result<Vec<TranscriptTrack>, ProviderFetchError> {
        let tracks = self.caption_tracks(video_id).await?;
        Ok(tracks.into_iter().map(|track| track.metadata).collect())
    }

    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<FetchedTranscript, ProviderFetchError> {
        let tracks = self.caption_tracks(video_id).await?;
        let track = select_track(video_id, &tracks, languages, |track| &track.metadata)?;
        let snippets = self.fetch_timed_text(video_id, track).await?;

        Ok(FetchedTranscript {
            video_id: video_id.to_string(),
            language: track.metadata.language.clone(),
            language_code: track.metadata.language_code.clone(),
            is_generated: track.metadata.is_generated,
            snippets,
        })
    }
}

fn http_error(video_id: &str) -> impl Fn(reqwest::Error) -> ProviderFetchError + '_ {
    move |source| ProviderFetchError::Http {
        video_id: video_id.to_string(),
        source,
    }
}

async fn read_body(video_id: &str, response: Response) -> Result<String, ProviderFetchError> {
    check_status(video_id, response.status())?;
    response
        .error_for_status()
        .map_err(http_error(video_id))?
        .text()
        .await
        .map_err(http_error(video_id))
}

fn check_status(video_id: &str, status: StatusCode) -> Result<(), ProviderFetchError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderFetchError::TooManyRequests {
            video_id: video_id.to_string(),
        });
    }
    Ok(())
}

/// Build the cookie that accepts YouTube's consent form
fn consent_cookie(video_id: &str, html: &str) -> Result<String, ProviderFetchError> {
    consent_value_regex()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| format!("CONSENT=YES+{}", m.as_str()))
        .ok_or_else(|| ProviderFetchError::FailedToCreateConsentCookie {
            video_id: video_id.to_string(),
        })
}

fn extract_innertube_api_key(video_id: &str, html: &str) -> Result<String, ProviderFetchError> {
    if let Some(key) = innertube_api_key_regex()
        .captures(html)
        .and_then(|caps| caps.get(1))
    {
        return Ok(key.as_str().to_string());
    }

    if html.contains(RECAPTCHA_MARKER) {
        return Err(ProviderFetchError::IpBlocked {
            video_id: video_id.to_string(),
        });
    }

    Err(ProviderFetchError::YouTubeDataUnparsable {
        video_id: video_id.to_string(),
        detail: "innertube API key not found in watch page".to_string(),
    })
}

fn parse_caption_tracks(video_id: &str, body: &str) -> Result<Vec<CaptionTrack>, ProviderFetchError> {
    let player: PlayerResponse =
        serde_json::from_str(body).map_err(|e| ProviderFetchError::YouTubeDataUnparsable {
            video_id: video_id.to_string(),
            detail: e.to_string(),
        })?;

    if let Some(status) = &player.playability_status {
        assert_playability(video_id, status)?;
    }

    let tracks = player
        .captions
        .and_then(|captions| captions.player_captions_tracklist_renderer)
        .and_then(|renderer| renderer.caption_tracks)
        .ok_or_else(|| ProviderFetchError::TranscriptsDisabled {
            video_id: video_id.to_string(),
        })?;

    Ok(tracks
        .into_iter()
        .map(|track| CaptionTrack {
            metadata: TranscriptTrack {
                language: track.name.display(),
                language_code: track.language_code,
                is_generated: track.kind.as_deref() == Some("asr"),
                is_translatable: track.is_translatable,
            },
            base_url: track.base_url.replace("&fmt=srv3", ""),
        })
        .collect())
}

fn assert_playability(video_id: &str, playability: &PlayabilityStatus) -> Result<(), ProviderFetchError> {
    let status = match playability.status.as_deref() {
        None | Some(PLAYABILITY_OK) => return Ok(()),
        Some(status) => status,
    };
    let reason = playability.reason.as_deref().unwrap_or_default();
    let video_id = video_id.to_string();

    match (status, reason) {
        (PLAYABILITY_LOGIN_REQUIRED, REASON_BOT_DETECTED) => {
            Err(ProviderFetchError::RequestBlocked { video_id })
        }
        (PLAYABILITY_LOGIN_REQUIRED, REASON_AGE_RESTRICTED) => {
            Err(ProviderFetchError::AgeRestricted { video_id })
        }
        (PLAYABILITY_ERROR, REASON_VIDEO_UNAVAILABLE) => {
            Err(ProviderFetchError::VideoUnavailable { video_id })
        }
        _ => Err(ProviderFetchError::VideoUnplayable {
            video_id,
            reason: if reason.is_empty() {
                status.to_string()
            } else {
                reason.to_string()
            },
        }),
    }
}

/// Parse YouTube's timed-text XML into snippets
fn parse_timed_text(xml: &str) -> Vec<TranscriptSnippet> {
    text_element_regex()
        .captures_iter(xml)
        .filter_map(|caps| {
            let attributes = caps.get(1).map_or("", |m| m.as_str());
            let body = caps.get(2).map_or("", |m| m.as_str());

            let mut start = None;
            let mut duration = 0.0;
            for attr in attribute_regex().captures_iter(attributes) {
                match &attr[1] {
                    "start" => start = attr[2].parse::<f64>().ok(),
                    "dur" => duration = attr[2].parse::<f64>().unwrap_or(0.0),
                    _ => {}
                }
            }

            let Some(start) = start else {
                tracing::warn!("Skipping caption without a valid start attribute");
                return None;
            };

            let text = decode_caption_text(body);
            if text.is_empty() {
                return None;
            }

            Some(TranscriptSnippet { text, start, duration })
        })
        .collect()
}

/// Decode entities and strip markup. Caption bodies arrive double-escaped.
fn decode_caption_text(raw: &str) -> String {
    let once = html_text(raw);
    html_text(&once)
}

fn html_text(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const VIDEO_ID: &str = "dQw4w9WgXcQ";
    const CONSENT_PAGE: &str = r#"<form action="https://consent.youtube.com/s" method="POST"><input type="hidden" name="v" value="cb.20210328-17-p0.en+FX+123"></form>"#;

    fn local_provider(base_url: &str) -> YoutubeTranscriptProvider {
        let client = Client::builder().no_proxy().build().unwrap();
        YoutubeTranscriptProvider::with_client(client, base_url, "en-US")
    }

    /// Answer one connection per canned `(status, body)` and return the raw requests
    async fn serve_responses(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();

                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&chunk[..n]);
                }
                requests.push(String::from_utf8_lossy(&request).to_lowercase());

                let response = format!(
                    "HTTP/1.1 {} Canned\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
            requests
        });

        (base_url, handle)
    }

    fn player_json(tracks: &str) -> String {
        format!(
            r#"{{
                "playabilityStatus": {{"status": "OK"}},
                "captions": {{
                    "playerCaptionsTracklistRenderer": {{
                        "captionTracks": {}
                    }}
                }}
            }}"#,
            tracks
        )
    }

    #[test]
    fn test_extract_api_key() {
        let html = r#"<script>ytcfg.set({"INNERTUBE_API_KEY": "AIzaSyA-test_key","OTHER":1})</script>"#;
        assert_eq!(extract_innertube_api_key("vid", html).unwrap(), "AIzaSyA-test_key");
    }

    #[test]
    fn test_missing_api_key_with_captcha_is_ip_blocked() {
        let html = r#"<form><div class="g-recaptcha"></div></form>"#;
        assert!(matches!(
            extract_innertube_api_key("vid", html),
            Err(ProviderFetchError::IpBlocked { .. })
        ));
    }

    #[test]
    fn test_missing_api_key_is_unparsable() {
        assert!(matches!(
            extract_innertube_api_key("vid", "<html></html>"),
            Err(ProviderFetchError::YouTubeDataUnparsable { .. })
        ));
    }

    #[test]
    fn test_parse_caption_tracks() {
        let body = player_json(
            r#"[
                {
                    "baseUrl": "https://www.youtube.com/api/timedtext?v=vid&lang=en&fmt=srv3",
                    "name": {"runs": [{"text": "English"}]},
                    "languageCode": "en",
                    "isTranslatable": true
                },
                {
                    "baseUrl": "https://www.youtube.com/api/timedtext?v=vid&lang=de&kind=asr",
                    "name": {"simpleText": "German (auto-generated)"},
                    "languageCode": "de",
                    "kind": "asr"
                }
            ]"#,
        );

        let tracks = parse_caption_tracks("vid", &body).unwrap();
        assert_eq!(tracks.len(), 2);

        assert_eq!(
            tracks[0].metadata,
            TranscriptTrack {
                language: "English".to_string(),
                language_code: "en".to_string(),
                is_generated: false,
                is_translatable: true,
            }
        );
        assert_eq!(
            tracks[0].base_url,
            "https://www.youtube.com/api/timedtext?v=vid&lang=en"
        );

        assert_eq!(tracks[1].metadata.language, "German (auto-generated)");
        assert!(tracks[1].metadata.is_generated);
        assert!(!tracks[1].metadata.is_translatable);
    }

    #[test]
    fn test_missing_captions_means_disabled() {
        let body = r#"{"playabilityStatus": {"status": "OK"}}"#;
        assert!(matches!(
            parse_caption_tracks("vid", body),
            Err(ProviderFetchError::TranscriptsDisabled { .. })
        ));
    }

    #[test]
    fn test_playability_errors() {
        let body = r#"{"playabilityStatus": {"status": "ERROR", "reason": "This video is unavailable"}}"#;
        assert!(matches!(
            parse_caption_tracks("vid", body),
            Err(ProviderFetchError::VideoUnavailable { .. })
        ));

        let body = r#"{"playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "Sign in to confirm you’re not a bot"}}"#;
        assert!(matches!(
            parse_caption_tracks("vid", body),
            Err(ProviderFetchError::RequestBlocked { .. })
        ));

        let body = r#"{"playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "This video may be inappropriate for some users."}}"#;
        assert!(matches!(
            parse_caption_tracks("vid", body),
            Err(ProviderFetchError::AgeRestricted { .. })
        ));

        let body = r#"{"playabilityStatus": {"status": "UNPLAYABLE", "reason": "Private video"}}"#;
        match parse_caption_tracks("vid", body) {
            Err(ProviderFetchError::VideoUnplayable { reason, .. }) => assert_eq!(reason, "Private video"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_garbage_player_response_is_unparsable() {
        assert!(matches!(
            parse_caption_tracks("vid", "not json"),
            Err(ProviderFetchError::YouTubeDataUnparsable { .. })
        ));
    }

    #[test]
    fn test_parse_timed_text() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
<text start="0" dur="2.5">Hello world</text>
<text start="2.5" dur="3.04">It&amp;#39;s a &amp;quot;test&amp;quot;</text>
<text start="5.54" dur="1">&lt;i&gt;music&lt;/i&gt;</text>
<text start="7" dur="1"></text>
<text start="8.2">no duration</text>
</transcript>"#;

        let snippets = parse_timed_text(xml);
        assert_eq!(
            snippets,
            vec![
                TranscriptSnippet { text: "Hello world".to_string(), start: 0.0, duration: 2.5 },
                TranscriptSnippet { text: "It's a \"test\"".to_string(), start: 2.5, duration: 3.04 },
                TranscriptSnippet { text: "music".to_string(), start: 5.54, duration: 1.0 },
                TranscriptSnippet { text: "no duration".to_string(), start: 8.2, duration: 0.0 },
            ]
        );
    }

    #[test]
    fn test_parse_timed_text_skips_self_closing_elements() {
        let xml = r#"<transcript><text start="0" dur="1"/><text start="1" dur="2">Hello</text><text start="3" dur="1">World</text></transcript>"#;

        assert_eq!(
            parse_timed_text(xml),
            vec![
                TranscriptSnippet { text: "Hello".to_string(), start: 1.0, duration: 2.0 },
                TranscriptSnippet { text: "World".to_string(), start: 3.0, duration: 1.0 },
            ]
        );
    }

    #[test]
    fn test_consent_cookie() {
        assert_eq!(
            consent_cookie(VIDEO_ID, CONSENT_PAGE).unwrap(),
            "CONSENT=YES+cb.20210328-17-p0.en+FX+123"
        );

        let form_without_value = r#"<form action="https://consent.youtube.com/s"></form>"#;
        assert!(matches!(
            consent_cookie(VIDEO_ID, form_without_value),
            Err(ProviderFetchError::FailedToCreateConsentCookie { .. })
        ));
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(VIDEO_ID, StatusCode::OK).is_ok());
        assert!(check_status(VIDEO_ID, StatusCode::NOT_FOUND).is_ok());
        assert!(matches!(
            check_status(VIDEO_ID, StatusCode::TOO_MANY_REQUESTS),
            Err(ProviderFetchError::TooManyRequests { .. })
        ));
    }

    #[tokio::test]
    async fn test_rate_limited_watch_page() {
        let (base_url, server) = serve_responses(vec![(429, "")]).await;

        let err = local_provider(&base_url).list(VIDEO_ID).await.unwrap_err();
        assert!(matches!(err, ProviderFetchError::TooManyRequests { .. }));

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("get /watch?v=dqw4w9wgxcq "));
    }

    #[tokio::test]
    async fn test_consent_form_is_retried_with_cookie() {
        let (base_url, server) =
            serve_responses(vec![(200, CONSENT_PAGE), (200, "<html>no player config</html>")]).await;

        let err = local_provider(&base_url).list(VIDEO_ID).await.unwrap_err();
        assert!(matches!(err, ProviderFetchError::YouTubeDataUnparsable { .. }));

        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].contains("cookie:"));
        assert!(requests[1].contains("cookie: consent=yes+cb.20210328-17-p0.en+fx+123"));
    }

    #[tokio::test]
    async fn test_repeated_consent_form_fails() {
        let (base_url, server) = serve_responses(vec![(200, CONSENT_PAGE), (200, CONSENT_PAGE)]).await;

        let err = local_provider(&base_url).list(VIDEO_ID).await.unwrap_err();
        assert!(matches!(err, ProviderFetchError::FailedToCreateConsentCookie { .. }));
        assert_eq!(server.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_po_token_track_is_rejected_before_fetching() {
        let track = CaptionTrack {
            metadata: TranscriptTrack {
                language: "English".to_string(),
                language_code: "en".to_string(),
                is_generated: false,
                is_translatable: true,
            },
            base_url: "http://127.0.0.1:9/api/timedtext?v=vid&lang=en&exp=xpe".to_string(),
        };

        let err = local_provider("http://127.0.0.1:9")
            .fetch_timed_text(VIDEO_ID, &track)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderFetchError::PoTokenRequired { .. }));
    }

    #[tokio::test]
    async fn test_connection_failure_names_the_video() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = local_provider(&base_url).list(VIDEO_ID).await.unwrap_err();
        assert!(matches!(err, ProviderFetchError::Http { .. }));
        assert!(err
            .to_string()
            .contains("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_parse_timed_text_keeps_multiline_captions() {
        let xml = "<transcript><text start=\"1\" dur=\"2\">first line\nsecond line</text></transcript>";
        let snippets = parse_timed_text(xml);
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].text, "first line\nsecond line");
    }
}
