//! Transcript operations exposed as agent tools.
//!
//! Every operation has two stable names: the tool name (`yt_` prefixed) used
//! by agent frameworks, and the bare command name served over stdio. Both
//! share parameter names, schemas and return strings.
//!
//! Operation failures are turned into `"Error <verb>: <message>"` strings
//! here. Only caller mistakes (unknown tool, malformed arguments) surface as
//! a [`ToolError`].

mod error;
pub mod params;

pub use error::ToolError;
pub use params::*;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::output::{describe_failure, no_matches_message, to_pretty_json};
use crate::transcripts::TranscriptService;

/// Language used when a call does not name one
pub const DEFAULT_LANGUAGE: &str = "en";

const TOOL_NAME_PREFIX: &str = "yt_";

/// The five transcript operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptTool {
    GetTranscript,
    GetTranscriptWithTimestamps,
    ListAvailableTranscripts,
    GetTranscriptSegment,
    SearchTranscript,
}

impl TranscriptTool {
    pub const ALL: [TranscriptTool; 5] = [
        TranscriptTool::GetTranscript,
        TranscriptTool::GetTranscriptWithTimestamps,
        TranscriptTool::ListAvailableTranscripts,
        TranscriptTool::GetTranscriptSegment,
        TranscriptTool::SearchTranscript,
    ];

    /// Name served by the stdio command server
    pub fn command_name(self) -> &'static str {
        match self {
            TranscriptTool::GetTranscript => "get_transcript",
            TranscriptTool::GetTranscriptWithTimestamps => "get_transcript_with_timestamps",
            TranscriptTool::ListAvailableTranscripts => "list_available_transcripts",
            TranscriptTool::GetTranscriptSegment => "get_transcript_segment",
            TranscriptTool::SearchTranscript => "search_transcript",
        }
    }

    /// Name registered with agent tool frameworks
    pub fn tool_name(self) -> &'static str {
        match self {
            TranscriptTool::GetTranscript => "yt_get_transcript",
            TranscriptTool::GetTranscriptWithTimestamps => "yt_get_transcript_with_timestamps",
            TranscriptTool::ListAvailableTranscripts => "yt_list_available_transcripts",
            TranscriptTool::GetTranscriptSegment => "yt_get_transcript_segment",
            TranscriptTool::SearchTranscript => "yt_search_transcript",
        }
    }

    pub fn from_command_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.command_name() == name)
    }

    pub fn from_tool_name(name: &str) -> Option<Self> {
        name.strip_prefix(TOOL_NAME_PREFIX)
            .and_then(Self::from_command_name)
    }

    pub fn description(self) -> &'static str {
        match self {
            TranscriptTool::GetTranscript => {
                "Get full transcript for a YouTube video as plain text."
            }
            TranscriptTool::GetTranscriptWithTimestamps => {
                "Get transcript with timestamps for a YouTube video in JSON format."
            }
            TranscriptTool::ListAvailableTranscripts => {
                "List all available transcript languages for a YouTube video."
            }
            TranscriptTool::GetTranscriptSegment => {
                "Get transcript segment between specific timestamps (in seconds)."
            }
            TranscriptTool::SearchTranscript => {
                "Search for a term in a YouTube video transcript. Returns matching segments with timestamps."
            }
        }
    }

    /// JSON schema of the tool's arguments
    pub fn input_schema(self, default_language: &str) -> Value {
        let video_url = json!({
            "type": "string",
            "description": "YouTube video URL or video ID"
        });
        let language = json!({
            "type": "string",
            "description": "Language code (e.g. 'en', 'es', 'fr')",
            "default": default_language
        });

        match self {
            TranscriptTool::GetTranscript | TranscriptTool::GetTranscriptWithTimestamps => json!({
                "type": "object",
                "properties": {
                    "video_url": video_url,
                    "language": language
                },
                "required": ["video_url"]
            }),
            TranscriptTool::ListAvailableTranscripts => json!({
                "type": "object",
                "properties": {
                    "video_url": video_url
                },
                "required": ["video_url"]
            }),
            TranscriptTool::GetTranscriptSegment => json!({
                "type": "object",
                "properties": {
                    "video_url": video_url,
                    "start_time": {
                        "type": "integer",
                        "description": "Start time in seconds"
                    },
                    "end_time": {
                        "type": "integer",
                        "description": "End time in seconds"
                    },
                    "language": language
                },
                "required": ["video_url", "start_time", "end_time"]
            }),
            TranscriptTool::SearchTranscript => json!({
                "type": "object",
                "properties": {
                    "video_url": video_url,
                    "search_term": {
                        "type": "string",
                        "description": "Term to search for in the transcript"
                    },
                    "language": language
                },
                "required": ["video_url", "search_term"]
            }),
        }
    }

    fn failure_verb(self) -> &'static str {
        match self {
            TranscriptTool::GetTranscript | TranscriptTool::GetTranscriptWithTimestamps => {
                "fetching transcript"
            }
            TranscriptTool::ListAvailableTranscripts => "listing transcripts",
            TranscriptTool::GetTranscriptSegment => "fetching transcript segment",
            TranscriptTool::SearchTranscript => "searching transcript",
        }
    }
}

/// Name, description and argument schema of a registered tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Registry that runs transcript tools and renders their results as strings
#[derive(Clone)]
pub struct TranscriptTools {
    service: TranscriptService,
    default_language: String,
}

impl TranscriptTools {
    pub fn new(service: TranscriptService) -> Self {
        Self {
            service,
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Use `language` when a call does not name one
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    /// Definitions under the agent tool names
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.definitions_named(TranscriptTool::tool_name)
    }

    /// Definitions under the stdio command names
    pub fn command_definitions(&self) -> Vec<ToolDefinition> {
        self.definitions_named(TranscriptTool::command_name)
    }

    fn definitions_named(&self, name: fn(TranscriptTool) -> &'static str) -> Vec<ToolDefinition> {
        TranscriptTool::ALL
            .into_iter()
            .map(|tool| ToolDefinition {
                name: name(tool).to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(&self.default_language),
            })
            .collect()
    }

    /// Run a tool by its agent tool name
    pub async fn call(&self, name: &str, arguments: Value) -> Result<String, ToolError> {
        let tool = TranscriptTool::from_tool_name(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        self.invoke(tool, arguments).await
    }

    /// Run a tool, rendering operation failures into the returned string
    pub async fn invoke(&self, tool: TranscriptTool, arguments: Value) -> Result<String, ToolError> {
        tracing::debug!("Invoking tool {}", tool.tool_name());

        let rendered = match tool {
            TranscriptTool::GetTranscript => {
                let params: GetTranscriptParams = parse_arguments(tool, arguments)?;
                let language = self.language(params.language.as_deref());
                self.service.get_transcript(&params.video_url, language).await
            }
            TranscriptTool::GetTranscriptWithTimestamps => {
                let params: GetTranscriptParams = parse_arguments(tool, arguments)?;
                let language = self.language(params.language.as_deref());
                self.service
                    .get_transcript_with_timestamps(&params.video_url, language)
                    .await
            }
            TranscriptTool::ListAvailableTranscripts => {
                let params: ListTranscriptsParams = parse_arguments(tool, arguments)?;
                self.service
                    .list_available_transcripts(&params.video_url)
                    .await
                    .and_then(|tracks| Ok(to_pretty_json(&tracks)?))
            }
            TranscriptTool::GetTranscriptSegment => {
                let params: GetSegmentParams = parse_arguments(tool, arguments)?;
                let language = self.language(params.language.as_deref());
                self.service
                    .get_transcript_segment(&params.video_url, params.start_time, params.end_time, language)
                    .await
            }
            TranscriptTool::SearchTranscript => {
                let params: SearchTranscriptParams = parse_arguments(tool, arguments)?;
                let language = self.language(params.language.as_deref());
                self.service
                    .search_transcript(&params.video_url, &params.search_term, language)
                    .await
                    .and_then(|matches| {
                        if matches.is_empty() {
                            return Ok(no_matches_message(&params.search_term));
                        }
                        Ok(to_pretty_json(&matches)?)
                    })
            }
        };

        Ok(rendered.unwrap_or_else(|e| {
            tracing::warn!("{} failed: {}", tool.tool_name(), e);
            describe_failure(tool.failure_verb(), &e)
        }))
    }

    fn language<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(&self.default_language)
    }
}

fn parse_arguments<T: DeserializeOwned>(tool: TranscriptTool, arguments: Value) -> Result<T, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };

    serde_json::from_value(arguments).map_err(|source| ToolError::InvalidArguments {
        tool: tool.tool_name(),
        source,
    })
}
