//! Type definitions for the chat endpoints.

use super::stream::ChatStream;
use serde::{Deserialize, Serialize};

/// Chunk type whose content contributes to the accumulated answer
pub const STREAM_CHUNK_TYPE: &str = "STREAM";

/// Request body for `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// The question to send; trimmed before transmission
    pub question: String,
}

impl ChatRequest {
    /// Create a request, trimming surrounding whitespace from the question
    pub fn new(question: impl AsRef<str>) -> Self {
        Self {
            question: question.as_ref().trim().to_string(),
        }
    }
}

/// A complete chat answer.
///
/// `conversation_id` and `message_id` are populated only when a buffered
/// JSON reply carries them; streamed replies leave them absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// The full accumulated answer text
    pub answer: String,
    /// Server-assigned conversation identifier, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Server-assigned message identifier, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl ChatResponse {
    /// Build a response holding only an accumulated answer
    pub fn from_answer(answer: String) -> Self {
        Self {
            answer,
            conversation_id: None,
            message_id: None,
        }
    }
}

/// One decoded unit of a streaming response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamChunk {
    /// Chunk type tag; only `"STREAM"` chunks contribute to the answer
    #[serde(rename = "type")]
    pub chunk_type: String,
    /// Content fragment; absent on the wire decodes as empty
    #[serde(default)]
    pub content: String,
}

impl StreamChunk {
    /// Returns whether this chunk carries answer text
    pub fn is_stream(&self) -> bool {
        self.chunk_type == STREAM_CHUNK_TYPE
    }
}

/// Response body for `POST /clear`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClearChatResponse {
    /// Whether the history was cleared
    #[serde(default)]
    pub success: bool,
    /// Optional human-readable detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A classified reply from `POST /chat`.
///
/// The server decides per request whether to answer with a buffered JSON
/// body or a newline-delimited chunk stream; callers that only want the
/// final answer can collect either shape through
/// [`crate::session::CopilotSession::send_message`].
pub enum ChatReply {
    /// Buffered JSON reply, returned unchanged
    Complete(ChatResponse),
    /// Streaming reply; iterate or collect to obtain the answer
    Stream(ChatStream),
}

impl std::fmt::Debug for ChatReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatReply::Complete(response) => f.debug_tuple("Complete").field(response).finish(),
            ChatReply::Stream(_) => f.debug_tuple("Stream").finish(),
        }
    }
}
