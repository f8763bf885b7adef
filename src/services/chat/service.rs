//! Chat service implementation.

use super::stream::ChatStream;
use super::types::{ChatReply, ChatRequest, ChatResponse, ClearChatResponse};
use super::validation::validate_question;
use crate::auth::{request_headers, AuthManager};
use crate::errors::{CopilotError, CopilotResult};
use crate::transport::{collect_body, ByteStream, HttpTransport};
use async_trait::async_trait;
use http::{header::CONTENT_TYPE, HeaderMap, Method};
use mime::Mime;
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Chat service trait for testability
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Send a question to `POST /chat`.
    ///
    /// The reply is classified by `Content-Type`: `text/event-stream` or
    /// `text/plain` means a chunk stream, anything else a buffered JSON
    /// body. Cancelling the token rejects the call with
    /// [`CopilotError::Cancelled`].
    async fn send(
        &self,
        request: ChatRequest,
        cancel: CancellationToken,
    ) -> CopilotResult<ChatReply>;

    /// Clear the conversation history via `POST /clear`
    async fn clear(&self, cancel: CancellationToken) -> CopilotResult<ClearChatResponse>;
}

/// Implementation of the chat service
pub struct ChatServiceImpl {
    transport: Arc<dyn HttpTransport>,
    auth_manager: Arc<dyn AuthManager>,
    base_url: Url,
}

/// Error body shape used by the backend for non-2xx replies
#[derive(Debug, Deserialize, Default)]
struct ApiErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

impl ChatServiceImpl {
    /// Create a new chat service
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        auth_manager: Arc<dyn AuthManager>,
        base_url: Url,
    ) -> Self {
        Self {
            transport,
            auth_manager,
            base_url,
        }
    }

    /// Append a path segment to the base URL, preserving any base path
    fn endpoint_url(&self, segment: &str) -> CopilotResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CopilotError::Configuration {
                message: format!("Base URL cannot have endpoint segments: {}", self.base_url),
            })?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    fn require_token(&self) -> CopilotResult<()> {
        if !self.auth_manager.has_token() {
            return Err(CopilotError::Authentication {
                message: "No access token has been set".to_string(),
            });
        }
        Ok(())
    }

    fn build_headers(&self) -> HeaderMap {
        request_headers(self.auth_manager.as_ref())
    }

    /// Compose an API error from a non-2xx body.
    ///
    /// The body text is parsed leniently; a body that fails to parse falls
    /// back to the generic message rather than failing error reporting.
    fn parse_api_error(status: u16, body: &[u8], fallback: &str) -> CopilotError {
        let text = String::from_utf8_lossy(body);
        let parsed: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = parsed
            .detail
            .or(parsed.message)
            .unwrap_or_else(|| fallback.to_string());

        CopilotError::Api { status, message }
    }

    /// Returns whether the response headers announce a chunk stream
    fn is_streaming_content_type(headers: &HeaderMap) -> bool {
        let Some(value) = headers.get(CONTENT_TYPE) else {
            return false;
        };
        let Ok(text) = value.to_str() else {
            return false;
        };
        let Ok(mime) = text.parse::<Mime>() else {
            return false;
        };

        mime.essence_str() == mime::TEXT_EVENT_STREAM.essence_str()
            || mime.essence_str() == mime::TEXT_PLAIN.essence_str()
    }

    /// Drain a body stream into a buffer, honoring cancellation
    async fn collect_or_cancel(
        body: ByteStream,
        cancel: &CancellationToken,
    ) -> CopilotResult<Vec<u8>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CopilotError::Cancelled),
            collected = collect_body(body) => collected,
        }
    }
}

#[async_trait]
impl ChatService for ChatServiceImpl {
    async fn send(
        &self,
        request: ChatRequest,
        cancel: CancellationToken,
    ) -> CopilotResult<ChatReply> {
        validate_question(&request.question)?;
        self.require_token()?;

        let url = self.endpoint_url("chat")?;
        let headers = self.build_headers();
        let body = serde_json::to_vec(&ChatRequest::new(&request.question))?;

        tracing::debug!(url = %url, "sending chat message");

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CopilotError::Cancelled),
            result = self.transport.execute_stream(Method::POST, url.to_string(), headers, Some(body)) => result?,
        };

        if !response.is_success() {
            let status = response.status;
            let error_body = Self::collect_or_cancel(response.body, &cancel).await?;
            return Err(Self::parse_api_error(
                status,
                &error_body,
                "Failed to send message",
            ));
        }

        if Self::is_streaming_content_type(&response.headers) {
            tracing::debug!("chat reply classified as stream");
            return Ok(ChatReply::Stream(ChatStream::new(response.body, cancel)));
        }

        let body = Self::collect_or_cancel(response.body, &cancel).await?;
        let reply: ChatResponse = serde_json::from_slice(&body)?;

        tracing::debug!(answer_len = reply.answer.len(), "chat reply classified as buffered JSON");
        Ok(ChatReply::Complete(reply))
    }

    async fn clear(&self, cancel: CancellationToken) -> CopilotResult<ClearChatResponse> {
        self.require_token()?;

        let url = self.endpoint_url("clear")?;
        let headers = self.build_headers();

        tracing::debug!(url = %url, "clearing chat history");

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CopilotError::Cancelled),
            result = self.transport.execute(Method::POST, url.to_string(), headers, None) => result?,
        };

        if !response.is_success() {
            return Err(Self::parse_api_error(
                response.status,
                &response.body,
                "Failed to clear chat",
            ));
        }

        let value: serde_json::Value =
            serde_json::from_slice(&response.body).map_err(|e| CopilotError::Protocol {
                message: format!("Clear response is not valid JSON: {}", e),
            })?;
        if !value.is_object() {
            return Err(CopilotError::Protocol {
                message: "Clear response is not a JSON object".to_string(),
            });
        }

        let parsed: ClearChatResponse = serde_json::from_value(value)?;
        Ok(parsed)
    }
}
