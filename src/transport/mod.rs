//! HTTP transport layer.
//!
//! The transport is deliberately dumb: it performs one request and hands the
//! status, headers, and body back unchanged. Response classification
//! (streaming vs. buffered JSON) and error-body normalization live in the
//! services on top of it. No retries are performed at any layer.

mod http_client;

pub use http_client::ReqwestTransport;

use crate::errors::{CopilotError, CopilotResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use http::{HeaderMap, Method};
use std::pin::Pin;

/// Boxed stream of response body bytes
pub type ByteStream = Pin<Box<dyn Stream<Item = CopilotResult<Bytes>> + Send>>;

/// HTTP transport abstraction for testability
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute an HTTP request and buffer the full response body
    async fn execute(
        &self,
        method: Method,
        url: String,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> CopilotResult<HttpResponse>;

    /// Execute an HTTP request and expose the response body as a byte stream
    async fn execute_stream(
        &self,
        method: Method,
        url: String,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> CopilotResult<StreamingResponse>;
}

/// Fully buffered HTTP response
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Complete response body
    pub body: Vec<u8>,
}

/// HTTP response whose body arrives incrementally
pub struct StreamingResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body as a byte stream
    pub body: ByteStream,
}

impl HttpResponse {
    /// Returns whether the status code is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl StreamingResponse {
    /// Returns whether the status code is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Drain a body stream into a contiguous buffer.
///
/// Used for error bodies and for 2xx responses classified as buffered JSON.
pub async fn collect_body(mut body: ByteStream) -> CopilotResult<Vec<u8>> {
    let mut buffer = Vec::new();
    while let Some(chunk) = body.next().await {
        buffer.extend_from_slice(&chunk?);
    }
    Ok(buffer)
}

/// Map a body read failure into the transport error taxonomy
pub(crate) fn stream_read_error(err: reqwest::Error) -> CopilotError {
    CopilotError::Protocol {
        message: format!("Response body is not readable: {}", err),
    }
}
