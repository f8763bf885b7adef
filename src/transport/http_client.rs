//! Reqwest-based transport implementation.

use super::{stream_read_error, ByteStream, HttpResponse, HttpTransport, StreamingResponse};
use crate::errors::{CopilotError, CopilotResult};
use async_trait::async_trait;
use futures::StreamExt;
use http::{HeaderMap, Method};
use reqwest::Client;
use std::time::Duration;

/// Reqwest-based HTTP transport
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new transport with the given total request timeout
    pub fn new(timeout: Duration) -> CopilotResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(20)
            .build()
            .map_err(|e| CopilotError::Configuration {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    fn build_request(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body_data) = body {
            request = request.body(body_data);
        }
        request
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        method: Method,
        url: String,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> CopilotResult<HttpResponse> {
        let response = self
            .build_request(method, &url, headers, body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let response_headers = response.headers().clone();
        let body = response.bytes().await?;

        tracing::debug!(status, url = %url, bytes = body.len(), "buffered response received");

        Ok(HttpResponse {
            status,
            headers: response_headers,
            body: body.to_vec(),
        })
    }

    async fn execute_stream(
        &self,
        method: Method,
        url: String,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> CopilotResult<StreamingResponse> {
        let response = self
            .build_request(method, &url, headers, body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let response_headers = response.headers().clone();

        tracing::debug!(status, url = %url, "response headers received, body streaming");

        let stream: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|result| result.map_err(stream_read_error)),
        );

        Ok(StreamingResponse {
            status,
            headers: response_headers,
            body: stream,
        })
    }
}
