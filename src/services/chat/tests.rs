//! Tests for the chat service.
//!
//! The transport and auth manager are mocked so every test asserts on the
//! exact requests the service builds and the classification it applies.

use super::*;
use crate::auth::{AuthManager, SharedTokenManager, CORRELATION_ID_HEADER, REQUEST_ID_HEADER};
use crate::errors::{CopilotError, CopilotResult};
use crate::transport::{ByteStream, HttpResponse, HttpTransport, StreamingResponse};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use http::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use secrecy::SecretString;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use url::Url;

// ============================================================================
// Mock Implementations
// ============================================================================

#[derive(Clone)]
struct RecordedRequest {
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

struct QueuedStream {
    status: u16,
    content_type: &'static str,
    fragments: Vec<String>,
}

/// Mock HTTP transport recording every request it sees
struct MockHttpTransport {
    responses: Mutex<VecDeque<CopilotResult<HttpResponse>>>,
    stream_responses: Mutex<VecDeque<QueuedStream>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttpTransport {
    fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            stream_responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn with_response(self, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            headers: HeaderMap::new(),
            body: body.as_bytes().to_vec(),
        }));
        self
    }

    fn with_stream_response(
        self,
        status: u16,
        content_type: &'static str,
        fragments: Vec<&str>,
    ) -> Self {
        self.stream_responses.lock().unwrap().push_back(QueuedStream {
            status,
            content_type,
            fragments: fragments.into_iter().map(String::from).collect(),
        });
        self
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn execute(
        &self,
        method: Method,
        url: String,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> CopilotResult<HttpResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url,
            headers,
            body,
        });

        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(CopilotError::Internal {
                message: "No mock response configured".to_string(),
            })
        })
    }

    async fn execute_stream(
        &self,
        method: Method,
        url: String,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> CopilotResult<StreamingResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url,
            headers,
            body,
        });

        let queued = self
            .stream_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(QueuedStream {
                status: 200,
                content_type: "text/plain",
                fragments: Vec::new(),
            });

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(queued.content_type));

        let items: Vec<CopilotResult<Bytes>> = queued
            .fragments
            .into_iter()
            .map(|s| Ok(Bytes::from(s)))
            .collect();
        let body: ByteStream = Box::pin(stream::iter(items));

        Ok(StreamingResponse {
            status: queued.status,
            headers,
            body,
        })
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn authed_tokens() -> Arc<SharedTokenManager> {
    let tokens = Arc::new(SharedTokenManager::new());
    tokens.set_token(SecretString::new("tok-test".to_string()));
    tokens
}

fn create_service(
    transport: Arc<dyn HttpTransport>,
    auth_manager: Arc<dyn AuthManager>,
) -> ChatServiceImpl {
    let base_url = Url::parse("https://api.example.com/t/acme/copilot").unwrap();
    ChatServiceImpl::new(transport, auth_manager, base_url)
}

// ============================================================================
// Tests: send
// ============================================================================

#[tokio::test]
async fn test_send_buffered_json_reply_is_returned_unchanged() {
    let transport = Arc::new(MockHttpTransport::new().with_stream_response(
        200,
        "application/json",
        vec![r#"{"answer":"hi"}"#],
    ));
    let service = create_service(transport.clone(), authed_tokens());

    let reply = service
        .send(ChatRequest::new("hello"), CancellationToken::new())
        .await
        .unwrap();

    match reply {
        ChatReply::Complete(response) => {
            assert_eq!(response.answer, "hi");
            assert_eq!(response.conversation_id, None);
        }
        ChatReply::Stream(_) => panic!("expected a buffered reply"),
    }

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert!(requests[0].url.ends_with("/t/acme/copilot/chat"));
    assert_eq!(
        requests[0].body.as_deref(),
        Some(br#"{"question":"hello"}"#.as_slice())
    );
}

#[tokio::test]
async fn test_send_streaming_reply_accumulates_and_observes() {
    let transport = Arc::new(MockHttpTransport::new().with_stream_response(
        200,
        "text/plain",
        vec![
            "{\"type\":\"STREAM\",\"content\":\"A\"}\n",
            "{\"type\":\"STREAM\",\"content\":\"B\"}\n",
            "{\"type\":\"OTHER\",\"content\":\"ignored\"}\n",
        ],
    ));
    let service = create_service(transport, authed_tokens());

    let reply = service
        .send(ChatRequest::new("hello"), CancellationToken::new())
        .await
        .unwrap();

    let stream = match reply {
        ChatReply::Stream(stream) => stream,
        ChatReply::Complete(_) => panic!("expected a streaming reply"),
    };

    let mut observed = Vec::new();
    let response = stream
        .collect_with(|chunk| observed.push(chunk.content.clone()))
        .await
        .unwrap();

    assert_eq!(response.answer, "AB");
    assert_eq!(observed, vec!["A".to_string(), "B".to_string()]);
}

#[tokio::test]
async fn test_send_classifies_event_stream_content_type_as_streaming() {
    let transport = Arc::new(MockHttpTransport::new().with_stream_response(
        200,
        "text/event-stream",
        vec!["{\"type\":\"STREAM\",\"content\":\"A\"}\n"],
    ));
    let service = create_service(transport, authed_tokens());

    let reply = service
        .send(ChatRequest::new("hello"), CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(reply, ChatReply::Stream(_)));
}

#[tokio::test]
async fn test_send_trims_question_before_transmission() {
    let transport = Arc::new(MockHttpTransport::new().with_stream_response(
        200,
        "application/json",
        vec![r#"{"answer":"hi"}"#],
    ));
    let service = create_service(transport.clone(), authed_tokens());

    service
        .send(ChatRequest {
            question: "  padded question  ".to_string(),
        }, CancellationToken::new())
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(
        requests[0].body.as_deref(),
        Some(br#"{"question":"padded question"}"#.as_slice())
    );
}

#[tokio::test]
async fn test_send_attaches_fresh_correlation_headers_per_request() {
    let transport = Arc::new(
        MockHttpTransport::new()
            .with_stream_response(200, "application/json", vec![r#"{"answer":"1"}"#])
            .with_stream_response(200, "application/json", vec![r#"{"answer":"2"}"#]),
    );
    let service = create_service(transport.clone(), authed_tokens());

    service
        .send(ChatRequest::new("first"), CancellationToken::new())
        .await
        .unwrap();
    service
        .send(ChatRequest::new("second"), CancellationToken::new())
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);

    for request in &requests {
        assert!(!request
            .headers
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .is_empty());
        assert!(request
            .headers
            .get(CORRELATION_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("corr-"));
        assert_eq!(
            request.headers.get(AUTHORIZATION).unwrap(),
            "Bearer tok-test"
        );
    }

    assert_ne!(
        requests[0].headers.get(REQUEST_ID_HEADER),
        requests[1].headers.get(REQUEST_ID_HEADER),
    );
}

#[tokio::test]
async fn test_send_rejects_blank_question_without_network_call() {
    let transport = Arc::new(MockHttpTransport::new());
    let service = create_service(transport.clone(), authed_tokens());

    let result = service
        .send(ChatRequest::new("   "), CancellationToken::new())
        .await;

    assert!(matches!(result, Err(CopilotError::Validation { .. })));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_send_requires_access_token() {
    let transport = Arc::new(MockHttpTransport::new());
    let service = create_service(transport.clone(), Arc::new(SharedTokenManager::new()));

    let result = service
        .send(ChatRequest::new("hello"), CancellationToken::new())
        .await;

    assert!(matches!(result, Err(CopilotError::Authentication { .. })));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_send_api_error_uses_detail_field() {
    let transport = Arc::new(MockHttpTransport::new().with_stream_response(
        500,
        "application/json",
        vec![r#"{"detail":"boom"}"#],
    ));
    let service = create_service(transport, authed_tokens());

    let error = service
        .send(ChatRequest::new("hello"), CancellationToken::new())
        .await
        .unwrap_err();

    match &error {
        CopilotError::Api { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected API error, got: {:?}", other),
    }
    assert!(error.to_string().contains("boom"));
}

#[tokio::test]
async fn test_send_api_error_falls_back_on_unparseable_body() {
    let transport = Arc::new(MockHttpTransport::new().with_stream_response(
        500,
        "text/html",
        vec!["<html>Internal Server Error</html>"],
    ));
    let service = create_service(transport, authed_tokens());

    let error = service
        .send(ChatRequest::new("hello"), CancellationToken::new())
        .await
        .unwrap_err();

    let rendered = error.to_string();
    assert!(rendered.contains("HTTP 500"));
    assert!(rendered.contains("Failed to send message"));
}

#[tokio::test]
async fn test_send_api_error_uses_message_field_when_no_detail() {
    let transport = Arc::new(MockHttpTransport::new().with_stream_response(
        403,
        "application/json",
        vec![r#"{"message":"forbidden for this org"}"#],
    ));
    let service = create_service(transport, authed_tokens());

    let error = service
        .send(ChatRequest::new("hello"), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(error.to_string().contains("forbidden for this org"));
}

#[tokio::test]
async fn test_send_invalid_json_reply_is_a_protocol_error() {
    let transport = Arc::new(MockHttpTransport::new().with_stream_response(
        200,
        "application/json",
        vec!["not json at all"],
    ));
    let service = create_service(transport, authed_tokens());

    let result = service
        .send(ChatRequest::new("hello"), CancellationToken::new())
        .await;

    assert!(matches!(result, Err(CopilotError::Protocol { .. })));
}

#[tokio::test]
async fn test_send_with_cancelled_token_rejects_immediately() {
    let transport = Arc::new(MockHttpTransport::new().with_stream_response(
        200,
        "application/json",
        vec![r#"{"answer":"hi"}"#],
    ));
    let service = create_service(transport, authed_tokens());

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = service.send(ChatRequest::new("hello"), cancel).await;
    assert!(matches!(result, Err(CopilotError::Cancelled)));
}

// ============================================================================
// Tests: clear
// ============================================================================

#[tokio::test]
async fn test_clear_success() {
    let transport = Arc::new(
        MockHttpTransport::new().with_response(200, r#"{"success":true,"message":"cleared"}"#),
    );
    let service = create_service(transport.clone(), authed_tokens());

    let response = service.clear(CancellationToken::new()).await.unwrap();
    assert!(response.success);
    assert_eq!(response.message.as_deref(), Some("cleared"));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert!(requests[0].url.ends_with("/t/acme/copilot/clear"));
    assert!(requests[0].body.is_none());
}

#[tokio::test]
async fn test_clear_requires_access_token() {
    let transport = Arc::new(MockHttpTransport::new());
    let service = create_service(transport.clone(), Arc::new(SharedTokenManager::new()));

    let result = service.clear(CancellationToken::new()).await;

    assert!(matches!(result, Err(CopilotError::Authentication { .. })));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_clear_non_object_body_is_a_protocol_error() {
    let transport = Arc::new(MockHttpTransport::new().with_response(200, r#"[1,2,3]"#));
    let service = create_service(transport, authed_tokens());

    let result = service.clear(CancellationToken::new()).await;
    assert!(matches!(result, Err(CopilotError::Protocol { .. })));
}

#[tokio::test]
async fn test_clear_invalid_json_body_is_a_protocol_error() {
    let transport = Arc::new(MockHttpTransport::new().with_response(200, "nope"));
    let service = create_service(transport, authed_tokens());

    let result = service.clear(CancellationToken::new()).await;
    assert!(matches!(result, Err(CopilotError::Protocol { .. })));
}

#[tokio::test]
async fn test_clear_empty_object_defaults_to_unsuccessful() {
    let transport = Arc::new(MockHttpTransport::new().with_response(200, "{}"));
    let service = create_service(transport, authed_tokens());

    let response = service.clear(CancellationToken::new()).await.unwrap();
    assert!(!response.success);
}

#[tokio::test]
async fn test_clear_api_error() {
    let transport =
        Arc::new(MockHttpTransport::new().with_response(503, r#"{"detail":"maintenance"}"#));
    let service = create_service(transport, authed_tokens());

    let error = service.clear(CancellationToken::new()).await.unwrap_err();
    match error {
        CopilotError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("expected API error, got: {:?}", other),
    }
}
