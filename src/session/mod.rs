//! Session facade over the chat service.
//!
//! One `CopilotSession` is constructed at application start and passed by
//! reference wherever the assistant is used; there is no hidden static
//! instance. The session owns the mutable pieces of state the rest of the
//! crate stays free of: the access token and the abort handle of the most
//! recently started request.

use crate::auth::{AuthManager, SharedTokenManager};
use crate::config::CopilotConfig;
use crate::errors::CopilotResult;
use crate::services::chat::{
    ChatReply, ChatRequest, ChatResponse, ChatService, ChatServiceImpl, ChatStream,
    ClearChatResponse, StreamChunk,
};
use crate::transport::{HttpTransport, ReqwestTransport};
use parking_lot::Mutex;
use secrecy::SecretString;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The abort handle of one started request
struct ActiveRequest {
    id: u64,
    token: CancellationToken,
}

/// Shared session for the Copilot assistant.
///
/// At most one request is *tracked* at a time: starting a new request
/// supersedes the previously tracked handle without cancelling it, so the
/// superseded request keeps running but can no longer be aborted through
/// [`CopilotSession::abort_current_request`]. Callers wanting single-flight
/// semantics should abort before sending again.
pub struct CopilotSession {
    config: Arc<CopilotConfig>,
    tokens: Arc<SharedTokenManager>,
    chat: Arc<dyn ChatService>,
    active: Mutex<Option<ActiveRequest>>,
    next_request_id: AtomicU64,
}

impl CopilotSession {
    /// Create a session from configuration, wiring the default transport
    pub fn new(config: CopilotConfig) -> CopilotResult<Self> {
        let config = Arc::new(config);
        let transport =
            Arc::new(ReqwestTransport::new(config.timeout)?) as Arc<dyn HttpTransport>;
        let tokens = Arc::new(SharedTokenManager::new());
        let chat = Arc::new(ChatServiceImpl::new(
            transport,
            tokens.clone() as Arc<dyn AuthManager>,
            config.base_url.clone(),
        )) as Arc<dyn ChatService>;

        Ok(Self {
            config,
            tokens,
            chat,
            active: Mutex::new(None),
            next_request_id: AtomicU64::new(0),
        })
    }

    /// Create a session with injected dependencies (for testing)
    #[cfg(test)]
    pub(crate) fn with_dependencies(
        config: CopilotConfig,
        tokens: Arc<SharedTokenManager>,
        chat: Arc<dyn ChatService>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            tokens,
            chat,
            active: Mutex::new(None),
            next_request_id: AtomicU64::new(0),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &CopilotConfig {
        &self.config
    }

    /// Store the access token obtained from the authentication layer
    pub fn set_access_token(&self, token: SecretString) {
        self.tokens.set_token(token);
    }

    /// Discard the access token (e.g. on logout)
    pub fn clear_access_token(&self) {
        self.tokens.clear_token();
    }

    /// Send a question and wait for the complete answer.
    ///
    /// A streaming reply is collected transparently; a buffered JSON reply
    /// is returned unchanged.
    pub async fn send_message(&self, question: &str) -> CopilotResult<ChatResponse> {
        self.send_message_with(question, |_| {}).await
    }

    /// Send a question, invoking `observer` for each contributing chunk of
    /// a streamed answer before returning the accumulated whole.
    pub async fn send_message_with<F>(
        &self,
        question: &str,
        observer: F,
    ) -> CopilotResult<ChatResponse>
    where
        F: FnMut(&StreamChunk),
    {
        let active = self.track_request();
        let cancel = active.token.clone();
        let id = active.id;

        let outcome = async {
            let reply = self.chat.send(ChatRequest::new(question), cancel).await?;
            match reply {
                ChatReply::Complete(response) => Ok(response),
                ChatReply::Stream(stream) => stream.collect_with(observer).await,
            }
        }
        .await;

        self.release_request(id);
        outcome
    }

    /// Send a question and return the reply as an async chunk sequence.
    ///
    /// A buffered JSON reply is adapted into a single-chunk stream so the
    /// caller sees one shape either way. The request stays tracked (and
    /// abortable) until it is superseded or aborted; consuming the stream
    /// does not untrack it, so [`CopilotSession::has_active_request`]
    /// keeps reporting `true` after a drained stream until the next
    /// request or an [`CopilotSession::abort_current_request`] call.
    pub async fn stream_message(&self, question: &str) -> CopilotResult<ChatStream> {
        let active = self.track_request();
        let cancel = active.token.clone();
        let id = active.id;

        match self.chat.send(ChatRequest::new(question), cancel).await {
            Ok(ChatReply::Stream(stream)) => Ok(stream),
            Ok(ChatReply::Complete(response)) => {
                self.release_request(id);
                Ok(ChatStream::from_answer(response.answer))
            }
            Err(error) => {
                self.release_request(id);
                Err(error)
            }
        }
    }

    /// Clear the conversation history
    pub async fn clear_chat(&self) -> CopilotResult<ClearChatResponse> {
        let active = self.track_request();
        let cancel = active.token.clone();
        let id = active.id;

        let outcome = self.chat.clear(cancel).await;
        self.release_request(id);
        outcome
    }

    /// Abort the most recently tracked request.
    ///
    /// Idempotent: a call with no tracked request is a no-op. Requests
    /// superseded by a newer one are not reachable from here.
    pub fn abort_current_request(&self) {
        if let Some(active) = self.active.lock().take() {
            tracing::debug!(request = active.id, "aborting in-flight request");
            active.token.cancel();
        }
    }

    /// Returns whether a request handle is currently tracked.
    ///
    /// This is a liveness approximation: the underlying network call may
    /// already have completed.
    pub fn has_active_request(&self) -> bool {
        self.active.lock().is_some()
    }

    fn track_request(&self) -> ActiveRequest {
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        *self.active.lock() = Some(ActiveRequest {
            id,
            token: token.clone(),
        });
        ActiveRequest { id, token }
    }

    /// Untrack a settled request, unless a newer one already took the slot
    fn release_request(&self, id: u64) {
        let mut active = self.active.lock();
        if active.as_ref().map(|a| a.id) == Some(id) {
            *active = None;
        }
    }
}

/// Create a session from configuration
pub fn create_session(config: CopilotConfig) -> CopilotResult<CopilotSession> {
    CopilotSession::new(config)
}

/// Create a session from environment variables
pub fn create_session_from_env() -> CopilotResult<CopilotSession> {
    let config = CopilotConfig::from_env()?;
    create_session(config)
}
