//! # Copilot Chat API Client
//!
//! Production-ready Rust client for the Copilot assistant chat backend.
//!
//! ## Features
//!
//! - Streaming answers decoded incrementally from newline-delimited JSON
//! - Cooperative cancellation of the in-flight request via an abort handle
//! - Per-request correlation headers (`x-request-id`, `correlation-id`)
//! - Mutable bearer-token session shared across the process by reference
//! - Normalized error taxonomy (validation, authentication, API, network,
//!   cancellation, protocol)
//! - Structured logging via `tracing`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_copilot::{create_session, CopilotConfig};
//! use secrecy::SecretString;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CopilotConfig::builder()
//!         .base_url("https://api.example.com/copilot")
//!         .build()?;
//!
//!     let session = create_session(config)?;
//!     session.set_access_token(SecretString::new("<token>".to_string()));
//!
//!     let reply = session.send_message("How do I register an application?").await?;
//!     println!("{}", reply.answer);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `session` - Shared session facade: token state, abort handle, operations
//! - `services::chat` - Chat endpoints, stream decoder, wire types
//! - `config` - Configuration types and builder
//! - `auth` - Token store and per-request header construction
//! - `transport` - HTTP transport layer
//! - `errors` - Error types and taxonomy
//! - `observability` - Logging setup

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod auth;
pub mod config;
pub mod errors;
pub mod observability;
pub mod services;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use auth::{AuthManager, SharedTokenManager};
pub use config::{CopilotConfig, CopilotConfigBuilder};
pub use errors::{CopilotError, CopilotResult};
pub use observability::{LogFormat, LogLevel, LoggingConfig};
pub use session::{create_session, create_session_from_env, CopilotSession};
pub use transport::{HttpTransport, ReqwestTransport};

// Service re-exports
pub use services::chat::{
    ChatReply, ChatRequest, ChatResponse, ChatService, ChatServiceImpl, ChatStream,
    ClearChatResponse, StreamChunk,
};

/// The default request timeout (5 minutes; streamed answers can be slow)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
