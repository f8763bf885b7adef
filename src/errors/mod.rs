//! Error types and taxonomy for the Copilot chat client.

mod error;

pub use error::{CopilotError, CopilotResult};
