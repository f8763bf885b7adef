//! Request validation for the chat endpoints.

use crate::errors::{CopilotError, CopilotResult};

/// Reject questions that are empty after trimming.
pub fn validate_question(question: &str) -> CopilotResult<()> {
    if question.trim().is_empty() {
        return Err(CopilotError::Validation {
            message: "Question must not be empty".to_string(),
        });
    }
    Ok(())
}
