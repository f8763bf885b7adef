//! Chat service: sending questions, decoding streamed answers, clearing
//! conversation history.

mod service;
mod stream;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use service::{ChatService, ChatServiceImpl};
pub use stream::ChatStream;
pub use types::{
    ChatReply, ChatRequest, ChatResponse, ClearChatResponse, StreamChunk, STREAM_CHUNK_TYPE,
};
pub use validation::validate_question;
