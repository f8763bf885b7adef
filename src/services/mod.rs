//! Service layer for the Copilot backend endpoints.

pub mod chat;
