//! Observability for the Copilot chat client.
//!
//! Instrumentation inside the crate goes through the `tracing` macros; this
//! module only provides the opt-in subscriber setup an embedding
//! application can use when it does not bring its own.
//!
//! ```rust,no_run
//! use integrations_copilot::observability::{LoggingConfig, LogFormat, LogLevel};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! LoggingConfig::new()
//!     .with_level(LogLevel::Debug)
//!     .with_format(LogFormat::Json)
//!     .init()?;
//! # Ok(())
//! # }
//! ```

mod logging;

pub use logging::{LogFormat, LogLevel, LoggingConfig};
