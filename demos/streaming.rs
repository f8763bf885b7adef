//! Streaming chat example
//!
//! Iterates the reply as an async chunk sequence, printing answer fragments
//! as they arrive.
//!
//! ## Usage
//!
//! ```bash
//! export COPILOT_BASE_URL=https://api.example.com/copilot
//! export COPILOT_ACCESS_TOKEN=eyJ...
//! cargo run --example streaming
//! ```

use futures::StreamExt;
use integrations_copilot::create_session_from_env;
use secrecy::SecretString;
use std::io::{self, Write};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let session = create_session_from_env()?;
    session.set_access_token(SecretString::new(std::env::var("COPILOT_ACCESS_TOKEN")?));

    println!("Response:");
    println!("---");

    let mut stream = session
        .stream_message("Walk me through setting up MFA for an organization.")
        .await?;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if chunk.is_stream() {
            print!("{}", chunk.content);
            io::stdout().flush()?;
        } else {
            tracing::debug!(chunk_type = %chunk.chunk_type, "non-answer chunk");
        }
    }

    println!("\n---");
    println!("[Stream completed]");

    Ok(())
}
