//! Basic chat example
//!
//! Sends a single question and prints the complete answer, collecting a
//! streamed reply transparently.
//!
//! ## Usage
//!
//! ```bash
//! export COPILOT_BASE_URL=https://api.example.com/copilot
//! export COPILOT_ACCESS_TOKEN=eyJ...
//! cargo run --example basic_chat
//! ```

use integrations_copilot::create_session_from_env;
use secrecy::SecretString;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let session = create_session_from_env()?;
    session.set_access_token(SecretString::new(std::env::var("COPILOT_ACCESS_TOKEN")?));

    println!("Asking the assistant...\n");

    let reply = session
        .send_message("How do I configure a social login connection?")
        .await?;

    println!("{}", reply.answer);

    if let Some(conversation_id) = reply.conversation_id {
        println!("\nConversation ID: {}", conversation_id);
    }

    Ok(())
}
