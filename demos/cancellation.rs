//! Cancellation example
//!
//! Starts a request and aborts it shortly after, demonstrating the
//! distinguished cancellation error.
//!
//! ## Usage
//!
//! ```bash
//! export COPILOT_BASE_URL=https://api.example.com/copilot
//! export COPILOT_ACCESS_TOKEN=eyJ...
//! cargo run --example cancellation
//! ```

use integrations_copilot::create_session_from_env;
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let session = Arc::new(create_session_from_env()?);
    session.set_access_token(SecretString::new(std::env::var("COPILOT_ACCESS_TOKEN")?));

    let worker = {
        let session = session.clone();
        tokio::spawn(async move {
            session
                .send_message("Write a very long explanation of SCIM provisioning.")
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;

    if session.has_active_request() {
        println!("Aborting the in-flight request...");
        session.abort_current_request();
    }

    match worker.await? {
        Ok(reply) => println!("Completed before the abort: {}", reply.answer),
        Err(error) if error.is_cancelled() => println!("Request was cancelled as expected"),
        Err(error) => return Err(error.into()),
    }

    Ok(())
}
