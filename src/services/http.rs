// src/services/http.rs
use std::time::Duration;

use reqwest::Client;

use super::Result;

/// Default per-request timeout for provider calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Shared client for every provider adapter. Yahoo rejects requests without a
/// browser-looking user agent.
pub fn build_client() -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}
