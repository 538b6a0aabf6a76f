use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use common::{Error, ProviderError, Result};

const USER_AGENT: &str = concat!("tapewatch/", env!("CARGO_PKG_VERSION"));

/// Longest error body echoed back into a `ProviderError`.
const MAX_ERROR_BODY: usize = 200;

/// Shared HTTP client for every provider adapter.
///
/// Per-request deadlines are enforced by the resolver, so only the connect
/// phase is bounded here.
pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .use_rustls_tls()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| Error::Http(e.to_string()))
}

/// GET `url` with query parameters and return the body of a 2xx response.
pub(crate) async fn get_text(
    http: &Client,
    url: &str,
    query: &[(&str, String)],
) -> std::result::Result<String, ProviderError> {
    debug!(%url, ?query, "Provider request");

    let resp = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

    if !status.is_success() {
        return Err(ProviderError::Unavailable(format!(
            "HTTP {status}: {}",
            truncate(&body, MAX_ERROR_BODY)
        )));
    }
    Ok(body)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
