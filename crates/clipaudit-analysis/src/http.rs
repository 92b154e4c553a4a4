use std::time::Duration;

use reqwest::Client;

const USER_AGENT: &str = "clipaudit/0.1 (media-analysis)";

/// Build the shared HTTP client used by every capability provider.
///
/// # Errors
///
/// Returns [`reqwest::Error`] if the client cannot be constructed.
pub fn build_http_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(USER_AGENT)
        .build()
}

/// Strip trailing slashes so endpoint paths can be appended with `/`.
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
