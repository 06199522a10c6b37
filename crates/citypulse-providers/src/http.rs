//! Request plumbing shared by every provider client.

use std::time::Duration;

use citypulse_core::{HttpConfig, NetworkError, Provider, ProviderError, ReqwestErrorExt};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// Longest provider error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

/// Build the HTTP client shared by all providers.
pub fn build_client(config: &HttpConfig) -> Result<Client, NetworkError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(ReqwestErrorExt::into_network_error)
}

/// Return the configured key or a configuration error naming the provider.
pub(crate) fn require_key(provider: Provider, key: Option<&str>) -> Result<&str, ProviderError> {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(ProviderError::MissingApiKey { provider })
}

/// Normalise a configured base URL so paths can be appended with `/`.
pub(crate) fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Send a request, mapping transport failures and non-success statuses.
///
/// `subject` names what the request looks up and is reported on a 404.
pub(crate) async fn send(
    provider: Provider,
    subject: &str,
    request: RequestBuilder,
) -> Result<Response, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| e.into_provider_error(provider))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!("{} provider returned {}", provider, status);
    Err(ProviderError::from_status(
        provider,
        status.as_u16(),
        subject,
        error_detail(&body),
    ))
}

/// Send a request and decode a JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: Provider,
    subject: &str,
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = send(provider, subject, request).await?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| e.into_provider_error(provider))?;

    serde_json::from_slice(&bytes).map_err(|e| {
        ProviderError::invalid_response(provider, format!("JSON parse error: {}", e))
    })
}

/// Pull a readable message out of a provider error body.
///
/// Providers disagree on the shape: `message`, `error_message`, `errors: [..]`
/// and `fault.faultstring` are all in use.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let candidates = [
            value.get("message"),
            value.get("error_message"),
            value.pointer("/errors/0"),
            value.pointer("/fault/faultstring"),
            value.pointer("/error/message"),
        ];
        if let Some(text) = candidates.into_iter().flatten().find_map(|v| v.as_str()) {
            return text.to_string();
        }
    }

    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
