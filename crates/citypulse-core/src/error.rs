//! Centralized error types for CityPulse.
//!
//! Every failure a dashboard section can hit is expressed here so the
//! presentation layer can tell a configuration problem from a provider
//! rejection and show a message without inspecting strings.

use std::fmt;

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a message suitable for display.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "Please enter a city name.",
            AppError::Database(e) => e.user_message(),
            AppError::Provider(e) => e.user_message(),
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Local storage errors (SQLite key-value table).
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Data corruption detected: {0}")]
    Corruption(String),
}

impl DatabaseError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DatabaseError::ConnectionFailed(_) => {
                "Unable to access local data. Try restarting the app."
            }
            DatabaseError::QueryFailed(_) => "A data operation failed. Please try again.",
            DatabaseError::Corruption(_) => {
                "Local data may be corrupted. Consider resetting app data."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

/// The external services the dashboard talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Weather,
    AirQuality,
    Places,
    Events,
    News,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Weather => "weather",
            Provider::AirQuality => "air quality",
            Provider::Places => "places",
            Provider::Events => "events",
            Provider::News => "news",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while talking to a third-party provider.
///
/// Every variant carries the provider so a failure can be attributed to
/// exactly one dashboard section.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: Provider },

    #[error("{provider} provider rejected the API key")]
    Unauthorized { provider: Provider },

    #[error("{provider} provider rate limit exceeded")]
    RateLimited { provider: Provider },

    #[error("{provider} provider found nothing for {what}")]
    NotFound { provider: Provider, what: String },

    #[error("{provider} provider error: {status} - {message}")]
    Rejected {
        provider: Provider,
        status: u16,
        message: String,
    },

    #[error("{provider} provider returned an invalid response: {message}")]
    InvalidResponse { provider: Provider, message: String },

    #[error("{provider} provider unreachable: {source}")]
    Network {
        provider: Provider,
        #[source]
        source: NetworkError,
    },
}

impl ProviderError {
    /// Map a non-success HTTP status to the matching variant.
    ///
    /// `subject` is what was looked up (a city, a search term); a 404 reports
    /// it instead of the response body.
    pub fn from_status(
        provider: Provider,
        status: u16,
        subject: &str,
        body: impl Into<String>,
    ) -> Self {
        match status {
            401 | 403 => ProviderError::Unauthorized { provider },
            429 => ProviderError::RateLimited { provider },
            404 => ProviderError::NotFound {
                provider,
                what: subject.to_string(),
            },
            _ => ProviderError::Rejected {
                provider,
                status,
                message: body.into(),
            },
        }
    }

    pub fn invalid_response(provider: Provider, message: impl Into<String>) -> Self {
        ProviderError::InvalidResponse {
            provider,
            message: message.into(),
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            ProviderError::MissingApiKey { provider }
            | ProviderError::Unauthorized { provider }
            | ProviderError::RateLimited { provider }
            | ProviderError::NotFound { provider, .. }
            | ProviderError::Rejected { provider, .. }
            | ProviderError::InvalidResponse { provider, .. }
            | ProviderError::Network { provider, .. } => *provider,
        }
    }

    /// True when the failure comes from local setup rather than the provider.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, ProviderError::MissingApiKey { .. })
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ProviderError::MissingApiKey { provider } => match provider {
                Provider::Weather | Provider::AirQuality => {
                    "OpenWeather API key is not configured. Check your settings."
                }
                Provider::Places => "Google Places API key is not configured. Check your settings.",
                Provider::Events => "Ticketmaster API key is not configured. Check your settings.",
                Provider::News => "News API key is not configured. Check your settings.",
            },
            ProviderError::Unauthorized { .. } => "The provider rejected the API key. Check your settings.",
            ProviderError::RateLimited { .. } => "Too many requests. Please wait and try again.",
            ProviderError::NotFound { provider, .. } => match provider {
                Provider::Weather => "City not found. Check the spelling and try again.",
                Provider::AirQuality | Provider::Places => "Could not locate that city.",
                Provider::Events | Provider::News => "Nothing was found for that city.",
            },
            ProviderError::Rejected { status, .. } if *status >= 500 => {
                "The provider is experiencing issues. Please try again later."
            }
            ProviderError::Rejected { .. } => "The provider could not complete the request.",
            ProviderError::InvalidResponse { .. } => {
                "Received an unexpected response. Please try again."
            }
            ProviderError::Network { source, .. } => source.user_message(),
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;

    fn into_provider_error(self, provider: Provider) -> ProviderError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }

    fn into_provider_error(self, provider: Provider) -> ProviderError {
        // Request URLs carry API keys in the query string.
        let err = self.without_url();
        if err.is_decode() {
            return ProviderError::invalid_response(provider, err.to_string());
        }
        ProviderError::Network {
            provider,
            source: err.into_network_error(),
        }
    }
}

/// Extension trait for converting rusqlite errors to our error types.
pub trait RusqliteErrorExt {
    fn into_database_error(self) -> DatabaseError;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_database_error(self) -> DatabaseError {
        match &self {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("corrupt") => {
                DatabaseError::Corruption(self.to_string())
            }
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::CannotOpen =>
            {
                DatabaseError::ConnectionFailed(self.to_string())
            }
            _ => DatabaseError::QueryFailed(self.to_string()),
        }
    }
}
