pub mod app;
pub mod config;
pub mod error;
pub mod names;
pub mod recency;
pub mod storage;

pub use app::App;
pub use config::{
    Config, DashboardConfig, HttpConfig, NewsSource, PlaceCategory, ProviderSettings,
    ProvidersConfig, ValidationResult,
};
pub use error::{
    AppError, ConfigError, DatabaseError, NetworkError, Provider, ProviderError, ReqwestErrorExt,
};
pub use recency::RecencyList;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};

use anyhow::Result;

/// Initialize logging
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("CityPulse core initialized");
    Ok(())
}
