//! HTTP clients for the providers behind the CityPulse dashboard.

pub mod events;
pub mod http;
pub mod news;
pub mod openweather;
pub mod places;
pub mod types;

pub use events::EventsClient;
pub use news::{GNewsClient, NewsApiClient, NewsClient};
pub use openweather::OpenWeatherClient;
pub use places::{PlacesClient, DEFAULT_PHOTO_WIDTH};
pub use types::*;

use citypulse_core::{Config, NetworkError};

/// Every provider client, configured from one `Config` and sharing one HTTP client.
#[derive(Debug, Clone)]
pub struct Providers {
    pub openweather: OpenWeatherClient,
    pub places: PlacesClient,
    pub events: EventsClient,
    pub news: NewsClient,
}

impl Providers {
    pub fn from_config(config: &Config) -> Result<Self, NetworkError> {
        let client = http::build_client(&config.http)?;
        Ok(Self {
            openweather: OpenWeatherClient::from_config(client.clone(), config),
            places: PlacesClient::from_config(client.clone(), config),
            events: EventsClient::from_config(client.clone(), config),
            news: NewsClient::from_config(client, config),
        })
    }
}
