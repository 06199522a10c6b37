//! `ProviderAdapter` implementations over the provider clients.

use async_trait::async_trait;
use citypulse_core::{Provider, ProviderError};
use citypulse_providers::{
    AirQualitySample, Event, EventsClient, NewsArticle, NewsClient, OpenWeatherClient,
    PlacesClient, PointOfInterest, WeatherSnapshot,
};

use crate::section::{ProviderAdapter, SectionQuery};

pub struct WeatherAdapter {
    client: OpenWeatherClient,
}

impl WeatherAdapter {
    pub fn new(client: OpenWeatherClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProviderAdapter for WeatherAdapter {
    type Item = WeatherSnapshot;

    fn provider(&self) -> Provider {
        Provider::Weather
    }

    async fn fetch(&self, query: &SectionQuery) -> Result<Vec<WeatherSnapshot>, ProviderError> {
        let snapshot = self.client.current_weather(&query.city).await?;
        Ok(vec![snapshot])
    }
}

/// Geocodes the city, then fetches pollution at its coordinates.
pub struct AirQualityAdapter {
    client: OpenWeatherClient,
}

impl AirQualityAdapter {
    pub fn new(client: OpenWeatherClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProviderAdapter for AirQualityAdapter {
    type Item = AirQualitySample;

    fn provider(&self) -> Provider {
        Provider::AirQuality
    }

    async fn fetch(&self, query: &SectionQuery) -> Result<Vec<AirQualitySample>, ProviderError> {
        let (location, samples) = self.client.air_quality_for_city(&query.city).await?;
        tracing::debug!(
            "{} resolved to {:.4},{:.4}",
            query.city,
            location.coordinates.latitude,
            location.coordinates.longitude
        );
        Ok(samples)
    }
}

/// Places of the query's category around the city.
pub struct PlacesAdapter {
    client: PlacesClient,
}

impl PlacesAdapter {
    pub fn new(client: PlacesClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProviderAdapter for PlacesAdapter {
    type Item = PointOfInterest;

    fn provider(&self) -> Provider {
        Provider::Places
    }

    async fn fetch(&self, query: &SectionQuery) -> Result<Vec<PointOfInterest>, ProviderError> {
        self.client.search_city(&query.city, query.category).await
    }
}

/// First page of upcoming events in the city.
pub struct EventsAdapter {
    client: EventsClient,
}

impl EventsAdapter {
    pub fn new(client: EventsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProviderAdapter for EventsAdapter {
    type Item = Event;

    fn provider(&self) -> Provider {
        Provider::Events
    }

    async fn fetch(&self, query: &SectionQuery) -> Result<Vec<Event>, ProviderError> {
        let page = self.client.search(&query.city, 0).await?;
        Ok(page.events)
    }
}

pub struct NewsAdapter {
    client: NewsClient,
}

impl NewsAdapter {
    pub fn new(client: NewsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProviderAdapter for NewsAdapter {
    type Item = NewsArticle;

    fn provider(&self) -> Provider {
        Provider::News
    }

    async fn fetch(&self, query: &SectionQuery) -> Result<Vec<NewsArticle>, ProviderError> {
        self.client.search(&query.city).await
    }
}
