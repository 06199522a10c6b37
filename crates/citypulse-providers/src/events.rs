//! Ticketmaster Discovery client.

use chrono::{NaiveDate, NaiveTime};
use citypulse_core::{Config, Provider, ProviderError};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::http::{require_key, send_json, trim_base};
use crate::types::{Event, EventImage, EventPage, PriceRange, Venue};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "_embedded")]
    embedded: Option<EmbeddedEvents>,
    page: Option<PageBlock>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedEvents {
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageBlock {
    #[serde(default)]
    total_elements: u64,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    number: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    id: String,
    name: String,
    url: Option<String>,
    #[serde(default)]
    images: Vec<RawImage>,
    dates: Option<RawDates>,
    #[serde(default)]
    classifications: Vec<RawClassification>,
    #[serde(default)]
    price_ranges: Vec<RawPriceRange>,
    #[serde(rename = "_embedded")]
    embedded: Option<EmbeddedVenues>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    url: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    ratio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDates {
    start: Option<RawStart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStart {
    local_date: Option<String>,
    local_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(default)]
    primary: bool,
    genre: Option<NamedRef>,
    segment: Option<NamedRef>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawPriceRange {
    currency: Option<String>,
    min: Option<f64>,
    max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedVenues {
    #[serde(default)]
    venues: Vec<RawVenue>,
}

#[derive(Debug, Deserialize)]
struct RawVenue {
    name: Option<String>,
    city: Option<NamedRef>,
    address: Option<RawAddress>,
}

#[derive(Debug, Deserialize)]
struct RawAddress {
    line1: Option<String>,
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        let start = raw.dates.and_then(|d| d.start);
        let start_date = start
            .as_ref()
            .and_then(|s| s.local_date.as_deref())
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        let start_time = start
            .as_ref()
            .and_then(|s| s.local_time.as_deref())
            .and_then(|t| {
                NaiveTime::parse_from_str(t, "%H:%M:%S")
                    .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
                    .ok()
            });

        // Prefer the primary classification; genre "Undefined" carries no information.
        let genre = raw
            .classifications
            .iter()
            .find(|c| c.primary)
            .or_else(|| raw.classifications.first())
            .and_then(|c| c.genre.as_ref().or(c.segment.as_ref()))
            .map(|g| g.name.clone())
            .filter(|name| name != "Undefined");

        let price = raw.price_ranges.into_iter().find_map(|p| match (p.min, p.max) {
            (Some(min), Some(max)) => Some(PriceRange {
                currency: p.currency.unwrap_or_else(|| "EUR".to_string()),
                min,
                max,
            }),
            (Some(only), None) | (None, Some(only)) => Some(PriceRange {
                currency: p.currency.unwrap_or_else(|| "EUR".to_string()),
                min: only,
                max: only,
            }),
            (None, None) => None,
        });

        let venue = raw
            .embedded
            .and_then(|e| e.venues.into_iter().next())
            .and_then(|v| {
                Some(Venue {
                    name: v.name?,
                    city: v.city.map(|c| c.name),
                    address: v.address.and_then(|a| a.line1),
                })
            });

        Event {
            id: raw.id,
            name: raw.name,
            url: raw.url,
            start_date,
            start_time,
            venue,
            price,
            images: raw
                .images
                .into_iter()
                .map(|i| EventImage {
                    url: i.url,
                    width: i.width,
                    height: i.height,
                    ratio: i.ratio,
                })
                .collect(),
            genre,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    country_code: String,
    locale: String,
    page_size: u32,
}

impl EventsClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            api_key,
            country_code: "ES".to_string(),
            locale: "es-ES".to_string(),
            page_size: 10,
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        let settings = &config.providers.ticketmaster;
        let mut events = Self::with_client(client, &settings.base_url, settings.api_key.clone());
        events.country_code = config.dashboard.country_code.clone();
        events.locale = config.dashboard.events_locale.clone();
        events.page_size = config.dashboard.events_page_size;
        events
    }

    /// Upcoming events in a city, soonest first.
    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, city: &str, page: u32) -> Result<EventPage, ProviderError> {
        let key = require_key(Provider::Events, self.api_key.as_deref())?;
        let request = self
            .client
            .get(format!("{}/events.json", self.base_url))
            .query(&[
                ("apikey", key.to_string()),
                ("city", city.to_string()),
                ("countryCode", self.country_code.clone()),
                ("size", self.page_size.to_string()),
                ("sort", "date,asc".to_string()),
                ("locale", self.locale.clone()),
                ("page", page.to_string()),
            ]);

        let raw: SearchResponse = send_json(Provider::Events, city, request).await?;
        let events: Vec<Event> = raw
            .embedded
            .map(|e| e.events.into_iter().map(Event::from).collect())
            .unwrap_or_default();
        let page_info = raw.page.unwrap_or(PageBlock {
            total_elements: events.len() as u64,
            total_pages: 1,
            number: page,
        });

        Ok(EventPage {
            events,
            total_elements: page_info.total_elements,
            total_pages: page_info.total_pages,
            page: page_info.number,
        })
    }
}
