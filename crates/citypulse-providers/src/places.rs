//! Google Places client: geocoding, nearby search and place photos.

use citypulse_core::{Config, PlaceCategory, Provider, ProviderError, ReqwestErrorExt};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::http::{require_key, send, send_json, trim_base};
use crate::types::{Coordinates, PlacePhoto, PointOfInterest};

const DEFAULT_RADIUS_M: u32 = 5000;
const DEFAULT_LANGUAGE: &str = "es";
pub const DEFAULT_PHOTO_WIDTH: u32 = 400;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    place_id: String,
    name: String,
    vicinity: Option<String>,
    formatted_address: Option<String>,
    geometry: Geometry,
    rating: Option<f64>,
    user_ratings_total: Option<u32>,
    #[serde(default)]
    photos: Vec<PhotoRef>,
    #[serde(default)]
    types: Vec<String>,
    business_status: Option<String>,
    opening_hours: Option<OpeningHours>,
    price_level: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct PhotoRef {
    photo_reference: String,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    open_now: Option<bool>,
}

impl From<PlaceResult> for PointOfInterest {
    fn from(raw: PlaceResult) -> Self {
        PointOfInterest {
            id: raw.place_id,
            name: raw.name,
            address: raw.vicinity.or(raw.formatted_address),
            coordinates: Coordinates::new(raw.geometry.location.lat, raw.geometry.location.lng),
            rating: raw.rating,
            review_count: raw.user_ratings_total,
            categories: raw.types,
            photo_reference: raw.photos.into_iter().next().map(|p| p.photo_reference),
            open_now: raw.opening_hours.and_then(|h| h.open_now),
            price_level: raw.price_level,
            business_status: raw.business_status,
        }
    }
}

/// Map the status field Google returns inside 200 responses.
fn check_status(status: &str, error_message: Option<String>) -> Result<(), ProviderError> {
    let provider = Provider::Places;
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        "REQUEST_DENIED" => Err(ProviderError::Unauthorized { provider }),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => Err(ProviderError::RateLimited { provider }),
        other => Err(ProviderError::Rejected {
            provider,
            status: 200,
            message: error_message.unwrap_or_else(|| other.to_string()),
        }),
    }
}

#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    radius_m: u32,
    language: String,
}

impl PlacesClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            api_key,
            radius_m: DEFAULT_RADIUS_M,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        let settings = &config.providers.google_places;
        let mut places = Self::with_client(client, &settings.base_url, settings.api_key.clone());
        places.radius_m = config.dashboard.places_radius_m;
        places.language = config.dashboard.language.clone();
        places
    }

    /// Resolve an address or city name to coordinates.
    #[instrument(skip(self), level = "info")]
    pub async fn geocode(&self, address: &str) -> Result<Coordinates, ProviderError> {
        let key = require_key(Provider::Places, self.api_key.as_deref())?;
        let request = self
            .client
            .get(format!("{}/geocode/json", self.base_url))
            .query(&[("address", address), ("key", key)]);

        let raw: GeocodeResponse = send_json(Provider::Places, address, request).await?;
        check_status(&raw.status, raw.error_message)?;

        raw.results
            .into_iter()
            .next()
            .map(|r| Coordinates::new(r.geometry.location.lat, r.geometry.location.lng))
            .ok_or_else(|| ProviderError::NotFound {
                provider: Provider::Places,
                what: address.to_string(),
            })
    }

    /// Places of one category around a point.
    #[instrument(skip(self), level = "info")]
    pub async fn nearby_search(
        &self,
        at: Coordinates,
        category: PlaceCategory,
    ) -> Result<Vec<PointOfInterest>, ProviderError> {
        let key = require_key(Provider::Places, self.api_key.as_deref())?;
        let request = self
            .client
            .get(format!("{}/place/nearbysearch/json", self.base_url))
            .query(&[
                ("location", format!("{},{}", at.latitude, at.longitude)),
                ("radius", self.radius_m.to_string()),
                ("type", category.as_str().to_string()),
                ("key", key.to_string()),
                ("language", self.language.clone()),
            ]);

        let raw: NearbyResponse = send_json(Provider::Places, category.as_str(), request).await?;
        if raw.status == "ZERO_RESULTS" {
            return Ok(Vec::new());
        }
        check_status(&raw.status, raw.error_message)?;

        Ok(raw.results.into_iter().map(PointOfInterest::from).collect())
    }

    /// Geocode the city, then search around it.
    ///
    /// The lookups run strictly in sequence; a geocoding failure skips the search.
    pub async fn search_city(
        &self,
        city: &str,
        category: PlaceCategory,
    ) -> Result<Vec<PointOfInterest>, ProviderError> {
        let center = self.geocode(city).await?;
        self.nearby_search(center, category).await
    }

    /// Download a place photo.
    #[instrument(skip(self, reference), level = "info")]
    pub async fn photo(&self, reference: &str, max_width: u32) -> Result<PlacePhoto, ProviderError> {
        let key = require_key(Provider::Places, self.api_key.as_deref())?;
        let request = self
            .client
            .get(format!("{}/place/photo", self.base_url))
            .query(&[
                ("maxwidth", max_width.to_string()),
                ("photo_reference", reference.to_string()),
                ("key", key.to_string()),
            ]);

        let response = send(Provider::Places, reference, request).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| e.into_provider_error(Provider::Places))?;

        Ok(PlacePhoto {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}
