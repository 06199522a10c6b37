//! OpenWeather client: current weather, direct geocoding and air pollution.

use citypulse_core::{Config, Provider, ProviderError};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::http::{require_key, send_json, trim_base};
use crate::types::{
    from_unix, AirQualitySample, Coordinates, GeoMatch, Pollutants, WeatherCondition,
    WeatherSnapshot,
};

const DEFAULT_LANGUAGE: &str = "es";

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    name: String,
    coord: CoordBlock,
    main: MainBlock,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    #[serde(default)]
    wind: WindBlock,
    #[serde(default)]
    clouds: CloudsBlock,
    visibility: Option<u32>,
    dt: i64,
    #[serde(default)]
    sys: SysBlock,
}

#[derive(Debug, Deserialize)]
struct CoordBlock {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    id: u16,
    description: String,
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
struct WindBlock {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Default, Deserialize)]
struct CloudsBlock {
    #[serde(default)]
    all: f64,
}

#[derive(Debug, Default, Deserialize)]
struct SysBlock {
    country: Option<String>,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct GeocodeEntry {
    name: String,
    lat: f64,
    lon: f64,
    country: Option<String>,
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirPollutionResponse {
    coord: CoordBlock,
    #[serde(default)]
    list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Deserialize)]
struct AirPollutionEntry {
    main: AqiBlock,
    #[serde(default)]
    components: Pollutants,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct AqiBlock {
    aqi: i64,
}

impl From<CurrentWeatherResponse> for WeatherSnapshot {
    fn from(raw: CurrentWeatherResponse) -> Self {
        let (code, description, icon) = raw
            .weather
            .into_iter()
            .next()
            .map(|c| (c.id, c.description, c.icon))
            .unwrap_or_default();

        WeatherSnapshot {
            city: raw.name,
            country: raw.sys.country,
            coordinates: Coordinates::new(raw.coord.lat, raw.coord.lon),
            temperature: raw.main.temp,
            feels_like: raw.main.feels_like,
            temp_min: raw.main.temp_min,
            temp_max: raw.main.temp_max,
            humidity: raw.main.humidity.clamp(0.0, 100.0).round() as u8,
            pressure_hpa: raw.main.pressure.max(0.0).round() as u32,
            wind_speed: raw.wind.speed,
            wind_direction: raw.wind.deg.rem_euclid(360.0).round() as u16,
            cloudiness: raw.clouds.all.clamp(0.0, 100.0).round() as u8,
            visibility: raw.visibility,
            condition: WeatherCondition::from_code(code),
            condition_code: code,
            description,
            icon,
            observed_at: from_unix(raw.dt),
            sunrise: from_unix(raw.sys.sunrise),
            sunset: from_unix(raw.sys.sunset),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    language: String,
}

impl OpenWeatherClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            api_key,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        let settings = &config.providers.openweather;
        Self::with_client(client, &settings.base_url, settings.api_key.clone())
            .with_language(&config.dashboard.language)
    }

    /// Language used for condition descriptions.
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// Current conditions for a city name, in metric units.
    #[instrument(skip(self), level = "info")]
    pub async fn current_weather(&self, city: &str) -> Result<WeatherSnapshot, ProviderError> {
        let key = require_key(Provider::Weather, self.api_key.as_deref())?;
        let request = self
            .client
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[
                ("q", city),
                ("appid", key),
                ("units", "metric"),
                ("lang", self.language.as_str()),
            ]);

        let raw: CurrentWeatherResponse = send_json(Provider::Weather, city, request).await?;

        Ok(raw.into())
    }

    /// Resolve a city name to coordinates (first match only).
    #[instrument(skip(self), level = "info")]
    pub async fn geocode(&self, city: &str) -> Result<GeoMatch, ProviderError> {
        let key = require_key(Provider::AirQuality, self.api_key.as_deref())?;
        let request = self
            .client
            .get(format!("{}/geo/1.0/direct", self.base_url))
            .query(&[("q", city), ("limit", "1"), ("appid", key)]);

        let matches: Vec<GeocodeEntry> = send_json(Provider::AirQuality, city, request).await?;
        let first = matches
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NotFound {
                provider: Provider::AirQuality,
                what: city.to_string(),
            })?;

        Ok(GeoMatch {
            name: first.name,
            country: first.country,
            state: first.state,
            coordinates: Coordinates::new(first.lat, first.lon),
        })
    }

    /// Current air pollution samples at a point.
    #[instrument(skip(self), level = "info")]
    pub async fn air_pollution(
        &self,
        at: Coordinates,
    ) -> Result<Vec<AirQualitySample>, ProviderError> {
        let key = require_key(Provider::AirQuality, self.api_key.as_deref())?;
        let request = self
            .client
            .get(format!("{}/data/2.5/air_pollution", self.base_url))
            .query(&[
                ("lat", at.latitude.to_string()),
                ("lon", at.longitude.to_string()),
                ("appid", key.to_string()),
            ]);

        let subject = format!("{},{}", at.latitude, at.longitude);
        let raw: AirPollutionResponse = send_json(Provider::AirQuality, &subject, request).await?;
        let coordinates = Coordinates::new(raw.coord.lat, raw.coord.lon);

        Ok(raw
            .list
            .into_iter()
            .map(|entry| AirQualitySample {
                // Out-of-range indices are kept as 0 and shown as unknown.
                index: u8::try_from(entry.main.aqi).unwrap_or(0),
                pollutants: entry.components,
                measured_at: from_unix(entry.dt),
                coordinates,
            })
            .collect())
    }

    /// Geocode the city, then fetch its air pollution.
    ///
    /// The lookups run strictly in sequence; a geocoding failure skips the
    /// pollution request.
    pub async fn air_quality_for_city(
        &self,
        city: &str,
    ) -> Result<(GeoMatch, Vec<AirQualitySample>), ProviderError> {
        let location = self.geocode(city).await?;
        let samples = self.air_pollution(location.coordinates).await?;
        Ok((location, samples))
    }
}
