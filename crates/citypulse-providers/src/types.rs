//! Records returned by the provider clients.
//!
//! These are the provider-neutral shapes the dashboard works with; each
//! client converts its wire format into them and never exposes raw payloads.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A city name resolved to coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoMatch {
    pub name: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub coordinates: Coordinates,
}

/// Broad weather category derived from the OpenWeather condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WeatherCondition {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    /// Mist, fog, haze, dust and similar (7xx codes)
    Atmosphere,
    Clear,
    Clouds,
    #[default]
    Unknown,
}

impl WeatherCondition {
    /// Map an OpenWeather condition id to its group.
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_code(code: u16) -> Self {
        match code {
            200..=299 => Self::Thunderstorm,
            300..=399 => Self::Drizzle,
            500..=599 => Self::Rain,
            600..=699 => Self::Snow,
            700..=799 => Self::Atmosphere,
            800 => Self::Clear,
            801..=899 => Self::Clouds,
            _ => Self::Unknown,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "Thunderstorm",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Atmosphere => "Mist",
            Self::Clear => "Clear",
            Self::Clouds => "Cloudy",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: Option<String>,
    pub coordinates: Coordinates,
    /// Degrees Celsius
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Percent
    pub humidity: u8,
    pub pressure_hpa: u32,
    /// Metres per second
    pub wind_speed: f64,
    pub wind_direction: u16,
    /// Cloud cover percent
    pub cloudiness: u8,
    /// Metres
    pub visibility: Option<u32>,
    pub condition: WeatherCondition,
    pub condition_code: u16,
    /// Localized description, e.g. "cielo claro"
    pub description: String,
    pub icon: String,
    pub observed_at: DateTime<Utc>,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

impl WeatherSnapshot {
    pub fn wind_speed_kmh(&self) -> u32 {
        (self.wind_speed * 3.6).round().max(0.0) as u32
    }

    /// Visibility in kilometres, rounded to one decimal.
    pub fn visibility_km(&self) -> Option<f64> {
        self.visibility
            .map(|metres| (f64::from(metres) / 100.0).round() / 10.0)
    }

    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}

/// Pollutant concentrations in µg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pollutants {
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub nh3: f64,
}

impl Pollutants {
    /// The six pollutants shown to users, with display names.
    pub fn displayed(&self) -> [(&'static str, f64); 6] {
        [
            ("PM2.5", self.pm2_5),
            ("PM10", self.pm10),
            ("O₃", self.o3),
            ("NO₂", self.no2),
            ("SO₂", self.so2),
            ("CO", self.co),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualitySample {
    /// Ordinal index, 1 (good) to 5 (very poor) when the provider behaves
    pub index: u8,
    pub pollutants: Pollutants,
    pub measured_at: DateTime<Utc>,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub coordinates: Coordinates,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    /// Provider type tags, e.g. "museum"
    pub categories: Vec<String>,
    pub photo_reference: Option<String>,
    pub open_now: Option<bool>,
    pub price_level: Option<u8>,
    pub business_status: Option<String>,
}

/// Image bytes fetched from the places provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacePhoto {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub ratio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub city: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub currency: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub venue: Option<Venue>,
    pub price: Option<PriceRange>,
    pub images: Vec<EventImage>,
    pub genre: Option<String>,
}

impl Event {
    /// Widest image, used as the event's cover.
    pub fn best_image(&self) -> Option<&EventImage> {
        self.images.iter().max_by_key(|image| image.width)
    }
}

/// One page of event search results.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventPage {
    pub events: Vec<Event>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source: String,
    pub author: Option<String>,
}

/// Parse a provider timestamp, accepting RFC 3339 with or without offset.
pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

pub(crate) fn from_unix(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            city: "Madrid".into(),
            country: Some("ES".into()),
            coordinates: Coordinates::new(40.4165, -3.7026),
            temperature: 22.5,
            feels_like: 21.9,
            temp_min: 20.0,
            temp_max: 25.1,
            humidity: 40,
            pressure_hpa: 1015,
            wind_speed: 4.12,
            wind_direction: 250,
            cloudiness: 0,
            visibility: Some(9_650),
            condition: WeatherCondition::Clear,
            condition_code: 800,
            description: "cielo claro".into(),
            icon: "01d".into(),
            observed_at: from_unix(1_700_000_000),
            sunrise: from_unix(1_699_990_000),
            sunset: from_unix(1_700_030_000),
        }
    }

    #[test]
    fn test_condition_groups() {
        assert_eq!(WeatherCondition::from_code(211), WeatherCondition::Thunderstorm);
        assert_eq!(WeatherCondition::from_code(301), WeatherCondition::Drizzle);
        assert_eq!(WeatherCondition::from_code(502), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::from_code(601), WeatherCondition::Snow);
        assert_eq!(WeatherCondition::from_code(741), WeatherCondition::Atmosphere);
        assert_eq!(WeatherCondition::from_code(800), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_code(804), WeatherCondition::Clouds);
        assert_eq!(WeatherCondition::from_code(42), WeatherCondition::Unknown);
    }

    #[test]
    fn test_unit_conversions() {
        let weather = snapshot();
        // 4.12 m/s * 3.6 = 14.832 km/h
        assert_eq!(weather.wind_speed_kmh(), 15);
        assert_eq!(weather.visibility_km(), Some(9.7));
        assert_eq!(weather.icon_url(), "https://openweathermap.org/img/wn/01d@2x.png");
    }

    #[test]
    fn test_best_image_is_widest() {
        let image = |width| EventImage {
            url: format!("https://img/{width}.jpg"),
            width,
            height: width / 2,
            ratio: None,
        };
        let event = Event {
            id: "e1".into(),
            name: "Concert".into(),
            url: None,
            start_date: None,
            start_time: None,
            venue: None,
            price: None,
            images: vec![image(320), image(1024), image(640)],
            genre: None,
        };
        assert_eq!(event.best_image().map(|i| i.width), Some(1024));
    }

    #[test]
    fn test_parse_timestamp() {
        let parsed = parse_timestamp(Some("2024-05-01T10:30:00Z")).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T10:30:00+00:00");

        let offset = parse_timestamp(Some("2024-05-01T12:30:00+02:00")).unwrap();
        assert_eq!(offset, parsed);

        assert!(parse_timestamp(Some("2024-05-01T10:30:00")).is_some());
        assert!(parse_timestamp(Some("yesterday")).is_none());
        assert!(parse_timestamp(None).is_none());
    }
}
