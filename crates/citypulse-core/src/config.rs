use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

const APP_DIR: &str = "citypulse";
const ENV_PREFIX: &str = "CITYPULSE";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Kind of place the places section searches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlaceCategory {
    #[default]
    TouristAttraction,
    Museum,
    Restaurant,
    Park,
    ShoppingMall,
    Cafe,
    Church,
    ArtGallery,
}

impl PlaceCategory {
    /// Categories offered as filters in the places section.
    pub const SELECTABLE: [PlaceCategory; 5] = [
        PlaceCategory::TouristAttraction,
        PlaceCategory::Museum,
        PlaceCategory::Restaurant,
        PlaceCategory::Park,
        PlaceCategory::ShoppingMall,
    ];

    /// Identifier used by the places provider's `type` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceCategory::TouristAttraction => "tourist_attraction",
            PlaceCategory::Museum => "museum",
            PlaceCategory::Restaurant => "restaurant",
            PlaceCategory::Park => "park",
            PlaceCategory::ShoppingMall => "shopping_mall",
            PlaceCategory::Cafe => "cafe",
            PlaceCategory::Church => "church",
            PlaceCategory::ArtGallery => "art_gallery",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlaceCategory::TouristAttraction => "Attractions",
            PlaceCategory::Museum => "Museums",
            PlaceCategory::Restaurant => "Restaurants",
            PlaceCategory::Park => "Parks",
            PlaceCategory::ShoppingMall => "Shopping",
            PlaceCategory::Cafe => "Cafes",
            PlaceCategory::Church => "Churches",
            PlaceCategory::ArtGallery => "Art galleries",
        }
    }
}

impl fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceCategory {
    type Err = crate::ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let all = [
            PlaceCategory::TouristAttraction,
            PlaceCategory::Museum,
            PlaceCategory::Restaurant,
            PlaceCategory::Park,
            PlaceCategory::ShoppingMall,
            PlaceCategory::Cafe,
            PlaceCategory::Church,
            PlaceCategory::ArtGallery,
        ];
        let wanted = s.trim().to_lowercase();
        all.into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| crate::ConfigError::Invalid(format!("unknown place category: {s}")))
    }
}

/// Which news provider feeds the news section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NewsSource {
    #[default]
    GNews,
    NewsApi,
}

/// Credentials and endpoint for one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// API key (usually supplied via environment)
    #[serde(default)]
    pub api_key: Option<String>,

    pub base_url: String,
}

impl ProviderSettings {
    fn new(base_url: &str) -> Self {
        Self {
            api_key: None,
            base_url: base_url.to_string(),
        }
    }

    /// The API key if it is present and not blank.
    pub fn key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Current weather, direct geocoding and air pollution
    pub openweather: ProviderSettings,
    /// Geocoding, nearby search and photos
    pub google_places: ProviderSettings,
    /// Event discovery
    pub ticketmaster: ProviderSettings,
    pub gnews: ProviderSettings,
    pub newsapi: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openweather: ProviderSettings::new("https://api.openweathermap.org"),
            google_places: ProviderSettings::new("https://maps.googleapis.com/maps/api"),
            ticketmaster: ProviderSettings::new("https://app.ticketmaster.com/discovery/v2"),
            gnews: ProviderSettings::new("https://gnews.io/api/v4"),
            newsapi: ProviderSettings::new("https://newsapi.org/v2"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: format!("CityPulse/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Language for weather descriptions, places and news
    pub language: String,
    /// ISO country the events and news searches are scoped to
    pub country_code: String,
    pub events_locale: String,
    pub events_page_size: u32,
    /// Nearby-search radius in metres
    pub places_radius_m: u32,
    pub news_max_results: u32,
    pub default_category: PlaceCategory,
    pub news_source: NewsSource,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            language: "es".to_string(),
            country_code: "ES".to_string(),
            events_locale: "es-ES".to_string(),
            events_page_size: 10,
            places_radius_m: 5000,
            news_max_results: 9,
            default_category: PlaceCategory::default(),
            news_source: NewsSource::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            providers: ProvidersConfig::default(),
            http: HttpConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default config directory.
    ///
    /// `config.toml` is optional; `CITYPULSE_*` environment variables
    /// override it (`__` separates nested keys, e.g.
    /// `CITYPULSE_PROVIDERS__OPENWEATHER__API_KEY`).
    pub fn load() -> Result<Self> {
        Self::load_from(&default_config_dir())
    }

    /// Load configuration rooted at `dir`.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let defaults = Config {
            config_dir: dir.to_path_buf(),
            ..Config::default()
        };
        let file = dir.join("config.toml");
        let config: Config = ::config::Config::builder()
            .add_source(
                ::config::Config::try_from(&defaults).context("Failed to seed defaults")?,
            )
            .add_source(::config::File::from(file).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation finds critical problems; warnings are logged.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        let providers = [
            ("providers.openweather", &self.providers.openweather),
            ("providers.google_places", &self.providers.google_places),
            ("providers.ticketmaster", &self.providers.ticketmaster),
            ("providers.gnews", &self.providers.gnews),
            ("providers.newsapi", &self.providers.newsapi),
        ];
        for (field, settings) in providers {
            validate_url(&settings.base_url, &format!("{field}.base_url"), &mut result);
        }

        // Missing keys only disable the sections that need them.
        let required = [
            ("providers.openweather", &self.providers.openweather, "weather and air quality"),
            ("providers.google_places", &self.providers.google_places, "places"),
            ("providers.ticketmaster", &self.providers.ticketmaster, "events"),
        ];
        for (field, settings, sections) in required {
            if settings.key().is_none() {
                result.add_warning(
                    format!("{field}.api_key"),
                    format!("API key not set - {sections} will be unavailable"),
                );
            }
        }
        let (news_field, news_settings) = match self.dashboard.news_source {
            NewsSource::GNews => ("providers.gnews", &self.providers.gnews),
            NewsSource::NewsApi => ("providers.newsapi", &self.providers.newsapi),
        };
        if news_settings.key().is_none() {
            result.add_warning(
                format!("{news_field}.api_key"),
                "API key not set - news will be unavailable",
            );
        }

        if self.http.timeout_secs == 0 {
            result.add_error("http.timeout_secs", "Timeout must be greater than 0");
        } else if self.http.timeout_secs > 120 {
            result.add_warning("http.timeout_secs", "Timeout is unusually long (>120s)");
        }

        if self.dashboard.places_radius_m == 0 {
            result.add_error("dashboard.places_radius_m", "Radius must be greater than 0");
        } else if self.dashboard.places_radius_m > 50_000 {
            result.add_error(
                "dashboard.places_radius_m",
                "Radius exceeds the provider maximum of 50000 metres",
            );
        }

        if self.dashboard.events_page_size == 0 {
            result.add_error("dashboard.events_page_size", "Page size must be greater than 0");
        }
        if self.dashboard.news_max_results == 0 {
            result.add_error("dashboard.news_max_results", "Must request at least one article");
        }
        if self.dashboard.country_code.len() != 2 {
            result.add_warning(
                "dashboard.country_code",
                "Country code should be a two-letter ISO code",
            );
        }

        result
    }

    /// Path of the local state database.
    pub fn state_db_path(&self) -> PathBuf {
        self.config_dir.join("state.db")
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }
            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }
            if url.port() == Some(0) {
                result.add_error(field_name, "Port cannot be 0");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
