//! News search clients.
//!
//! GNews is the default source; NewsAPI is kept as a configurable
//! alternative. Both return the same `NewsArticle` records.

use citypulse_core::{Config, NewsSource, Provider, ProviderError};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::http::{require_key, send_json, trim_base};
use crate::types::{parse_timestamp, NewsArticle};

const DEFAULT_MAX_RESULTS: u32 = 9;

#[derive(Debug, Deserialize)]
struct GNewsResponse {
    #[serde(default)]
    articles: Vec<GNewsArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GNewsArticle {
    title: String,
    description: Option<String>,
    content: Option<String>,
    url: String,
    image: Option<String>,
    published_at: Option<String>,
    source: Option<GNewsSource>,
}

#[derive(Debug, Deserialize)]
struct GNewsSource {
    name: Option<String>,
}

impl From<GNewsArticle> for NewsArticle {
    fn from(raw: GNewsArticle) -> Self {
        NewsArticle {
            published_at: parse_timestamp(raw.published_at.as_deref()),
            title: raw.title,
            description: raw.description,
            content: raw.content,
            url: raw.url,
            image_url: raw.image,
            source: raw
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "GNews".to_string()),
            author: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GNewsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    language: String,
    country: String,
    max_results: u32,
}

impl GNewsClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            api_key,
            language: "es".to_string(),
            country: "es".to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        let settings = &config.providers.gnews;
        let mut gnews = Self::with_client(client, &settings.base_url, settings.api_key.clone());
        gnews.language = config.dashboard.language.clone();
        gnews.country = config.dashboard.country_code.to_lowercase();
        gnews.max_results = config.dashboard.news_max_results;
        gnews
    }

    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, term: &str) -> Result<Vec<NewsArticle>, ProviderError> {
        let key = require_key(Provider::News, self.api_key.as_deref())?;
        let request = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", term.to_string()),
                ("lang", self.language.clone()),
                ("country", self.country.clone()),
                ("max", self.max_results.to_string()),
                ("apikey", key.to_string()),
            ]);

        let raw: GNewsResponse = send_json(Provider::News, term, request).await?;
        Ok(raw.articles.into_iter().map(NewsArticle::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    source: Option<NewsApiSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

impl NewsApiArticle {
    /// NewsAPI marks articles taken down by the publisher as "[Removed]".
    fn into_article(self) -> Option<NewsArticle> {
        let title = self.title.filter(|t| t != "[Removed]")?;
        let url = self.url?;
        Some(NewsArticle {
            published_at: parse_timestamp(self.published_at.as_deref()),
            title,
            description: self.description,
            content: self.content,
            url,
            image_url: self.url_to_image,
            source: self
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "NewsAPI".to_string()),
            author: self.author,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    language: String,
    page_size: u32,
}

impl NewsApiClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            api_key,
            language: "es".to_string(),
            page_size: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        let settings = &config.providers.newsapi;
        let mut newsapi = Self::with_client(client, &settings.base_url, settings.api_key.clone());
        newsapi.language = config.dashboard.language.clone();
        newsapi.page_size = config.dashboard.news_max_results;
        newsapi
    }

    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, term: &str) -> Result<Vec<NewsArticle>, ProviderError> {
        let key = require_key(Provider::News, self.api_key.as_deref())?;
        let request = self
            .client
            .get(format!("{}/everything", self.base_url))
            .query(&[
                ("q", term.to_string()),
                ("language", self.language.clone()),
                ("sortBy", "publishedAt".to_string()),
                ("pageSize", self.page_size.to_string()),
                ("apiKey", key.to_string()),
            ]);

        let raw: NewsApiResponse = send_json(Provider::News, term, request).await?;
        Ok(raw
            .articles
            .into_iter()
            .filter_map(NewsApiArticle::into_article)
            .collect())
    }
}

/// The news source selected in configuration.
#[derive(Debug, Clone)]
pub enum NewsClient {
    GNews(GNewsClient),
    NewsApi(NewsApiClient),
}

impl NewsClient {
    pub fn from_config(client: Client, config: &Config) -> Self {
        match config.dashboard.news_source {
            NewsSource::GNews => NewsClient::GNews(GNewsClient::from_config(client, config)),
            NewsSource::NewsApi => NewsClient::NewsApi(NewsApiClient::from_config(client, config)),
        }
    }

    pub async fn search(&self, term: &str) -> Result<Vec<NewsArticle>, ProviderError> {
        match self {
            NewsClient::GNews(gnews) => gnews.search(term).await,
            NewsClient::NewsApi(newsapi) => newsapi.search(term).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gnews_conversion() {
        let raw: GNewsArticle = serde_json::from_value(serde_json::json!({
            "title": "Madrid estrena nuevo parque",
            "description": "El ayuntamiento...",
            "content": "Texto completo",
            "url": "https://example.com/a",
            "image": "https://example.com/a.jpg",
            "publishedAt": "2024-03-01T08:00:00Z",
            "source": { "name": "El País", "url": "https://elpais.com" }
        }))
        .unwrap();

        let article = NewsArticle::from(raw);
        assert_eq!(article.source, "El País");
        assert_eq!(article.image_url.as_deref(), Some("https://example.com/a.jpg"));
        assert!(article.published_at.is_some());
        assert_eq!(article.author, None);
    }

    #[test]
    fn test_newsapi_drops_removed_articles() {
        let removed: NewsApiArticle = serde_json::from_value(serde_json::json!({
            "source": { "id": null, "name": "[Removed]" },
            "title": "[Removed]",
            "url": "https://removed.com"
        }))
        .unwrap();
        assert!(removed.into_article().is_none());

        let kept: NewsApiArticle = serde_json::from_value(serde_json::json!({
            "source": { "id": "el-mundo", "name": "El Mundo" },
            "author": "Redacción",
            "title": "Sevilla en fiestas",
            "url": "https://elmundo.es/x",
            "urlToImage": null,
            "publishedAt": "2024-04-20T18:15:00Z"
        }))
        .unwrap();
        let article = kept.into_article().unwrap();
        assert_eq!(article.author.as_deref(), Some("Redacción"));
        assert_eq!(article.source, "El Mundo");
    }

    #[test]
    fn test_news_client_follows_config() {
        let mut config = Config::default();
        assert!(matches!(
            NewsClient::from_config(Client::new(), &config),
            NewsClient::GNews(_)
        ));
        config.dashboard.news_source = NewsSource::NewsApi;
        assert!(matches!(
            NewsClient::from_config(Client::new(), &config),
            NewsClient::NewsApi(_)
        ));
    }
}
