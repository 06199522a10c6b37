//! Dashboard coordination: one city selection fans out to five sections.
//!
//! Section fetches run as independent tasks and report back over a channel.
//! Each update carries the ticket of the request that produced it, and only
//! updates holding the section's current ticket are applied.

use std::collections::HashMap;
use std::sync::Arc;

use citypulse_core::{AppError, Config, NetworkError, PlaceCategory, RecencyList};
use citypulse_providers::{
    AirQualitySample, Event, NewsArticle, PointOfInterest, Providers, WeatherSnapshot,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::adapters::{
    AirQualityAdapter, EventsAdapter, NewsAdapter, PlacesAdapter, WeatherAdapter,
};
use crate::gate::CityGate;
use crate::policies;
use crate::section::{ProviderAdapter, Section, SectionQuery, SectionState};
use crate::selection::{SelectionTracker, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Weather,
    AirQuality,
    Places,
    Events,
    News,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Weather,
        SectionKind::AirQuality,
        SectionKind::Places,
        SectionKind::Events,
        SectionKind::News,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Weather => "Weather",
            SectionKind::AirQuality => "Air quality",
            SectionKind::Places => "Places",
            SectionKind::Events => "Events",
            SectionKind::News => "News",
        }
    }
}

/// The five section pipelines.
pub struct Sections {
    pub weather: Section<WeatherSnapshot>,
    pub air_quality: Section<AirQualitySample>,
    pub places: Section<PointOfInterest>,
    pub events: Section<Event>,
    pub news: Section<NewsArticle>,
}

impl Sections {
    /// Wire adapters to the standard refinement policies. Events are only
    /// fetched for Spanish cities.
    pub fn new(
        weather: Arc<dyn ProviderAdapter<Item = WeatherSnapshot>>,
        air_quality: Arc<dyn ProviderAdapter<Item = AirQualitySample>>,
        places: Arc<dyn ProviderAdapter<Item = PointOfInterest>>,
        events: Arc<dyn ProviderAdapter<Item = Event>>,
        news: Arc<dyn ProviderAdapter<Item = NewsArticle>>,
    ) -> Self {
        Self {
            weather: Section::new(weather, |_: &SectionQuery| policies::weather()),
            air_quality: Section::new(air_quality, |_: &SectionQuery| policies::air_quality()),
            places: Section::new(places, |_: &SectionQuery| policies::places()),
            events: Section::new(events, |_: &SectionQuery| policies::events())
                .with_gate(CityGate::spanish_event_cities()),
            news: Section::new(news, |query: &SectionQuery| policies::news(&query.city)),
        }
    }

    pub fn from_providers(providers: Providers) -> Self {
        Self::new(
            Arc::new(WeatherAdapter::new(providers.openweather.clone())),
            Arc::new(AirQualityAdapter::new(providers.openweather)),
            Arc::new(PlacesAdapter::new(providers.places)),
            Arc::new(EventsAdapter::new(providers.events)),
            Arc::new(NewsAdapter::new(providers.news)),
        )
    }

    async fn run(&self, kind: SectionKind, query: &SectionQuery) -> SectionPayload {
        match kind {
            SectionKind::Weather => SectionPayload::Weather(self.weather.run(query).await),
            SectionKind::AirQuality => {
                SectionPayload::AirQuality(self.air_quality.run(query).await)
            }
            SectionKind::Places => SectionPayload::Places(self.places.run(query).await),
            SectionKind::Events => SectionPayload::Events(self.events.run(query).await),
            SectionKind::News => SectionPayload::News(self.news.run(query).await),
        }
    }
}

/// A finished section fetch.
#[derive(Debug, Clone)]
pub enum SectionPayload {
    Weather(SectionState<WeatherSnapshot>),
    AirQuality(SectionState<AirQualitySample>),
    Places(SectionState<PointOfInterest>),
    Events(SectionState<Event>),
    News(SectionState<NewsArticle>),
}

impl SectionPayload {
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionPayload::Weather(_) => SectionKind::Weather,
            SectionPayload::AirQuality(_) => SectionKind::AirQuality,
            SectionPayload::Places(_) => SectionKind::Places,
            SectionPayload::Events(_) => SectionKind::Events,
            SectionPayload::News(_) => SectionKind::News,
        }
    }
}

/// Message sent from a section task back to the dashboard.
#[derive(Debug, Clone)]
pub struct SectionUpdate {
    pub ticket: Ticket,
    pub payload: SectionPayload,
}

/// Everything currently on screen.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub city: Option<String>,
    pub category: PlaceCategory,
    pub weather: SectionState<WeatherSnapshot>,
    pub air_quality: SectionState<AirQualitySample>,
    pub places: SectionState<PointOfInterest>,
    pub events: SectionState<Event>,
    pub news: SectionState<NewsArticle>,
}

impl DashboardView {
    fn new(category: PlaceCategory) -> Self {
        Self {
            city: None,
            category,
            weather: SectionState::Idle,
            air_quality: SectionState::Idle,
            places: SectionState::Idle,
            events: SectionState::Idle,
            news: SectionState::Idle,
        }
    }

    /// True once no section is loading.
    pub fn is_settled(&self) -> bool {
        self.weather.is_settled()
            && self.air_quality.is_settled()
            && self.places.is_settled()
            && self.events.is_settled()
            && self.news.is_settled()
    }

    fn set_loading(&mut self, kind: SectionKind) {
        match kind {
            SectionKind::Weather => self.weather = SectionState::Loading,
            SectionKind::AirQuality => self.air_quality = SectionState::Loading,
            SectionKind::Places => self.places = SectionState::Loading,
            SectionKind::Events => self.events = SectionState::Loading,
            SectionKind::News => self.news = SectionState::Loading,
        }
    }

    fn store(&mut self, payload: SectionPayload) {
        match payload {
            SectionPayload::Weather(state) => self.weather = state,
            SectionPayload::AirQuality(state) => self.air_quality = state,
            SectionPayload::Places(state) => self.places = state,
            SectionPayload::Events(state) => self.events = state,
            SectionPayload::News(state) => self.news = state,
        }
    }
}

/// Drives the five sections for the selected city.
///
/// Fetches are spawned on the current tokio runtime, so selection methods
/// must be called from within one.
pub struct Dashboard {
    sections: Arc<Sections>,
    view: DashboardView,
    tracker: SelectionTracker<SectionKind>,
    in_flight: HashMap<SectionKind, CancellationToken>,
    tx: mpsc::UnboundedSender<SectionUpdate>,
    rx: mpsc::UnboundedReceiver<SectionUpdate>,
    recency: Option<RecencyList>,
}

impl Dashboard {
    pub fn new(sections: Sections, category: PlaceCategory) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            sections: Arc::new(sections),
            view: DashboardView::new(category),
            tracker: SelectionTracker::new(),
            in_flight: HashMap::new(),
            tx,
            rx,
            recency: None,
        }
    }

    /// Build the provider clients from configuration.
    pub fn from_config(config: &Config) -> Result<Self, NetworkError> {
        let providers = Providers::from_config(config)?;
        Ok(Self::new(
            Sections::from_providers(providers),
            config.dashboard.default_category,
        ))
    }

    /// Record every selected city in `recency`.
    pub fn with_recency(mut self, recency: RecencyList) -> Self {
        self.recency = Some(recency);
        self
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn city(&self) -> Option<&str> {
        self.view.city.as_deref()
    }

    pub fn category(&self) -> PlaceCategory {
        self.view.category
    }

    /// Select a city and refresh every section.
    ///
    /// A blank name is rejected before any request is made. Outstanding
    /// fetches for the previous city are cancelled and any late results
    /// are discarded.
    pub fn select_city(&mut self, city: &str) -> Result<Ticket, AppError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(AppError::InvalidInput("city name is empty".to_string()));
        }

        if let Some(recency) = &self.recency {
            if let Err(e) = recency.record(city) {
                tracing::warn!("Failed to record recent city: {}", e);
            }
        }

        tracing::info!("Selecting {}", city);
        self.view.city = Some(city.to_string());

        let ticket = self.tracker.begin(SectionKind::ALL);
        let query = SectionQuery::new(city, self.view.category);
        for kind in SectionKind::ALL {
            self.spawn(kind, ticket, query.clone());
        }
        Ok(ticket)
    }

    /// Change the places category. Only the places section is refreshed.
    ///
    /// Returns `None` when no city is selected yet.
    pub fn select_category(&mut self, category: PlaceCategory) -> Option<Ticket> {
        self.view.category = category;
        let city = self.view.city.clone()?;

        tracing::debug!("Places category changed to {}", category);
        let ticket = self.tracker.begin([SectionKind::Places]);
        self.spawn(SectionKind::Places, ticket, SectionQuery::new(city, category));
        Some(ticket)
    }

    /// Select the most recently searched city, if there is one.
    pub fn restore_last_city(&mut self) -> Result<Option<Ticket>, AppError> {
        let last = match &self.recency {
            Some(recency) => recency.last_city()?,
            None => None,
        };
        match last {
            Some(city) => self.select_city(&city).map(Some),
            None => Ok(None),
        }
    }

    /// Apply an update if it answers the section's latest request.
    ///
    /// Returns false for stale updates, which leave the view untouched.
    pub fn apply(&mut self, update: SectionUpdate) -> bool {
        let kind = update.payload.kind();
        if !self.tracker.is_current(kind, update.ticket) {
            tracing::debug!(
                "Discarding stale {} update (ticket {})",
                kind.title(),
                update.ticket.value()
            );
            return false;
        }
        self.in_flight.remove(&kind);
        self.view.store(update.payload);
        true
    }

    /// Wait for the next current update and apply it.
    pub async fn next_update(&mut self) -> Option<SectionKind> {
        loop {
            let update = self.rx.recv().await?;
            let kind = update.payload.kind();
            if self.apply(update) {
                return Some(kind);
            }
        }
    }

    /// Wait until no section is loading.
    pub async fn settle(&mut self) {
        while !self.view.is_settled() {
            if self.next_update().await.is_none() {
                break;
            }
        }
    }

    fn spawn(&mut self, kind: SectionKind, ticket: Ticket, query: SectionQuery) {
        if let Some(previous) = self.in_flight.remove(&kind) {
            previous.cancel();
        }
        let token = CancellationToken::new();
        self.in_flight.insert(kind, token.clone());
        self.view.set_loading(kind);

        let sections = Arc::clone(&self.sections);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let payload = tokio::select! {
                _ = token.cancelled() => {
                    tracing::trace!("{} fetch for {} cancelled", kind.title(), query.city);
                    return;
                }
                payload = sections.run(kind, &query) => payload,
            };
            let _ = tx.send(SectionUpdate { ticket, payload });
        });
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        for token in self.in_flight.values() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use citypulse_core::{MemoryStore, Provider, ProviderError};
    use citypulse_providers::{Coordinates, EventImage, Pollutants, WeatherCondition};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    type Respond<T> = Box<dyn Fn(&SectionQuery) -> Result<Vec<T>, ProviderError> + Send + Sync>;

    struct Fake<T> {
        provider: Provider,
        respond: Respond<T>,
        slow_city: Option<String>,
        calls: AtomicUsize,
        queries: Mutex<Vec<SectionQuery>>,
    }

    impl<T> Fake<T> {
        fn new(
            provider: Provider,
            respond: impl Fn(&SectionQuery) -> Result<Vec<T>, ProviderError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                provider,
                respond: Box::new(respond),
                slow_city: None,
                calls: AtomicUsize::new(0),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn slow_for(
            provider: Provider,
            city: &str,
            respond: impl Fn(&SectionQuery) -> Result<Vec<T>, ProviderError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                provider,
                respond: Box::new(respond),
                slow_city: Some(city.to_string()),
                calls: AtomicUsize::new(0),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<T: Send + Sync + 'static> ProviderAdapter for Fake<T> {
        type Item = T;

        fn provider(&self) -> Provider {
            self.provider
        }

        async fn fetch(&self, query: &SectionQuery) -> Result<Vec<T>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().push(query.clone());
            if self.slow_city.as_deref() == Some(query.city.as_str()) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            (self.respond)(query)
        }
    }

    fn snapshot(city: &str) -> WeatherSnapshot {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().unwrap();
        WeatherSnapshot {
            city: city.to_string(),
            country: Some("ES".to_string()),
            coordinates: Coordinates::new(40.4, -3.7),
            temperature: 24.0,
            feels_like: 23.5,
            temp_min: 20.0,
            temp_max: 27.0,
            humidity: 35,
            pressure_hpa: 1016,
            wind_speed: 2.5,
            wind_direction: 180,
            cloudiness: 0,
            visibility: Some(10_000),
            condition: WeatherCondition::Clear,
            condition_code: 800,
            description: "cielo claro".to_string(),
            icon: "01d".to_string(),
            observed_at: at,
            sunrise: at,
            sunset: at,
        }
    }

    fn sample(index: u8) -> AirQualitySample {
        AirQualitySample {
            index,
            pollutants: Pollutants::default(),
            measured_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().unwrap(),
            coordinates: Coordinates::new(40.4, -3.7),
        }
    }

    fn place(id: &str, rating: f64) -> PointOfInterest {
        PointOfInterest {
            id: id.to_string(),
            name: format!("Place {id}"),
            address: None,
            coordinates: Coordinates::new(40.4, -3.7),
            rating: Some(rating),
            review_count: Some(120),
            categories: vec![],
            photo_reference: None,
            open_now: None,
            price_level: None,
            business_status: None,
        }
    }

    fn event(id: &str) -> Event {
        Event {
            id: id.to_string(),
            name: format!("Event {id}"),
            url: None,
            start_date: None,
            start_time: None,
            venue: None,
            price: None,
            images: vec![EventImage {
                url: format!("https://img/{id}"),
                width: 1024,
                height: 576,
                ratio: Some("16_9".to_string()),
            }],
            genre: None,
        }
    }

    fn article(title: &str) -> NewsArticle {
        NewsArticle {
            title: title.to_string(),
            description: None,
            content: None,
            url: format!("https://news/{title}"),
            image_url: None,
            published_at: None,
            source: "Test".to_string(),
            author: None,
        }
    }

    struct Fakes {
        weather: Arc<Fake<WeatherSnapshot>>,
        air_quality: Arc<Fake<AirQualitySample>>,
        places: Arc<Fake<PointOfInterest>>,
        events: Arc<Fake<Event>>,
        news: Arc<Fake<NewsArticle>>,
    }

    impl Fakes {
        fn healthy() -> Self {
            Self {
                weather: Fake::new(Provider::Weather, |q| Ok(vec![snapshot(&q.city)])),
                air_quality: Fake::new(Provider::AirQuality, |_| Ok(vec![sample(2)])),
                places: Fake::new(Provider::Places, |q| {
                    Ok(vec![place(q.category.as_str(), 4.5), place("low", 2.0)])
                }),
                events: Fake::new(Provider::Events, |_| Ok(vec![event("1"), event("2")])),
                news: Fake::new(Provider::News, |q| {
                    Ok(vec![article(&format!("Hoy en {}", q.city)), article("Otra cosa")])
                }),
            }
        }

        fn dashboard(&self) -> Dashboard {
            Dashboard::new(
                Sections::new(
                    self.weather.clone(),
                    self.air_quality.clone(),
                    self.places.clone(),
                    self.events.clone(),
                    self.news.clone(),
                ),
                PlaceCategory::TouristAttraction,
            )
        }
    }

    #[tokio::test]
    async fn test_select_city_fills_every_section() {
        let fakes = Fakes::healthy();
        let mut dashboard = fakes.dashboard();
        assert!(matches!(dashboard.view().weather, SectionState::Idle));

        dashboard.select_city("Madrid").unwrap();
        assert!(!dashboard.view().is_settled());
        dashboard.settle().await;

        let view = dashboard.view();
        assert_eq!(view.city.as_deref(), Some("Madrid"));
        assert_eq!(view.weather.first().map(|w| w.city.as_str()), Some("Madrid"));
        assert_eq!(view.air_quality.first().map(|s| s.index), Some(2));
        assert_eq!(view.places.items().len(), 1);
        assert_eq!(view.events.items().len(), 2);
        assert_eq!(view.news.items().len(), 1);
        assert_eq!(view.news.items()[0].title, "Hoy en Madrid");
    }

    #[tokio::test]
    async fn test_blank_city_rejected_without_requests() {
        let fakes = Fakes::healthy();
        let mut dashboard = fakes.dashboard();

        for blank in ["", "   ", "\t"] {
            let err = dashboard.select_city(blank).unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
        assert_eq!(dashboard.city(), None);
        assert!(matches!(dashboard.view().news, SectionState::Idle));
        assert_eq!(fakes.weather.calls(), 0);
        assert_eq!(fakes.news.calls(), 0);
    }

    #[tokio::test]
    async fn test_latest_city_wins() {
        let mut fakes = Fakes::healthy();
        fakes.weather = Fake::slow_for(Provider::Weather, "Madrid", |q| Ok(vec![snapshot(&q.city)]));
        let mut dashboard = fakes.dashboard();

        let first = dashboard.select_city("Madrid").unwrap();
        let second = dashboard.select_city("Sevilla").unwrap();
        assert_ne!(first, second);
        dashboard.settle().await;

        let view = dashboard.view();
        assert_eq!(view.city.as_deref(), Some("Sevilla"));
        assert_eq!(view.weather.first().map(|w| w.city.as_str()), Some("Sevilla"));
        assert_eq!(view.news.items()[0].title, "Hoy en Sevilla");
    }

    #[tokio::test]
    async fn test_stale_update_is_discarded() {
        let fakes = Fakes::healthy();
        let mut dashboard = fakes.dashboard();

        let stale = dashboard.select_city("Madrid").unwrap();
        dashboard.select_city("Sevilla").unwrap();
        dashboard.settle().await;

        let late = SectionUpdate {
            ticket: stale,
            payload: SectionPayload::Weather(SectionState::Ready(
                policies::weather().apply(vec![snapshot("Madrid")]),
            )),
        };
        assert!(!dashboard.apply(late));
        assert_eq!(
            dashboard.view().weather.first().map(|w| w.city.as_str()),
            Some("Sevilla")
        );
    }

    #[tokio::test]
    async fn test_failing_section_does_not_affect_others() {
        let mut fakes = Fakes::healthy();
        fakes.news = Fake::new(Provider::News, |_| {
            Err(ProviderError::Unauthorized {
                provider: Provider::News,
            })
        });
        fakes.air_quality = Fake::new(Provider::AirQuality, |q| {
            Err(ProviderError::NotFound {
                provider: Provider::AirQuality,
                what: q.city.clone(),
            })
        });
        let mut dashboard = fakes.dashboard();

        dashboard.select_city("Madrid").unwrap();
        dashboard.settle().await;

        let view = dashboard.view();
        assert!(view.news.failure().is_some());
        assert!(view.air_quality.failure().is_some());
        assert!(matches!(view.weather, SectionState::Ready(_)));
        assert!(matches!(view.places, SectionState::Ready(_)));
        assert!(matches!(view.events, SectionState::Ready(_)));
    }

    #[tokio::test]
    async fn test_events_hidden_outside_spain() {
        let fakes = Fakes::healthy();
        let mut dashboard = fakes.dashboard();

        dashboard.select_city("Paris").unwrap();
        dashboard.settle().await;

        assert!(matches!(dashboard.view().events, SectionState::Hidden));
        assert_eq!(fakes.events.calls(), 0);
        assert_eq!(fakes.weather.calls(), 1);

        dashboard.select_city("málaga").unwrap();
        dashboard.settle().await;
        assert!(matches!(dashboard.view().events, SectionState::Ready(_)));
        assert_eq!(fakes.events.calls(), 1);
    }

    #[tokio::test]
    async fn test_category_change_refreshes_only_places() {
        let fakes = Fakes::healthy();
        let mut dashboard = fakes.dashboard();

        assert_eq!(dashboard.select_category(PlaceCategory::Museum), None);
        assert_eq!(fakes.places.calls(), 0);

        dashboard.select_city("Bilbao").unwrap();
        dashboard.settle().await;
        assert_eq!(fakes.places.queries.lock()[0].category, PlaceCategory::Museum);

        dashboard.select_category(PlaceCategory::Restaurant).unwrap();
        assert!(matches!(dashboard.view().places, SectionState::Loading));
        assert!(matches!(dashboard.view().weather, SectionState::Ready(_)));
        dashboard.settle().await;

        assert_eq!(fakes.places.calls(), 2);
        assert_eq!(fakes.weather.calls(), 1);
        assert_eq!(fakes.news.calls(), 1);
        assert_eq!(dashboard.view().places.items()[0].id, "restaurant");
    }

    #[tokio::test]
    async fn test_recent_cities_recorded_and_restored() {
        let store = Arc::new(MemoryStore::new());
        let fakes = Fakes::healthy();

        let mut dashboard = fakes
            .dashboard()
            .with_recency(RecencyList::new(store.clone()));
        assert_eq!(dashboard.restore_last_city().unwrap(), None);

        dashboard.select_city("Madrid").unwrap();
        dashboard.select_city(" Sevilla ").unwrap();
        dashboard.settle().await;

        let recency = RecencyList::new(store.clone());
        assert_eq!(recency.recent().unwrap(), vec!["Sevilla", "Madrid"]);

        let mut restored = fakes.dashboard().with_recency(RecencyList::new(store));
        assert!(restored.restore_last_city().unwrap().is_some());
        assert_eq!(restored.city(), Some("Sevilla"));
        restored.settle().await;
    }
}
