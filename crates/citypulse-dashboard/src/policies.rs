//! The refinement policies used by each dashboard section.

use citypulse_providers::{AirQualitySample, Event, NewsArticle, PointOfInterest, WeatherSnapshot};

use crate::refine::RefinementPolicy;

pub const MIN_PLACE_RATING: f64 = 3.5;
pub const MAX_PLACES: usize = 6;
pub const MIN_EVENT_IMAGE_WIDTH: u32 = 640;
pub const MAX_EVENTS: usize = 3;
pub const MAX_ARTICLES: usize = 3;

/// Rating weighted by the log of the review count.
///
/// A missing or zero review count counts as one review, which scores zero.
pub fn place_score(place: &PointOfInterest) -> f64 {
    let rating = place.rating.unwrap_or(0.0);
    let reviews = f64::from(place.review_count.unwrap_or(0).max(1));
    rating * reviews.ln()
}

/// Well-rated places, best first.
pub fn places() -> RefinementPolicy<PointOfInterest> {
    RefinementPolicy::new("places", MAX_PLACES)
        .keep_if(|place: &PointOfInterest| {
            place.rating.is_some_and(|rating| rating >= MIN_PLACE_RATING)
        })
        .rank_by(place_score)
        .dedup_by(|place| place.id.clone())
}

/// Upcoming events that have at least one large image, soonest first.
pub fn events() -> RefinementPolicy<Event> {
    RefinementPolicy::new("events", MAX_EVENTS)
        .keep_if(|event: &Event| {
            event
                .images
                .iter()
                .any(|image| image.width >= MIN_EVENT_IMAGE_WIDTH)
        })
        .dedup_by(|event| event.id.clone())
}

/// Articles that mention `term` in the title or description, newest first.
///
/// Matching is a case-insensitive substring test.
pub fn news(term: &str) -> RefinementPolicy<NewsArticle> {
    let needle = term.trim().to_lowercase();
    RefinementPolicy::new("news", MAX_ARTICLES)
        .keep_if(move |article: &NewsArticle| {
            article.title.to_lowercase().contains(&needle)
                || article
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .rank_by(|article| {
            article
                .published_at
                .map(|at| at.timestamp_millis() as f64)
                .unwrap_or(f64::NEG_INFINITY)
        })
        .dedup_by(|article| article.url.clone())
}

pub fn weather() -> RefinementPolicy<WeatherSnapshot> {
    RefinementPolicy::new("weather", 1)
}

/// The first (current) sample.
pub fn air_quality() -> RefinementPolicy<AirQualitySample> {
    RefinementPolicy::new("air quality", 1)
}
