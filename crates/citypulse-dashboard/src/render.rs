//! Plain-text presentation of the dashboard.

use std::fmt::{self, Display, Formatter};

use citypulse_providers::{
    AirQualitySample, Event, NewsArticle, PointOfInterest, WeatherSnapshot,
};

use crate::air_quality::AqiTier;
use crate::dashboard::{DashboardView, SectionKind};
use crate::section::{FailureKind, SectionState};

/// Renders a `DashboardView`. Hidden and idle sections are left out.
pub struct DashboardReport<'a> {
    view: &'a DashboardView,
}

impl<'a> DashboardReport<'a> {
    pub fn new(view: &'a DashboardView) -> Self {
        Self { view }
    }
}

impl Display for DashboardReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let view = self.view;
        let Some(city) = view.city.as_deref() else {
            return writeln!(f, "No city selected.");
        };
        writeln!(f, "CityPulse: {city}")?;

        section(f, SectionKind::Weather, &view.weather, "No weather data.", weather)?;
        section(
            f,
            SectionKind::AirQuality,
            &view.air_quality,
            "No air quality data.",
            air_quality,
        )?;
        let places_title = format!("{} ({})", SectionKind::Places.title(), view.category.label());
        titled_section(f, &places_title, &view.places, "No well-rated places found.", places)?;
        section(f, SectionKind::Events, &view.events, "No upcoming events.", events)?;
        let no_news = format!("No news mentions {city}.");
        section(f, SectionKind::News, &view.news, &no_news, news)
    }
}

fn section<T>(
    f: &mut Formatter<'_>,
    kind: SectionKind,
    state: &SectionState<T>,
    empty: &str,
    items: fn(&mut Formatter<'_>, &[T]) -> fmt::Result,
) -> fmt::Result {
    titled_section(f, kind.title(), state, empty, items)
}

fn titled_section<T>(
    f: &mut Formatter<'_>,
    title: &str,
    state: &SectionState<T>,
    empty: &str,
    items: fn(&mut Formatter<'_>, &[T]) -> fmt::Result,
) -> fmt::Result {
    match state {
        SectionState::Idle | SectionState::Hidden => return Ok(()),
        _ => {}
    }

    writeln!(f)?;
    writeln!(f, "== {title} ==")?;
    match state {
        SectionState::Idle | SectionState::Hidden => Ok(()),
        SectionState::Loading => writeln!(f, "  Loading..."),
        SectionState::Empty => writeln!(f, "  {empty}"),
        SectionState::Failed(failure) => {
            let marker = match failure.kind {
                FailureKind::Configuration => "not configured",
                _ => "error",
            };
            writeln!(f, "  [{marker}] {}", failure.message)
        }
        SectionState::Ready(refined) => {
            items(f, &refined.items)?;
            if refined.matched > refined.len() {
                writeln!(f, "  ({} of {} shown)", refined.len(), refined.matched)?;
            }
            Ok(())
        }
    }
}

fn weather(f: &mut Formatter<'_>, items: &[WeatherSnapshot]) -> fmt::Result {
    for w in items {
        match &w.country {
            Some(country) => write!(f, "  {}, {}", w.city, country)?,
            None => write!(f, "  {}", w.city)?,
        }
        writeln!(
            f,
            ": {:.0}°C, {} (feels like {:.0}°C)",
            w.temperature, w.description, w.feels_like
        )?;
        write!(
            f,
            "  min {:.0}°C / max {:.0}°C, humidity {}%, wind {} km/h, pressure {} hPa",
            w.temp_min,
            w.temp_max,
            w.humidity,
            w.wind_speed_kmh(),
            w.pressure_hpa
        )?;
        if let Some(km) = w.visibility_km() {
            write!(f, ", visibility {km:.1} km")?;
        }
        writeln!(f)?;
        writeln!(f, "  icon: {}", w.icon_url())?;
    }
    Ok(())
}

fn air_quality(f: &mut Formatter<'_>, items: &[AirQualitySample]) -> fmt::Result {
    for sample in items {
        let tier = AqiTier::from_index(sample.index);
        writeln!(f, "  Index {}: {}", sample.index, tier.label())?;
        let pollutants: Vec<String> = sample
            .pollutants
            .displayed()
            .iter()
            .map(|(name, value)| format!("{name} {value:.1}"))
            .collect();
        writeln!(f, "  {} (µg/m³)", pollutants.join(", "))?;
    }
    Ok(())
}

fn places(f: &mut Formatter<'_>, items: &[PointOfInterest]) -> fmt::Result {
    for (i, place) in items.iter().enumerate() {
        write!(f, "  {}. {}", i + 1, place.name)?;
        if let Some(rating) = place.rating {
            write!(f, " ★{rating:.1}")?;
        }
        if let Some(reviews) = place.review_count {
            write!(f, " ({reviews} reviews)")?;
        }
        if let Some(address) = &place.address {
            write!(f, " - {address}")?;
        }
        writeln!(f)?;
    }
    Ok(())
}

fn events(f: &mut Formatter<'_>, items: &[Event]) -> fmt::Result {
    for event in items {
        write!(f, "  {}", event.name)?;
        if let Some(date) = event.start_date {
            write!(f, " - {}", date.format("%d/%m/%Y"))?;
            if let Some(time) = event.start_time {
                write!(f, " {}", time.format("%H:%M"))?;
            }
        }
        if let Some(venue) = &event.venue {
            write!(f, " @ {}", venue.name)?;
        }
        if let Some(price) = &event.price {
            write!(f, " ({:.2}-{:.2} {})", price.min, price.max, price.currency)?;
        }
        writeln!(f)?;
        if let Some(url) = &event.url {
            writeln!(f, "    {url}")?;
        }
        if let Some(image) = event.best_image() {
            writeln!(f, "    image: {}", image.url)?;
        }
    }
    Ok(())
}

fn news(f: &mut Formatter<'_>, items: &[NewsArticle]) -> fmt::Result {
    for article in items {
        write!(f, "  {} [{}", article.title, article.source)?;
        if let Some(at) = article.published_at {
            write!(f, ", {}", at.format("%d/%m/%Y %H:%M"))?;
        }
        writeln!(f, "]")?;
        writeln!(f, "    {}", article.url)?;
    }
    Ok(())
}
