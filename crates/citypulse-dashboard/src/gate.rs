//! Static allow-lists that decide whether a section is attempted at all.

use std::collections::HashSet;

use citypulse_core::names;

/// Spanish cities the events provider reliably covers.
pub const SPANISH_EVENT_CITIES: &[&str] = &[
    "Madrid",
    "Barcelona",
    "Valencia",
    "Sevilla",
    "Zaragoza",
    "Málaga",
    "Murcia",
    "Palma",
    "Las Palmas de Gran Canaria",
    "Bilbao",
    "Alicante",
    "Córdoba",
    "Valladolid",
    "Vigo",
    "Gijón",
    "Hospitalet de Llobregat",
    "Vitoria",
    "Granada",
    "A Coruña",
    "Elche",
    "Oviedo",
    "Terrassa",
    "Badalona",
    "Cartagena",
    "Jerez de la Frontera",
    "Sabadell",
    "Santa Cruz de Tenerife",
    "Pamplona",
    "Almería",
    "Leganés",
    "Fuenlabrada",
    "Santander",
    "Burgos",
    "Albacete",
    "Castellón de la Plana",
    "Alcalá de Henares",
    "Getafe",
    "Salamanca",
    "Logroño",
    "San Sebastián",
    "Badajoz",
    "Huelva",
    "Lleida",
    "Tarragona",
    "Marbella",
    "León",
    "Cádiz",
    "Dos Hermanas",
    "Torrejón de Ardoz",
    "Parla",
    "Reus",
    "Mataró",
    "Alcorcón",
    "Toledo",
    "Girona",
    "Ávila",
    "Cáceres",
    "Segovia",
    "Cuenca",
    "Jaén",
    "Guadalajara",
    "Ourense",
    "Palencia",
    "Zamora",
];

/// Membership test over folded city names.
#[derive(Debug, Clone)]
pub struct CityGate {
    allowed: HashSet<String>,
}

impl CityGate {
    pub fn new<I, S>(cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: cities
                .into_iter()
                .map(|city| names::fold(city.as_ref()))
                .filter(|key| !key.is_empty())
                .collect(),
        }
    }

    pub fn spanish_event_cities() -> Self {
        Self::new(SPANISH_EVENT_CITIES)
    }

    /// True when `city` folds to an allowed name; accents and case are ignored.
    pub fn allows(&self, city: &str) -> bool {
        self.allowed.contains(&names::fold(city))
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}
