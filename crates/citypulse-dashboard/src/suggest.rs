//! City name suggestions for the search box.

use citypulse_core::names;

/// Popular destinations offered while typing.
pub const POPULAR_CITIES: &[&str] = &[
    // Spain
    "Madrid",
    "Barcelona",
    "Valencia",
    "Sevilla",
    "Zaragoza",
    "Málaga",
    "Marbella",
    "Granada",
    "Bilbao",
    "Córdoba",
    "Palma de Mallorca",
    "Alicante",
    "Murcia",
    "San Sebastián",
    "Toledo",
    "Salamanca",
    "Santiago de Compostela",
    "Cádiz",
    "Ibiza",
    "Benidorm",
    "Tarragona",
    "Santander",
    "Gijón",
    "Oviedo",
    "A Coruña",
    "Pamplona",
    "Valladolid",
    "Vigo",
    "Segovia",
    "Ávila",
    // Europe
    "Londres",
    "París",
    "Berlín",
    "Roma",
    "Ámsterdam",
    "Lisboa",
    "Oporto",
    "Viena",
    "Praga",
    "Budapest",
    "Dubrovnik",
    "Estambul",
    "Atenas",
    "Copenhague",
    "Estocolmo",
    "Oslo",
    "Helsinki",
    "Bruselas",
    "Múnich",
    "Hamburgo",
    // Americas
    "Nueva York",
    "Los Ángeles",
    "Chicago",
    "Miami",
    "San Francisco",
    "Las Vegas",
    "Washington",
    "Boston",
    "Seattle",
    "Orlando",
    "Ciudad de México",
    "Cancún",
    "Buenos Aires",
    "São Paulo",
    "Río de Janeiro",
    "Lima",
    "Bogotá",
    "Santiago",
    "Cartagena",
    "Cusco",
    "Toronto",
    "Vancouver",
    "Montreal",
    "Quebec",
    "Calgary",
    // Asia
    "Tokio",
    "Seúl",
    "Pekín",
    "Shanghái",
    "Hong Kong",
    "Singapur",
    "Bangkok",
    "Dubái",
    "Bali",
    "Kuala Lumpur",
    // Oceania
    "Sídney",
    "Melbourne",
    "Brisbane",
    "Auckland",
    "Wellington",
];

/// Popular cities whose name contains `term`, ignoring case and accents.
///
/// A blank term yields no suggestions.
pub fn suggest(term: &str) -> Vec<&'static str> {
    let needle = names::fold(term);
    if needle.is_empty() {
        return Vec::new();
    }

    POPULAR_CITIES
        .iter()
        .copied()
        .filter(|city| names::fold(city).contains(&needle))
        .collect()
}
