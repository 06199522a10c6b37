//! City name folding shared by the events gate, suggestions and the recency list.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a city name into a comparison key: trimmed, lowercased, diacritics removed.
///
/// "Málaga", "MALAGA" and " malaga " all fold to "malaga".
pub fn fold(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// True when both names fold to the same key.
pub fn same_city(a: &str, b: &str) -> bool {
    fold(a) == fold(b)
}
