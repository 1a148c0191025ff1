// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! UI string tables.
//!
//! Lookups fall back to English, then to the key itself.

use std::collections::BTreeMap;

pub const DEFAULT_LOCALE: &str = "en";

const EN: &[(&str, &str)] = &[
    ("featuredSermons", "Featured Sermons"),
    ("viewAll", "View All"),
    ("welcome", "Welcome"),
    ("home", "Home"),
    ("sermons", "Sermons"),
    ("prayer", "Prayer"),
    ("bible", "Bible"),
    ("profile", "Profile"),
    ("settings", "Settings"),
];

const KN: &[(&str, &str)] = &[
    ("featuredSermons", "ವೈಶಿಷ್ಟ್ಯಗೊಳಿಸಿದ ಧರ್ಮೋಪದೇಶಗಳು"),
    ("viewAll", "ಎಲ್ಲವನ್ನೂ ವೀಕ್ಷಿಸಿ"),
    ("welcome", "ಸ್ವಾಗತ"),
    ("home", "ಮುಖಪುಟ"),
    ("sermons", "ಧರ್ಮೋಪದೇಶಗಳು"),
    ("prayer", "ಪ್ರಾರ್ಥನೆ"),
    ("bible", "ಬೈಬಲ್"),
    ("profile", "ಪ್ರೊಫೈಲ್"),
    ("settings", "ಸಂಯೋಜನೆಗಳು"),
];

fn table(locale: &str) -> Option<&'static [(&'static str, &'static str)]> {
    match locale {
        "en" => Some(EN),
        "kn" => Some(KN),
        _ => None,
    }
}

fn find(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Locales with a string table.
pub fn is_supported(locale: &str) -> bool {
    table(locale).is_some()
}

/// Translate `key` for `locale`.
pub fn translate<'a>(locale: &str, key: &'a str) -> &'a str {
    table(locale)
        .and_then(|t| find(t, key))
        .or_else(|| find(EN, key))
        .unwrap_or(key)
}

/// Every key for `locale`, English filling any gaps.
pub fn strings(locale: &str) -> BTreeMap<&'static str, &'static str> {
    EN.iter()
        .map(|(key, _)| (*key, translate(locale, *key)))
        .collect()
}
