//! The well-known transaction categories, their icons, and their default
//! monthly budget limits.
//!
//! Categories are free-form strings, so these tables only cover the
//! categories the app suggests. Unknown categories fall back to the
//! `other` icon and the default limit.

/// The emoji shown next to each known category.
const CATEGORY_ICONS: [(&str, &str); 9] = [
    ("income", "\u{1F4B0}"),
    ("food", "\u{2615}"),
    ("rent", "\u{1F3E0}"),
    ("entertainment", "\u{1F389}"),
    ("transport", "\u{1F697}"),
    ("shopping", "\u{1F6CD}\u{FE0F}"),
    ("utilities", "\u{1F4A1}"),
    ("other", "\u{1F4B5}"),
    ("salary", "\u{1F4B0}"),
];

/// The monthly budget limit assumed for a category when the user has not
/// set one themselves.
const DEFAULT_LIMITS: [(&str, f64); 7] = [
    ("food", 300.0),
    ("rent", 1000.0),
    ("entertainment", 200.0),
    ("transport", 150.0),
    ("shopping", 250.0),
    ("utilities", 100.0),
    ("other", 200.0),
];

/// The limit used for categories not listed in the defaults table.
pub const FALLBACK_LIMIT: f64 = 200.0;

/// The categories offered in the transaction and budget forms.
pub const SUGGESTED_CATEGORIES: [&str; 7] = [
    "food",
    "rent",
    "entertainment",
    "transport",
    "shopping",
    "utilities",
    "other",
];

/// Get the emoji icon for `category`.
///
/// The lookup is case-insensitive. Unknown categories get the same icon
/// as `other`.
pub fn icon_for(category: &str) -> &'static str {
    let category = category.to_lowercase();

    CATEGORY_ICONS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, icon)| *icon)
        .unwrap_or("\u{1F4B5}")
}

/// Get the budget limit assumed for `category` when the user has not set
/// their own.
///
/// The lookup is case-insensitive. Unknown categories get [FALLBACK_LIMIT].
pub fn default_limit_for(category: &str) -> f64 {
    let category = category.to_lowercase();

    DEFAULT_LIMITS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, limit)| *limit)
        .unwrap_or(FALLBACK_LIMIT)
}
