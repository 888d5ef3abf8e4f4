//! Cardinality reduction for metric labels.

use std::sync::LazyLock;

use regex::Regex;

/// Placeholder segment that replaces a UUID.
pub const ID_PLACEHOLDER: &str = ":id";

static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("UUID pattern is a valid regex")
});

/// Path part of `url`, everything before the first `?`.
pub fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

/// Reduce `url` to a low-cardinality metric label.
///
/// Drops the query and replaces every UUID (any letter case) with [`ID_PLACEHOLDER`].
pub fn reduce_cardinality(url: &str) -> String {
    UUID_PATTERN
        .replace_all(strip_query(url), ID_PLACEHOLDER)
        .into_owned()
}
