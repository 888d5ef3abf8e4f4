//! Query-string redaction for human-readable logs.

/// Replacement for a single query value.
pub const VALUE_PLACEHOLDER: &str = ":value";

/// Replacement for a comma-delimited list of two or more values.
pub const VALUES_PLACEHOLDER: &str = ":values";

const LIST_SEPARATOR: char = ',';

/// Replace every query value in `url` with a placeholder, keeping the keys.
///
/// The shape of a value survives (single value vs. list) but its content does
/// not, so secrets passed as query parameters never reach the logs. A key with
/// no `=` is treated as having one empty value.
pub fn redact_query(url: &str) -> String {
    let Some((path, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let redacted: Vec<String> = query
        .split('&')
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let placeholder = if is_list(value) {
                VALUES_PLACEHOLDER
            } else {
                VALUE_PLACEHOLDER
            };
            format!("{}={}", key, placeholder)
        })
        .collect();

    format!("{}?{}", path, redacted.join("&"))
}

// An already redacted list keeps its shape.
fn is_list(value: &str) -> bool {
    value == VALUES_PLACEHOLDER || value.split(LIST_SEPARATOR).count() > 1
}
