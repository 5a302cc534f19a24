//! Request/response shapes of the public key-value service
//!
//! Kept free of browser types so the URL layout and response parsing are
//! testable natively.

use percent_encoding::utf8_percent_encode;

use crate::persistence::codec::URI_COMPONENT;

/// Public service the leaderboard lives on
pub const DEFAULT_BASE_URL: &str = "https://keyvalue.immanuel.co/api/KeyVal";

/// Build `{base}/{action}/{collection}/{key}[/{value}]` with every path
/// segment escaped (base64 values contain `/` and `+`)
pub fn value_url(base: &str, action: &str, collection: &str, key: &str, value: Option<&str>) -> String {
    let escape = |s: &str| utf8_percent_encode(s, URI_COMPONENT).to_string();
    let mut url = format!(
        "{}/{}/{}/{}",
        base.trim_end_matches('/'),
        action,
        escape(collection),
        escape(key)
    );
    if let Some(value) = value {
        url.push('/');
        url.push_str(&escape(value));
    }
    url
}

/// Interpret a GET response body. The service answers with JSON: a quoted
/// string, a bare number, or `null`/nothing for unknown keys.
pub fn parse_value(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Null) => None,
        Ok(serde_json::Value::String(s)) => Some(s),
        Ok(serde_json::Value::Number(n)) => Some(n.to_string()),
        // Anything else is passed through untouched
        _ => Some(body.to_string()),
    }
}
