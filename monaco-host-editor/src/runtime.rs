use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// The embedded webview, as seen by the bridge.
///
/// Implemented by the host toolkit (WebKitGTK, WKWebView, WebView2, wry...).
/// `evaluate` resolves with the script's result converted to a string, the
/// way webview script APIs report it: strings as-is, other values as JSON.
/// Script failures come back as `Err`.
#[async_trait(?Send)]
pub trait ScriptRuntime {
    /// Start loading `html`. Relative URLs resolve against `base_url`.
    /// Completion is reported back through `on_navigated`.
    fn load_html(&self, html: &str, base_url: Option<&str>);

    async fn evaluate(&self, script: &str) -> Result<String, String>;
}

fn is_absent(raw: &str) -> bool {
    matches!(raw, "" | "null" | "undefined")
}

/// Decode a `JSON.stringify(...)` result.
///
/// Some webviews hand string results back JSON-quoted, so a result that is a
/// JSON string containing JSON is unwrapped once.
pub fn decode_json<T: DeserializeOwned>(raw: &str) -> Result<Option<T>, String> {
    let raw = raw.trim();
    if is_absent(raw) {
        return Ok(None);
    }
    match serde_json::from_str::<T>(raw) {
        Ok(value) => Ok(Some(value)),
        Err(first) => {
            let inner = serde_json::from_str::<String>(raw).map_err(|_| {
                format!("Failed to decode script result: {}", first)
            })?;
            if is_absent(inner.trim()) {
                return Ok(None);
            }
            serde_json::from_str::<T>(&inner)
                .map(Some)
                .map_err(|e| format!("Failed to decode script result: {}", e))
        }
    }
}

/// Decode a string result that may or may not be JSON-quoted.
pub fn decode_string(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if is_absent(trimmed) {
        return None;
    }
    match serde_json::from_str::<String>(trimmed) {
        Ok(value) => Some(value),
        Err(_) => Some(raw.to_string()),
    }
}

/// Truthiness of a boolean script result.
pub fn decode_bool(raw: &str) -> bool {
    match decode_json::<bool>(raw) {
        Ok(Some(value)) => value,
        _ => false,
    }
}
