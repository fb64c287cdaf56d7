// Error message resolution for log rows
use serde_json::Value;

/// Resolve the human-readable message of a row
///
/// Gateway rows usually carry the API's JSON error body. When the text is
/// a JSON object with a non-empty `message`, that message is returned;
/// anything else (plain text, malformed JSON, other JSON shapes) comes back
/// unchanged. Never fails.
pub fn resolve_message(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(body)) => match body.get("message") {
            Some(Value::String(message)) if !message.is_empty() => message.clone(),
            Some(Value::Null) | Some(Value::String(_)) | None => raw.to_string(),
            Some(other) => other.to_string(),
        },
        _ => raw.to_string(),
    }
}
