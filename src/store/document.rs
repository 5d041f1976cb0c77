use serde::Deserialize;
use serde_json::Value;

/// Page of documents as returned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList {
    pub total: i64,
    pub documents: Vec<Value>,
}

/// String attribute accessor; missing or non-string fields read as "".
pub fn str_field(doc: &Value, field: &str) -> String {
    doc.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

pub fn bool_field(doc: &Value, field: &str) -> bool {
    doc.get(field).and_then(Value::as_bool).unwrap_or(false)
}

pub fn i64_field(doc: &Value, field: &str) -> i64 {
    doc.get(field).and_then(Value::as_i64).unwrap_or(0)
}

/// Decode an attribute that holds JSON serialized into a string (the store
/// has no nested-document type, so `sources`, `capabilities` and
/// `preferences` are persisted as strings). A corrupted value must not fail
/// the surrounding request: it degrades to `default` and logs a warning.
pub fn decode_embedded_json(doc: &Value, field: &str, default: Value) -> Value {
    let Some(raw) = doc.get(field) else {
        return default;
    };

    // Tolerate documents written before the field was stringified
    if raw.is_array() || raw.is_object() {
        return raw.clone();
    }

    let Some(text) = raw.as_str() else {
        return default;
    };
    if text.trim().is_empty() {
        return default;
    }

    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(field, error = %err, "failed to decode embedded JSON field, using default");
            default
        }
    }
}
