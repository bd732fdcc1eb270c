use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use http::HeaderMap;
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Body of a captured request, carried verbatim from capture to forward.
///
/// JSON bodies stay structured so they can be re-sent as JSON; anything
/// else is carried as raw bytes. No schema is assumed either way.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Raw(Vec<u8>),
    Empty,
}

impl Payload {
    /// Classify a captured body from its content type and bytes.
    ///
    /// A body is parsed as JSON when the content type says so, or when
    /// no content type was sent and the bytes happen to parse. A JSON
    /// content type with unparseable bytes falls back to raw.
    pub fn from_bytes(content_type: Option<&str>, bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::Empty;
        }
        let try_json = content_type.map(|ct| ct.contains("json")).unwrap_or(true);
        if try_json {
            if let Ok(value) = serde_json::from_slice(bytes) {
                return Self::Json(value);
            }
        }
        Self::Raw(bytes.to_vec())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Json(value) => value.serialize(serializer),
            Self::Raw(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
            Self::Empty => serializer.serialize_none(),
        }
    }
}

/// One intercepted request awaiting operator disposition.
///
/// Entries are immutable value objects: created by capture, read by the
/// inspection page and the manage path, and destroyed by eviction,
/// deletion, or release. Serialized camelCase to match the capture
/// acknowledgment wire format.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedEntry {
    pub id: Uuid,
    pub captured_on: DateTime<Utc>,
    pub method: String,
    pub target_url: String,
    /// Allow-listed headers only; keys lowercased, values verbatim.
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: Payload,
}

impl CapturedEntry {
    /// Mint a new entry with a fresh id and the current time.
    pub fn new(
        method: String,
        target_url: String,
        headers: BTreeMap<String, Vec<String>>,
        body: Payload,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            captured_on: Utc::now(),
            method,
            target_url,
            headers,
            body,
        }
    }

    /// `"METHOD url"`, as used in logs and transport-failure reports.
    pub fn request_line(&self) -> String {
        format!("{} {}", self.method, self.target_url)
    }

    /// Plain-text rendering: request line, then headers sorted by name,
    /// then the pretty-printed body, blank-line separated.
    pub fn format_for_display(&self) -> String {
        let mut display = self.request_line();
        let headers = self
            .headers
            .iter()
            .map(|(name, values)| format!("{name}: {}", values.join(", ")))
            .collect::<Vec<_>>()
            .join("\n");
        if !headers.is_empty() {
            display.push_str("\n\n");
            display.push_str(&headers);
        }
        let body = match &self.body {
            Payload::Json(value) => serde_json::to_string_pretty(value).unwrap_or_default(),
            Payload::Raw(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Payload::Empty => String::new(),
        };
        if !body.is_empty() {
            display.push_str("\n\n");
            display.push_str(&body);
        }
        display
    }
}

/// Keep only headers whose name is on the allow-list.
///
/// Keys come out lowercased (header names are case-insensitive), values
/// are kept exactly as received; repeated headers keep all values.
pub fn filter_headers(headers: &HeaderMap, allow: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut filtered: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        let name = name.as_str();
        if !allow.iter().any(|allowed| allowed.eq_ignore_ascii_case(name)) {
            continue;
        }
        filtered
            .entry(name.to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderName, HeaderValue};
    use serde_json::json;

    fn allow(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn filters_headers_case_insensitively() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        headers.insert("example", HeaderValue::from_static("x"));

        let filtered = filter_headers(&headers, &allow(&["authorization"]));

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered["authorization"], vec!["Basic abc"]);
    }

    #[test]
    fn keeps_repeated_header_values() {
        let mut headers = HeaderMap::new();
        let name = HeaderName::from_static("x-trace");
        headers.append(&name, HeaderValue::from_static("one"));
        headers.append(&name, HeaderValue::from_static("two"));

        let filtered = filter_headers(&headers, &allow(&["X-Trace"]));

        assert_eq!(filtered["x-trace"], vec!["one", "two"]);
    }

    #[test]
    fn classifies_payloads() {
        assert_eq!(Payload::from_bytes(None, b""), Payload::Empty);
        assert_eq!(
            Payload::from_bytes(Some("application/json"), br#"{"a":1}"#),
            Payload::Json(json!({"a": 1}))
        );
        assert_eq!(
            Payload::from_bytes(Some("text/plain"), b"hello"),
            Payload::Raw(b"hello".to_vec())
        );
        // JSON content type with a broken body stays opaque
        assert_eq!(
            Payload::from_bytes(Some("application/json"), b"{broken"),
            Payload::Raw(b"{broken".to_vec())
        );
    }

    #[test]
    fn entry_serializes_camel_case() {
        let entry = CapturedEntry::new(
            "POST".into(),
            "http://example.test/hook".into(),
            BTreeMap::new(),
            Payload::Json(json!({"a": 1})),
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["targetUrl"], "http://example.test/hook");
        assert!(value["capturedOn"].is_string());
        assert_eq!(value["body"]["a"], 1);
    }

    #[test]
    fn display_format_orders_headers_by_name() {
        let mut headers = BTreeMap::new();
        headers.insert("b-header".to_string(), vec!["2".to_string()]);
        headers.insert("a-header".to_string(), vec!["1".to_string()]);
        let entry = CapturedEntry::new(
            "GET".into(),
            "http://example.test".into(),
            headers,
            Payload::Empty,
        );

        let display = entry.format_for_display();
        assert!(display.starts_with("GET http://example.test\n\na-header: 1\nb-header: 2"));
    }
}
