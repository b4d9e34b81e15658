use std::io::Read;

use anyhow::Result;
use axum::http::HeaderMap;
use flate2::read::GzDecoder;

use backend_domain::{IngestEnvelope, RawTrackingEvent, RuntimeConfig};

/// The ops and stream surfaces are public when no token is configured, which
/// is how local development runs. Production sets `ops_token`.
pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(ops_token) = &config.ops_token {
        return extract_bearer(headers)
            .map(|v| v == *ops_token)
            .unwrap_or(false);
    }
    true
}

/// Ingest credentials ride in `X-API-Key`, not in `Authorization`, so the
/// two auth surfaces cannot be confused for one another.
pub fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("x-api-key")?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

pub fn parse_batch(headers: &HeaderMap, body: &[u8]) -> Result<Vec<RawTrackingEvent>> {
    let content = maybe_gunzip(headers, body)?;
    let envelope: IngestEnvelope = serde_json::from_str(&content)?;
    Ok(envelope.events)
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8]) -> Result<String> {
    if let Some(encoding) = headers.get("Content-Encoding") {
        if encoding.to_str().unwrap_or("") == "gzip" {
            let mut decoder = GzDecoder::new(body);
            let mut out = String::new();
            decoder.read_to_string(&mut out)?;
            return Ok(out);
        }
    }
    Ok(String::from_utf8(body.to_vec())?)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn api_key_header_is_trimmed_and_blank_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("  key-1  "));
        assert_eq!(extract_api_key(&headers).as_deref(), Some("key-1"));

        headers.insert("x-api-key", HeaderValue::from_static("   "));
        assert!(extract_api_key(&headers).is_none());
    }

    #[test]
    fn parse_batch_rejects_non_list_events() {
        let headers = HeaderMap::new();
        let body = br#"{"events": "not a list"}"#;
        assert!(parse_batch(&headers, body).is_err());
    }

    #[test]
    fn parse_batch_accepts_gzip_body() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let raw = br#"{"events": [{"type": "pageview", "sessionId": "s1"}]}"#;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(raw).expect("compress body");
        let compressed = encoder.finish().expect("finish gzip");

        let mut headers = HeaderMap::new();
        headers.insert("Content-Encoding", HeaderValue::from_static("gzip"));
        let events = parse_batch(&headers, &compressed).expect("parse gzip batch");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "pageview");
    }
}
