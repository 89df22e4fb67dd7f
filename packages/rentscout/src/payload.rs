//! Embedded-JSON payload extraction.
//!
//! The target site renders search results server-side and ships the full
//! result set as one JSON document inside a script tag. Extraction works on
//! the raw text by locating the anchor's open and close boundaries — no DOM
//! parsing — and fails explicitly when the anchor is absent.

use serde_json::Value;

use crate::error::PayloadError;

/// The textual boundaries of the embedded payload.
///
/// The open boundary must match the element's exact attribute signature so a
/// page carrying several script tags still yields exactly one payload.
#[derive(Debug, Clone)]
pub struct PayloadAnchor {
    pub open: String,
    pub close: String,
}

impl Default for PayloadAnchor {
    /// The Next.js data script tag.
    fn default() -> Self {
        Self {
            open: r#"<script id="__NEXT_DATA__" type="application/json" crossorigin="anonymous">"#
                .to_string(),
            close: "</script>".to_string(),
        }
    }
}

/// Extract and parse the single JSON payload between the anchor boundaries.
pub fn extract_embedded_json(html: &str, anchor: &PayloadAnchor) -> Result<Value, PayloadError> {
    let start = html.find(&anchor.open).ok_or(PayloadError::AnchorMissing)? + anchor.open.len();
    let len = html[start..]
        .find(&anchor.close)
        .ok_or(PayloadError::AnchorMissing)?;
    Ok(serde_json::from_str(&html[start..start + len])?)
}

/// Pull the `listing` objects out of a search payload.
///
/// Entries without a `listing` key are dropped; a missing listings array is a
/// shape failure for the whole page.
pub fn page_listings(payload: &Value) -> Result<Vec<Value>, PayloadError> {
    let entries = payload
        .pointer("/props/pageProps/listings")
        .and_then(Value::as_array)
        .ok_or_else(|| PayloadError::Shape {
            path: "props.pageProps.listings".into(),
        })?;

    Ok(entries
        .iter()
        .filter_map(|entry| entry.get("listing").cloned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(json: &str) -> String {
        format!(
            r#"<html><head><script src="app.js"></script></head><body><script id="__NEXT_DATA__" type="application/json" crossorigin="anonymous">{json}</script></body></html>"#
        )
    }

    #[test]
    fn extracts_payload_between_boundaries() {
        let html = wrap(r#"{"props":{"pageProps":{"listings":[]}}}"#);
        let payload = extract_embedded_json(&html, &PayloadAnchor::default()).unwrap();
        assert!(payload.pointer("/props/pageProps/listings").is_some());
    }

    #[test]
    fn missing_anchor_is_explicit() {
        let html = "<html><body>no data script here</body></html>";
        let err = extract_embedded_json(html, &PayloadAnchor::default()).unwrap_err();
        assert!(matches!(err, PayloadError::AnchorMissing));
    }

    #[test]
    fn unclosed_anchor_is_explicit() {
        let html = r#"<script id="__NEXT_DATA__" type="application/json" crossorigin="anonymous">{"truncated": true"#;
        let err = extract_embedded_json(html, &PayloadAnchor::default()).unwrap_err();
        assert!(matches!(err, PayloadError::AnchorMissing));
    }

    #[test]
    fn malformed_json_is_a_payload_error() {
        let html = wrap("{not json");
        let err = extract_embedded_json(&html, &PayloadAnchor::default()).unwrap_err();
        assert!(matches!(err, PayloadError::Json(_)));
    }

    #[test]
    fn custom_anchor_is_honored() {
        let anchor = PayloadAnchor {
            open: "<data>".into(),
            close: "</data>".into(),
        };
        let payload = extract_embedded_json("<data>{\"x\":1}</data>", &anchor).unwrap();
        assert_eq!(payload["x"], 1);
    }

    #[test]
    fn page_listings_unwraps_listing_objects() {
        let payload: Value = serde_json::from_str(
            r#"{"props":{"pageProps":{"listings":[
                {"listing":{"seoFriendlyPath":"/a"}},
                {"savedAd":true},
                {"listing":{"seoFriendlyPath":"/b"}}
            ]}}}"#,
        )
        .unwrap();

        let listings = page_listings(&payload).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0]["seoFriendlyPath"], "/a");
    }

    #[test]
    fn page_listings_missing_array_is_shape_failure() {
        let payload: Value = serde_json::from_str(r#"{"props":{}}"#).unwrap();
        let err = page_listings(&payload).unwrap_err();
        assert!(matches!(err, PayloadError::Shape { .. }));
    }
}
