//! Query utilities for the oVirt API
//!
//! Provides helpers for building collection queries and decoding
//! collection bodies.

use crate::error::OvirtError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Percent-encode `key=value` pairs joined with `&`
pub fn encode_filters(filters: &[(&str, &str)]) -> String {
    filters
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Append query parameters (e.g. `search`, `max`, `follow`) to an href
pub fn with_query(href: &str, filters: &[(&str, &str)]) -> String {
    if filters.is_empty() {
        return href.to_string();
    }
    let separator = if href.contains('?') { '&' } else { '?' };
    format!("{}{}{}", href, separator, encode_filters(filters))
}

/// Decode a collection body of the form `{"<kind>": [ ... ]}`
///
/// The engine omits the key entirely for an empty collection, and a
/// `null` body is treated the same way.
pub fn collection_items<T: DeserializeOwned>(body: Value, kind: &str) -> Result<Vec<T>, OvirtError> {
    match body {
        Value::Null => Ok(Vec::new()),
        Value::Object(mut map) => match map.remove(kind) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(items @ Value::Array(_)) => Ok(serde_json::from_value(items)?),
            // Single-element collections rendered as a bare object
            Some(item @ Value::Object(_)) => Ok(vec![serde_json::from_value(item)?]),
            Some(other) => Err(OvirtError::Api {
                status: 200,
                fault: crate::models::Fault::detail(format!("unexpected {} collection body: {}", kind, other)),
            }),
        },
        other => Ok(serde_json::from_value(other)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Item {
        name: String,
    }

    #[test]
    fn test_with_query_encodes_search() {
        let href = with_query("/ovirt-engine/api/vms", &[("search", "name=web* and status=up"), ("max", "10")]);
        assert_eq!(href, "/ovirt-engine/api/vms?search=name%3Dweb%2A%20and%20status%3Dup&max=10");
    }

    #[test]
    fn test_with_query_appends_to_existing_query() {
        assert_eq!(with_query("/api/vms?follow=nics", &[("max", "1")]), "/api/vms?follow=nics&max=1");
        assert_eq!(with_query("/api/vms", &[]), "/api/vms");
    }

    #[test]
    fn test_collection_items() {
        let body = serde_json::json!({"vm": [{"name": "a"}, {"name": "b"}]});
        let items: Vec<Item> = collection_items(body, "vm").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].name, "b");
    }

    #[test]
    fn test_empty_collection_body() {
        let items: Vec<Item> = collection_items(serde_json::json!({}), "vm").unwrap();
        assert!(items.is_empty());
        let items: Vec<Item> = collection_items(Value::Null, "vm").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_bare_array_body() {
        let items: Vec<Item> = collection_items(serde_json::json!([{"name": "x"}]), "vm").unwrap();
        assert_eq!(items[0].name, "x");
    }
}
