//! Common utilities for the oVirt API client
//!
//! Provides the authenticated HTTP wrapper shared by every resource type.

pub mod query;
pub mod wire;

use crate::error::OvirtError;
use crate::models::Fault;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

/// HTTP client wrapper with authentication
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    base: Url,
    auth: String,
    debug_transport: bool,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("auth", &"<redacted>")
            .field("debug_transport", &self.debug_transport)
            .finish()
    }
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    ///
    /// # Arguments
    /// * `client` - Configured reqwest client
    /// * `base_url` - API entry point (e.g., "https://engine/ovirt-engine/api")
    /// * `auth` - Value of the `Authorization` header
    /// * `debug_transport` - Log full request and response bodies
    pub fn new(client: Client, base_url: &str, auth: String, debug_transport: bool) -> Result<Self, OvirtError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&format!("{}/", base_url))
            .map_err(|e| OvirtError::InvalidConfig(format!("invalid engine URL {}: {}", base_url, e)))?;

        Ok(Self {
            client,
            base_url,
            base,
            auth,
            debug_transport,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from an href
    ///
    /// Absolute URLs pass through, absolute paths (`/ovirt-engine/api/vms/1`)
    /// are resolved against the engine origin and relative paths against the
    /// API base.
    pub fn build_url(&self, href: &str) -> Result<Url, OvirtError> {
        let parsed = if href.starts_with("http://") || href.starts_with("https://") {
            Url::parse(href)
        } else {
            self.base.join(href)
        };
        parsed.map_err(|e| OvirtError::InvalidConfig(format!("invalid href {}: {}", href, e)))
    }

    /// Make a GET request
    pub async fn get(&self, href: &str) -> Result<Value, OvirtError> {
        self.send(Method::GET, href, None).await
    }

    /// Make a POST request
    pub async fn post(&self, href: &str, body: &Value) -> Result<Value, OvirtError> {
        self.send(Method::POST, href, Some(body)).await
    }

    /// Make a PUT request
    pub async fn put(&self, href: &str, body: &Value) -> Result<Value, OvirtError> {
        self.send(Method::PUT, href, Some(body)).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, href: &str) -> Result<(), OvirtError> {
        self.send(Method::DELETE, href, None).await?;
        Ok(())
    }

    async fn send(&self, method: Method, href: &str, body: Option<&Value>) -> Result<Value, OvirtError> {
        let url = self.build_url(href)?;

        if self.debug_transport {
            let dump = body
                .map(|b| serde_json::to_string_pretty(b).unwrap_or_default())
                .unwrap_or_default();
            info!(target: "ovirt_client::transport", ">>> {} {}\n{}", method, url, dump);
        } else {
            debug!("{} {}", method, url);
        }

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header("Authorization", &self.auth)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request
                .header("Content-Type", "application/json")
                .json(body);
        }

        let response = request.send().await.map_err(OvirtError::Http)?;
        let status = response.status();
        let text = response.text().await?;

        if self.debug_transport {
            info!(target: "ovirt_client::transport", "<<< {} {} {}\n{}", status, method, url, text);
        }

        if !status.is_success() {
            return Err(status_error(&method, &url, status, &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            debug!(
                "error decoding response body from {} {}: {} - Response (first 500 chars): {}",
                method,
                url,
                e,
                text.chars().take(500).collect::<String>()
            );
            OvirtError::Serialization(e)
        })
    }
}

/// Map a non-success response to the matching error variant
pub(crate) fn status_error(method: &Method, url: &Url, status: StatusCode, body: &str) -> OvirtError {
    let fault = Fault::from_body(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            OvirtError::Authentication(format!("{} {} failed: {} - {}", method, url, status, fault))
        }
        StatusCode::NOT_FOUND => OvirtError::NotFound(format!("Resource not found: {} - {}", url.path(), fault)),
        _ => OvirtError::Api {
            status: status.as_u16(),
            fault,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http() -> HttpClient {
        HttpClient::new(
            Client::new(),
            "https://engine.example.com/ovirt-engine/api/",
            "Bearer t0k3n".to_string(),
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_build_url() {
        let http = http();
        assert_eq!(http.base_url(), "https://engine.example.com/ovirt-engine/api");
        assert_eq!(
            http.build_url("/ovirt-engine/api/vms/123").unwrap().as_str(),
            "https://engine.example.com/ovirt-engine/api/vms/123"
        );
        assert_eq!(
            http.build_url("vms?search=name%3Dweb").unwrap().as_str(),
            "https://engine.example.com/ovirt-engine/api/vms?search=name%3Dweb"
        );
        assert_eq!(
            http.build_url("https://other.example.com/ovirt-engine/api").unwrap().as_str(),
            "https://other.example.com/ovirt-engine/api"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = HttpClient::new(Client::new(), "not a url", String::new(), false).unwrap_err();
        assert!(matches!(err, OvirtError::InvalidConfig(_)));
    }

    #[test]
    fn test_status_error_mapping() {
        let url = Url::parse("https://engine.example.com/ovirt-engine/api/vms/1").unwrap();

        let err = status_error(&Method::GET, &url, StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, OvirtError::Authentication(_)));

        let err = status_error(&Method::GET, &url, StatusCode::NOT_FOUND, "");
        assert!(err.is_not_found());

        let body = r#"{"reason":"Operation Failed","detail":"[Cannot remove VM. VM is running.]"}"#;
        match status_error(&Method::DELETE, &url, StatusCode::CONFLICT, body) {
            OvirtError::Api { status, fault } => {
                assert_eq!(status, 409);
                assert_eq!(fault.detail.as_deref(), Some("[Cannot remove VM. VM is running.]"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_debug_hides_credentials() {
        assert!(!format!("{:?}", http()).contains("t0k3n"));
    }
}
