//! OvirtClient trait for mocking
//!
//! This trait abstracts the transport of OvirtClient to enable mocking in unit tests.
//! The concrete OvirtClient implements this trait, and tests can use MockOvirtClient.
//!
//! The trait is JSON-level on purpose: typed persistence lives in
//! [`Resource`](crate::resource::Resource) and works with any implementation.

use crate::error::OvirtError;
use serde_json::Value;

/// Trait for oVirt API client operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait OvirtClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Check that the engine is reachable and the credentials are accepted
    async fn validate_connection(&self) -> Result<(), OvirtError>;

    /// Href of a top-level collection, looked up by relation (e.g. `vms`)
    fn collection_href(&self, rel: &str) -> Result<String, OvirtError>;

    async fn get_json(&self, href: &str) -> Result<Value, OvirtError>;
    async fn post_json(&self, href: &str, body: &Value) -> Result<Value, OvirtError>;
    async fn put_json(&self, href: &str, body: &Value) -> Result<Value, OvirtError>;
    async fn delete_href(&self, href: &str) -> Result<(), OvirtError>;
}
