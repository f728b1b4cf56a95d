//! oVirt API models
//!
//! These models match the engine's JSON representation of the v4 API types.
//! Every field is optional: the engine only sends what is set, and a resource
//! used as a reference carries nothing but its `id`/`href`/`name`.

mod cluster;
mod datacenter;
mod host;
mod network;
mod storage;
mod template;
mod vm;

pub use cluster::*;
pub use datacenter::*;
pub use host::*;
pub use network::*;
pub use storage::*;
pub use template::*;
pub use vm::*;

use crate::common::wire;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hyperlink to a resource or collection
///
/// Entries of a `link` array carry `rel` and `href`; reference placeholders
/// (e.g. `vm.host`) carry `id` and `href`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
}

impl Link {
    /// Reference to a resource by id
    pub fn to_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }
}

/// Actions advertised by a resource (`actions.link[]`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actions {
    #[serde(default, rename = "link")]
    pub links: Vec<Link>,
}

/// Addressing block shared by every resource
///
/// `href` is the persistence marker: a resource with an href exists on the
/// engine. `link` and `actions` are server-generated and never sent back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, rename = "link", skip_serializing)]
    pub links: Vec<Link>,
    #[serde(default, skip_serializing)]
    pub actions: Option<Actions>,
}

impl Meta {
    /// Href of the link with the given relation
    pub fn link(&self, rel: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel.as_deref() == Some(rel))
            .and_then(|l| l.href.as_deref())
    }

    /// Whether the engine advertises the given action for this resource
    pub fn has_action(&self, action: &str) -> bool {
        self.actions
            .as_ref()
            .is_some_and(|a| a.links.iter().any(|l| l.rel.as_deref() == Some(action)))
    }
}

/// Engine error document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Fault {
    /// Fault carrying only a detail message
    pub fn detail(detail: impl Into<String>) -> Self {
        Self {
            reason: None,
            detail: Some(detail.into()),
        }
    }

    /// Decode a fault from an error response body, falling back to the raw text
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Fault>(body) {
            Ok(fault) if fault.reason.is_some() || fault.detail.is_some() => fault,
            _ => Fault::detail(body.trim()),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.reason, &self.detail) {
            (Some(reason), Some(detail)) => write!(f, "{}: {}", reason, detail),
            (Some(reason), None) => write!(f, "{}", reason),
            (None, Some(detail)) => write!(f, "{}", detail),
            (None, None) => write!(f, "unknown fault"),
        }
    }
}

/// Body of an action request and of its response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "async", default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub asynchronous: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub collapse_snapshots: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub discard_snapshots: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub exclusive: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub filter: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub maintenance_enabled: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub pause: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub restore_memory: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub stop_gluster_service: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub use_cloud_init: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub use_sysprep: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<Box<Cluster>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<Box<Disk>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Box<Host>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Box<Snapshot>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_domain: Option<Box<StorageDomain>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Box<Template>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm: Option<Box<Vm>>,
    /// Set by the engine in the response: `complete`, `pending`, `failed`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<Fault>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<Link>,
}

impl Action {
    /// Action body with only the `async` flag set
    pub fn with_async(asynchronous: bool) -> Self {
        Self {
            asynchronous: Some(asynchronous),
            ..Default::default()
        }
    }

    /// Whether the engine reported the action as failed
    pub fn is_failed(&self) -> bool {
        self.status.as_deref() == Some("failed") || (self.status.is_none() && self.fault.is_some())
    }
}

/// Version information (product, compatibility, guest OS)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub build: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub major: Option<i64>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub minor: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
}

impl Version {
    /// Compatibility version `major.minor`
    pub fn new(major: i64, minor: i64) -> Self {
        Self {
            major: Some(major),
            minor: Some(minor),
            ..Default::default()
        }
    }
}

/// Product information returned by the API root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub version: Option<Version>,
}

/// Active/total counter in the API summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryCounter {
    #[serde(default, with = "wire::opt_i64")]
    pub active: Option<i64>,
    #[serde(default, with = "wire::opt_i64")]
    pub total: Option<i64>,
}

/// Object counts returned by the API root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSummary {
    #[serde(default)]
    pub hosts: Option<SummaryCounter>,
    #[serde(default)]
    pub storage_domains: Option<SummaryCounter>,
    #[serde(default)]
    pub users: Option<SummaryCounter>,
    #[serde(default)]
    pub vms: Option<SummaryCounter>,
}

/// The API entry point document: product info plus links to every collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiRoot {
    #[serde(default, rename = "link")]
    pub links: Vec<Link>,
    #[serde(default)]
    pub product_info: Option<ProductInfo>,
    #[serde(default)]
    pub summary: Option<ApiSummary>,
    #[serde(default, with = "wire::opt_i64")]
    pub time: Option<i64>,
}

impl ApiRoot {
    /// Href of the collection with the given relation (e.g. `vms`)
    pub fn link(&self, rel: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel.as_deref() == Some(rel))
            .and_then(|l| l.href.as_deref())
    }
}

/// Convert an epoch-milliseconds timestamp into a UTC date
pub(crate) fn epoch_millis(value: Option<i64>) -> Option<chrono::DateTime<chrono::Utc>> {
    value.and_then(chrono::DateTime::from_timestamp_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_links_are_not_sent_back() {
        let meta: Meta = serde_json::from_value(serde_json::json!({
            "id": "123",
            "href": "/ovirt-engine/api/vms/123",
            "link": [{"href": "/ovirt-engine/api/vms/123/nics", "rel": "nics"}],
            "actions": {"link": [{"href": "/ovirt-engine/api/vms/123/start", "rel": "start"}]}
        }))
        .unwrap();

        assert_eq!(meta.link("nics"), Some("/ovirt-engine/api/vms/123/nics"));
        assert!(meta.has_action("start"));
        assert!(!meta.has_action("stop"));

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json, serde_json::json!({"id": "123", "href": "/ovirt-engine/api/vms/123"}));
    }

    #[test]
    fn test_fault_from_body() {
        let fault = Fault::from_body(r#"{"reason":"Operation Failed","detail":"[Cannot add VM. Name in use.]"}"#);
        assert_eq!(fault.reason.as_deref(), Some("Operation Failed"));
        assert_eq!(fault.to_string(), "Operation Failed: [Cannot add VM. Name in use.]");

        let fault = Fault::from_body("<html>Service Unavailable</html>");
        assert_eq!(fault.detail.as_deref(), Some("<html>Service Unavailable</html>"));
        assert!(fault.reason.is_none());
    }

    #[test]
    fn test_action_body_wire_form() {
        let mut action = Action::with_async(false);
        action.force = Some(true);
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json, serde_json::json!({"async": "false", "force": "true"}));
    }

    #[test]
    fn test_failed_action_response() {
        let action: Action = serde_json::from_value(serde_json::json!({
            "status": "failed",
            "fault": {"reason": "Operation Failed", "detail": "VM is locked"}
        }))
        .unwrap();
        assert!(action.is_failed());

        let action: Action = serde_json::from_value(serde_json::json!({"status": "complete"})).unwrap();
        assert!(!action.is_failed());
    }

    #[test]
    fn test_api_root_links() {
        let root: ApiRoot = serde_json::from_value(serde_json::json!({
            "link": [
                {"href": "/ovirt-engine/api/vms", "rel": "vms"},
                {"href": "/ovirt-engine/api/datacenters", "rel": "datacenters"}
            ],
            "product_info": {"name": "oVirt Engine", "version": {"major": "4", "minor": "5", "full_version": "4.5.4-1"}},
            "time": 1700000000000_i64
        }))
        .unwrap();

        assert_eq!(root.link("datacenters"), Some("/ovirt-engine/api/datacenters"));
        assert_eq!(root.link("hosts"), None);
        let version = root.product_info.unwrap().version.unwrap();
        assert_eq!((version.major, version.minor), (Some(4), Some(5)));
    }
}
