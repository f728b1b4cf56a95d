//! Cluster model

use super::{Cpu, DataCenter, Host, Link, MemoryPolicy, Meta, Network, Version};
use crate::common::wire;
use crate::error::OvirtError;
use crate::ovirt_trait::OvirtClientTrait;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};

/// What the cluster does with its VMs when a host becomes non-operational
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorHandling {
    /// `migrate`, `migrate_highly_available` or `do_not_migrate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<String>,
}

/// A cluster of hosts sharing CPU type, networks and storage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub ballooning_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bios_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Cpu>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_center: Option<Box<DataCenter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_handling: Option<ErrorHandling>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firewall_type: Option<String>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub gluster_service: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub ha_reservation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_pool: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_policy: Option<MemoryPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling_policy: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_type: Option<String>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub threads_as_cores: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub trusted_service: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub virt_service: Option<bool>,
}

impl Resource for Cluster {
    const KIND: &'static str = "cluster";
    const COLLECTION: &'static str = "clusters";
    const NAME: &'static str = "Cluster";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

impl Cluster {
    /// New unsaved cluster in the given data center
    pub fn new(name: impl Into<String>, data_center: DataCenter) -> Self {
        Self {
            name: Some(name.into()),
            data_center: Some(Box::new(data_center)),
            ..Default::default()
        }
    }

    /// Reference to a cluster by name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Hosts that are members of this cluster
    ///
    /// Searches by cluster name, or by id for a reference without a name.
    pub async fn hosts<C: OvirtClientTrait + ?Sized>(&self, client: &C) -> Result<Vec<Host>, OvirtError> {
        let search = match (self.name.as_deref(), self.id()) {
            (Some(name), _) => format!("cluster={}", name),
            (None, Some(id)) => format!("cluster.id={}", id),
            (None, None) => return Err(OvirtError::NotPersisted(Self::NAME)),
        };
        Host::query(client, &[("search", search.as_str())]).await
    }

    /// Logical networks assigned to this cluster
    pub async fn networks<C: OvirtClientTrait + ?Sized>(&self, client: &C) -> Result<Vec<Network>, OvirtError> {
        Network::list_in(client, self).await
    }
}
