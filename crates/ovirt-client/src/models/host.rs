//! Host model

use super::{Action, Cluster, Cpu, Meta, OperatingSystem, Version};
use crate::common::wire;
use crate::error::OvirtError;
use crate::ovirt_trait::OvirtClientTrait;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};

/// Host status choices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HostStatus {
    Connecting,
    Down,
    Error,
    Initializing,
    InstallFailed,
    Installing,
    InstallingOs,
    KdumpDetected,
    Maintenance,
    NonOperational,
    NonResponsive,
    PendingApproval,
    PreparingForMaintenance,
    Reboot,
    Unassigned,
    Up,
    #[serde(other)]
    Unknown,
}

/// SSH access the engine uses to manage the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ssh {
    /// `password` or `publickey`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<super::User>,
}

/// Storage pool manager role of the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spm {
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    /// `none`, `contending` or `spm`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerManagement {
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub kdump_detection: Option<bool>,
}

/// A hypervisor host managed by the engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Host {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// FQDN or IP address the engine reaches the host on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<Box<Cluster>>,
    #[serde(default, skip_serializing)]
    pub cpu: Option<Cpu>,
    #[serde(default, skip_serializing)]
    pub external_status: Option<String>,
    #[serde(default, skip_serializing)]
    pub kdump_status: Option<String>,
    #[serde(default, skip_serializing)]
    pub libvirt_version: Option<Version>,
    #[serde(default, with = "wire::opt_u64", skip_serializing)]
    pub max_scheduling_memory: Option<u64>,
    #[serde(default, with = "wire::opt_u64", skip_serializing)]
    pub memory: Option<u64>,
    #[serde(default, skip_serializing)]
    pub os: Option<OperatingSystem>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_management: Option<PowerManagement>,
    /// Only sent when adding the host; never returned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spm: Option<Spm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<Ssh>,
    #[serde(default, skip_serializing)]
    pub status: Option<HostStatus>,
    /// `rhel`, `ovirt_node` or `rhev_h`
    #[serde(rename = "type", default, skip_serializing)]
    pub host_type: Option<String>,
    #[serde(default, with = "wire::opt_bool", skip_serializing)]
    pub update_available: Option<bool>,
    #[serde(default, skip_serializing)]
    pub version: Option<Version>,
}

impl Resource for Host {
    const KIND: &'static str = "host";
    const COLLECTION: &'static str = "hosts";
    const NAME: &'static str = "Host";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

impl Host {
    /// New unsaved host to be installed into a cluster
    pub fn new(name: impl Into<String>, address: impl Into<String>, cluster: Cluster) -> Self {
        Self {
            name: Some(name.into()),
            address: Some(address.into()),
            cluster: Some(Box::new(cluster)),
            ..Default::default()
        }
    }

    /// Whether the host is up and can run VMs
    pub fn is_up(&self) -> bool {
        self.status == Some(HostStatus::Up)
    }

    /// Activates the host for use, for example to run virtual machines
    pub async fn activate<C: OvirtClientTrait + ?Sized>(&self, client: &C, asynchronous: bool) -> Result<(), OvirtError> {
        self.perform(client, "activate", Action::with_async(asynchronous))
            .await
            .map(|_| ())
    }

    /// Deactivates the host to perform maintenance tasks
    pub async fn deactivate<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
        reason: Option<&str>,
        stop_gluster_service: Option<bool>,
    ) -> Result<(), OvirtError> {
        let action = Action {
            asynchronous: Some(asynchronous),
            reason: reason.map(str::to_string),
            stop_gluster_service,
            ..Default::default()
        };
        self.perform(client, "deactivate", action).await.map(|_| ())
    }

    /// Refreshes the host devices and capabilities
    pub async fn refresh_capabilities<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
    ) -> Result<(), OvirtError> {
        self.perform(client, "refresh", Action::with_async(asynchronous))
            .await
            .map(|_| ())
    }
}
