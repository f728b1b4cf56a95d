//! Storage models: storage domains, disks and disk attachments

use super::{Action, DataCenter, Host, Meta, Template, Vm};
use crate::common::wire;
use crate::error::OvirtError;
use crate::ovirt_trait::OvirtClientTrait;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};

const GIB: u64 = 1024 * 1024 * 1024;

/// Storage domain status choices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageDomainStatus {
    Activating,
    Active,
    Detaching,
    Inactive,
    Locked,
    Maintenance,
    Mixed,
    PreparingForMaintenance,
    Unattached,
    #[serde(other)]
    Unknown,
}

/// Connection details of the storage backing a domain
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostStorage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_options: Option<String>,
    /// `auto`, `v3`, `v4`, `v4_1`, `v4_2`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nfs_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// `nfs`, `iscsi`, `fcp`, `localfs`, `posixfs`, `glusterfs`, ...
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vfs_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataCenters {
    #[serde(default)]
    pub data_center: Vec<DataCenter>,
}

/// A storage domain: an NFS export, a LUN group, a local directory, ...
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageDomain {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, with = "wire::opt_u64", skip_serializing)]
    pub available: Option<u64>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub backup: Option<bool>,
    #[serde(default, with = "wire::opt_u64", skip_serializing)]
    pub committed: Option<u64>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub critical_space_action_blocker: Option<i64>,
    #[serde(default, skip_serializing)]
    pub data_centers: Option<DataCenters>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub discard_after_delete: Option<bool>,
    #[serde(default, skip_serializing)]
    pub external_status: Option<String>,
    /// Host used to connect the storage when the domain is added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Box<Host>>,
    #[serde(default, with = "wire::opt_bool", skip_serializing)]
    pub master: Option<bool>,
    #[serde(default, skip_serializing)]
    pub status: Option<StorageDomainStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<HostStorage>,
    /// `v1` .. `v5`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_format: Option<String>,
    /// `data`, `iso`, `export`, `image`, `volume`, `managed_block_storage`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub domain_type: Option<String>,
    #[serde(default, with = "wire::opt_u64", skip_serializing)]
    pub used: Option<u64>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub warning_low_space_indicator: Option<i64>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub wipe_after_delete: Option<bool>,
}

impl Resource for StorageDomain {
    const KIND: &'static str = "storage_domain";
    const COLLECTION: &'static str = "storagedomains";
    const NAME: &'static str = "StorageDomain";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

impl StorageDomain {
    /// New unsaved NFS data domain, connected through the given host
    pub fn nfs(name: impl Into<String>, address: impl Into<String>, path: impl Into<String>, host: Host) -> Self {
        Self {
            name: Some(name.into()),
            domain_type: Some("data".to_string()),
            host: Some(Box::new(host)),
            storage: Some(HostStorage {
                address: Some(address.into()),
                path: Some(path.into()),
                storage_type: Some("nfs".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Reference to a storage domain by name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Whether the domain is attached to at least one data center
    pub fn is_attached(&self) -> bool {
        self.data_centers.as_ref().is_some_and(|dcs| !dcs.data_center.is_empty())
    }

    /// Free space in whole GiB, when the engine reported it
    pub fn available_gib(&self) -> Option<u64> {
        self.available.map(|bytes| bytes / GIB)
    }
}

/// Disk image format choices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiskFormat {
    Cow,
    Raw,
    #[serde(other)]
    Unknown,
}

impl wire::Choice for DiskFormat {
    fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// Disk status choices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiskStatus {
    Illegal,
    Locked,
    Ok,
    #[serde(other)]
    Unknown,
}

/// Bus a disk is attached to a VM through
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiskInterface {
    Ide,
    Sata,
    SpaprVscsi,
    Virtio,
    VirtioScsi,
    #[serde(other)]
    Unknown,
}

impl wire::Choice for DiskInterface {
    fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageDomains {
    #[serde(default)]
    pub storage_domain: Vec<StorageDomain>,
}

/// A virtual disk image
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Disk {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, with = "wire::opt_u64", skip_serializing)]
    pub actual_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// `data`, `iso`, `memory_dump_volume`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "wire::skip_choice")]
    pub format: Option<DiskFormat>,
    #[serde(default, skip_serializing)]
    pub image_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub logical_name: Option<String>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub propagate_errors: Option<bool>,
    /// Virtual size in bytes
    #[serde(default, with = "wire::opt_u64", skip_serializing_if = "Option::is_none")]
    pub provisioned_size: Option<u64>,
    /// `qcow2_v2` or `qcow2_v3`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qcow_version: Option<String>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub shareable: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub sparse: Option<bool>,
    #[serde(default, skip_serializing)]
    pub status: Option<DiskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_domains: Option<StorageDomains>,
    /// `image`, `lun`, `cinder`, `managed_block_storage`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<String>,
    #[serde(default, with = "wire::opt_u64", skip_serializing)]
    pub total_size: Option<u64>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub wipe_after_delete: Option<bool>,
}

impl Resource for Disk {
    const KIND: &'static str = "disk";
    const COLLECTION: &'static str = "disks";
    const NAME: &'static str = "Disk";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

impl Disk {
    /// New unsaved disk image on the given storage domain
    pub fn new(name: impl Into<String>, provisioned_size: u64, format: DiskFormat, storage_domain: StorageDomain) -> Self {
        Self {
            name: Some(name.into()),
            provisioned_size: Some(provisioned_size),
            sparse: Some(format == DiskFormat::Cow),
            format: Some(format),
            storage_domains: Some(StorageDomains {
                storage_domain: vec![storage_domain],
            }),
            ..Default::default()
        }
    }

    /// Virtual size in whole GiB
    pub fn provisioned_size_gib(&self) -> Option<u64> {
        self.provisioned_size.map(|bytes| bytes / GIB)
    }

    /// Whether the disk is usable (not locked or illegal)
    pub fn is_ok(&self) -> bool {
        self.status == Some(DiskStatus::Ok)
    }

    /// Copies the disk to another storage domain, optionally under a new name
    pub async fn copy<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
        storage_domain: StorageDomain,
        new_name: Option<&str>,
    ) -> Result<(), OvirtError> {
        let action = Action {
            asynchronous: Some(asynchronous),
            storage_domain: Some(Box::new(storage_domain)),
            disk: new_name.map(|name| {
                Box::new(Disk {
                    name: Some(name.to_string()),
                    ..Default::default()
                })
            }),
            ..Default::default()
        };
        self.perform(client, "copy", action).await.map(|_| ())
    }

    /// Moves the disk to another storage domain
    pub async fn move_to<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
        storage_domain: StorageDomain,
    ) -> Result<(), OvirtError> {
        let action = Action {
            asynchronous: Some(asynchronous),
            storage_domain: Some(Box::new(storage_domain)),
            ..Default::default()
        };
        self.perform(client, "move", action).await.map(|_| ())
    }
}

/// The attachment of a disk to a virtual machine or template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskAttachment {
    #[serde(flatten)]
    pub meta: Meta,
    /// Defines whether the disk is active in the virtual machine it's attached to.
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Defines whether the disk is bootable.
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub bootable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The type of interface driver used to connect the disk device to the virtual machine.
    #[serde(default, skip_serializing_if = "wire::skip_choice")]
    pub interface: Option<DiskInterface>,
    /// The logical name of the disk, as seen from inside the virtual machine.
    #[serde(default, skip_serializing)]
    pub logical_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Defines whether the virtual machine passes discard commands to the storage.
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub pass_discard: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub uses_scsi_reservation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<Box<Disk>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Box<Template>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm: Option<Box<Vm>>,
}

impl Resource for DiskAttachment {
    const KIND: &'static str = "disk_attachment";
    const COLLECTION: &'static str = "diskattachments";
    const NAME: &'static str = "DiskAttachment";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

impl DiskAttachment {
    /// New attachment of a disk (existing or to be created with the attachment)
    pub fn new(disk: Disk, interface: DiskInterface, bootable: bool) -> Self {
        Self {
            active: Some(true),
            bootable: Some(bootable),
            interface: Some(interface),
            disk: Some(Box::new(disk)),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockOvirtClient;

    #[test]
    fn test_new_disk_wire_form() {
        let disk = Disk::new("data", 10 * GIB, DiskFormat::Cow, StorageDomain::named("nfs-data"));
        let json = serde_json::to_value(&disk).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "data",
                "format": "cow",
                "provisioned_size": "10737418240",
                "sparse": "true",
                "storage_domains": {"storage_domain": [{"name": "nfs-data"}]}
            })
        );
        assert_eq!(disk.provisioned_size_gib(), Some(10));
    }

    #[test]
    fn test_decode_disk_attachment() {
        let attachment: DiskAttachment = serde_json::from_value(serde_json::json!({
            "id": "d1",
            "href": "/ovirt-engine/api/vms/v1/diskattachments/d1",
            "active": "true",
            "bootable": "true",
            "interface": "virtio_scsi",
            "logical_name": "/dev/sda",
            "pass_discard": "false",
            "disk": {"href": "/ovirt-engine/api/disks/d1", "id": "d1"},
            "vm": {"href": "/ovirt-engine/api/vms/v1", "id": "v1"}
        }))
        .unwrap();

        assert_eq!(attachment.interface, Some(DiskInterface::VirtioScsi));
        assert_eq!(attachment.bootable, Some(true));
        assert_eq!(attachment.disk.as_ref().and_then(|d| d.href()), Some("/ovirt-engine/api/disks/d1"));
    }

    #[test]
    fn test_unrecognised_choices_are_not_sent_back() {
        let disk: Disk = serde_json::from_value(serde_json::json!({
            "href": "/ovirt-engine/api/disks/d1",
            "id": "d1",
            "name": "data",
            "format": "qcow3",
            "sparse": "true"
        }))
        .unwrap();
        assert_eq!(disk.format, Some(DiskFormat::Unknown));

        let body = serde_json::to_value(&disk).unwrap();
        assert!(body.get("format").is_none());
        assert_eq!(body["name"], "data");

        let attachment: DiskAttachment =
            serde_json::from_value(serde_json::json!({"interface": "nvme", "bootable": "true"})).unwrap();
        let body = serde_json::to_value(&attachment).unwrap();
        assert!(body.get("interface").is_none());

        let mut attachment = attachment;
        attachment.interface = Some(DiskInterface::VirtioScsi);
        assert_eq!(serde_json::to_value(&attachment).unwrap()["interface"], "virtio_scsi");
    }

    #[test]
    fn test_storage_domain_helpers() {
        let sd: StorageDomain = serde_json::from_value(serde_json::json!({
            "name": "nfs-data",
            "available": "53687091200",
            "type": "data",
            "data_centers": {"data_center": [{"id": "dc1"}]}
        }))
        .unwrap();
        assert!(sd.is_attached());
        assert_eq!(sd.available_gib(), Some(50));
        assert!(!StorageDomain::named("x").is_attached());
    }

    #[tokio::test]
    async fn test_disk_copy_and_move_bodies() {
        let client = MockOvirtClient::new("https://engine.test/ovirt-engine/api");
        let mut disk = Disk::new("data", GIB, DiskFormat::Raw, StorageDomain::named("a"));
        disk.save(&client).await.unwrap();

        disk.copy(&client, false, StorageDomain::named("b"), Some("data-copy"))
            .await
            .unwrap();
        disk.move_to(&client, true, StorageDomain::named("c")).await.unwrap();

        let actions = client.performed_actions();
        assert_eq!(actions[0].1["storage_domain"]["name"], "b");
        assert_eq!(actions[0].1["disk"]["name"], "data-copy");
        assert!(actions[1].0.ends_with("/move"));
        assert_eq!(actions[1].1["async"], "true");
    }
}
