//! Network models: logical networks, vNIC profiles and VM NICs

use super::{DataCenter, Meta, Vm};
use crate::common::wire;
use crate::error::OvirtError;
use crate::ovirt_trait::OvirtClientTrait;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};

/// VLAN tag of a logical network
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vlan {
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// Roles of a logical network (`vm`, `display`, `migration`, `management`, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkUsages {
    #[serde(default)]
    pub usage: Vec<String>,
}

/// A logical network defined in a data center
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Network {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_center: Option<Box<DataCenter>>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub mtu: Option<i64>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub port_isolation: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub stp: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usages: Option<NetworkUsages>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan: Option<Vlan>,
}

impl Resource for Network {
    const KIND: &'static str = "network";
    const COLLECTION: &'static str = "networks";
    const NAME: &'static str = "Network";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

impl Network {
    /// New unsaved VM network in a data center, optionally VLAN tagged
    pub fn new(name: impl Into<String>, data_center: DataCenter, vlan_id: Option<i64>) -> Self {
        Self {
            name: Some(name.into()),
            data_center: Some(Box::new(data_center)),
            vlan: vlan_id.map(|id| Vlan { id: Some(id) }),
            usages: Some(NetworkUsages {
                usage: vec!["vm".to_string()],
            }),
            ..Default::default()
        }
    }

    /// vNIC profiles that attach VMs to this network
    pub async fn vnic_profiles<C: OvirtClientTrait + ?Sized>(&self, client: &C) -> Result<Vec<VnicProfile>, OvirtError> {
        VnicProfile::list_in(client, self).await
    }
}

/// Pass-through mode of a vNIC profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VnicPassThrough {
    /// `disabled` or `enabled`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// Settings a VM NIC gets when plugged into a network
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VnicProfile {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub migratable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Box<Network>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_through: Option<VnicPassThrough>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub port_mirroring: Option<bool>,
}

impl Resource for VnicProfile {
    const KIND: &'static str = "vnic_profile";
    const COLLECTION: &'static str = "vnicprofiles";
    const NAME: &'static str = "VnicProfile";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

impl VnicProfile {
    /// New unsaved profile for a network
    pub fn new(name: impl Into<String>, network: Network) -> Self {
        Self {
            name: Some(name.into()),
            network: Some(Box::new(network)),
            ..Default::default()
        }
    }
}

/// Represents a MAC address of a virtual network interface.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mac {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Represents the IP configuration of a network interface.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ip {
    /// The text representation of the IP address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// The address of the default gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    /// The network mask.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netmask: Option<String>,
    /// The version of the IP protocol, `v4` or `v6`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// NIC driver choices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NicInterface {
    E1000,
    PciPassthrough,
    Rtl8139,
    Rtl8139Virtio,
    SpaprVlan,
    Virtio,
    #[serde(other)]
    Unknown,
}

impl wire::Choice for NicInterface {
    fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// Represents a virtual machine NIC.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Nic {
    #[serde(flatten)]
    pub meta: Meta,
    /// Defines how an IP address is assigned to the NIC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The type of driver used for the NIC.
    #[serde(default, skip_serializing_if = "wire::skip_choice")]
    pub interface: Option<NicInterface>,
    /// Defines if the NIC is linked to the virtual machine.
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub linked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<Mac>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Defines if the network interface should be activated upon operation system startup.
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub on_boot: Option<bool>,
    /// Defines if the NIC is plugged in to the virtual machine.
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub plugged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm: Option<Box<Vm>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnic_profile: Option<Box<VnicProfile>>,
}

impl Resource for Nic {
    const KIND: &'static str = "nic";
    const COLLECTION: &'static str = "nics";
    const NAME: &'static str = "Nic";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

impl Nic {
    /// New unsaved virtio NIC plugged into a vNIC profile
    pub fn new(name: impl Into<String>, vnic_profile: VnicProfile) -> Self {
        Self {
            name: Some(name.into()),
            interface: Some(NicInterface::Virtio),
            linked: Some(true),
            plugged: Some(true),
            vnic_profile: Some(Box::new(vnic_profile)),
            ..Default::default()
        }
    }

    pub fn mac_address(&self) -> Option<&str> {
        self.mac.as_ref().and_then(|m| m.address.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockOvirtClient;

    #[test]
    fn test_network_wire_form() {
        let network = Network::new("storage", DataCenter::default(), Some(120));
        let json = serde_json::to_value(&network).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "storage",
                "data_center": {},
                "usages": {"usage": ["vm"]},
                "vlan": {"id": "120"}
            })
        );
    }

    #[test]
    fn test_decode_nic() {
        let nic: Nic = serde_json::from_value(serde_json::json!({
            "id": "n1",
            "href": "/ovirt-engine/api/vms/v1/nics/n1",
            "name": "nic1",
            "interface": "virtio",
            "linked": "true",
            "plugged": "false",
            "mac": {"address": "56:6f:1a:2b:00:01"},
            "vnic_profile": {"href": "/ovirt-engine/api/vnicprofiles/p1", "id": "p1"}
        }))
        .unwrap();

        assert_eq!(nic.interface, Some(NicInterface::Virtio));
        assert_eq!(nic.plugged, Some(false));
        assert_eq!(nic.mac_address(), Some("56:6f:1a:2b:00:01"));
    }

    #[test]
    fn test_unrecognised_nic_interface_is_not_sent_back() {
        let mut nic: Nic = serde_json::from_value(serde_json::json!({"name": "nic1", "interface": "vfio_user"})).unwrap();
        assert_eq!(nic.interface, Some(NicInterface::Unknown));
        assert!(serde_json::to_value(&nic).unwrap().get("interface").is_none());

        nic.interface = Some(NicInterface::E1000);
        assert_eq!(serde_json::to_value(&nic).unwrap()["interface"], "e1000");
    }

    #[tokio::test]
    async fn test_vnic_profiles_of_network() {
        let client = MockOvirtClient::new("https://engine.test/ovirt-engine/api");
        let mut network = Network::new("ovirtmgmt", DataCenter::default(), None);
        network.save(&client).await.unwrap();

        let mut profile = VnicProfile::new("ovirtmgmt", network.to_ref());
        profile.save_in(&client, &network).await.unwrap();

        let profiles = network.vnic_profiles(&client).await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name.as_deref(), Some("ovirtmgmt"));
    }
}
