//! Virtual machine models
//!
//! `Vm` plus the configuration records nested inside it (CPU, memory,
//! display, cloud-init initialization, ...) and the `Snapshot` resource that
//! lives below a VM.

use super::{
    Action, Cluster, DiskAttachment, Host, Ip, Link, Meta, Nic, StorageDomain, Template, Version, epoch_millis,
};
use crate::common::wire;
use crate::error::OvirtError;
use crate::ovirt_trait::OvirtClientTrait;
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Boot menu switch of the BIOS
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootMenu {
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bios {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_menu: Option<BootMenu>,
    /// `i440fx_sea_bios`, `q35_sea_bios`, `q35_ovmf`, `q35_secure_boot`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub bios_type: Option<String>,
}

/// Serial console device
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Console {
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Core {
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub socket: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cores {
    #[serde(default)]
    pub core: Vec<Core>,
}

/// Pinning of one virtual CPU to a set of host CPUs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VcpuPin {
    /// Host CPU set, e.g. `0-3,^2`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_set: Option<String>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub vcpu: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VcpuPins {
    #[serde(default)]
    pub vcpu_pin: Vec<VcpuPin>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpuTune {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcpu_pins: Option<VcpuPins>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CpuTopology {
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub cores: Option<i64>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub sockets: Option<i64>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub threads: Option<i64>,
}

impl CpuTopology {
    pub fn new(sockets: i64, cores: i64, threads: i64) -> Self {
        Self {
            cores: Some(cores),
            sockets: Some(sockets),
            threads: Some(threads),
        }
    }

    /// Number of virtual CPUs this topology gives, saturating at `i64::MAX`
    pub fn vcpus(&self) -> i64 {
        self.sockets
            .unwrap_or(1)
            .saturating_mul(self.cores.unwrap_or(1))
            .saturating_mul(self.threads.unwrap_or(1))
    }
}

/// CPU of a VM, a cluster or a host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cpu {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cores: Option<Cores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_tune: Option<CpuTune>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    /// `custom`, `host_model` or `host_passthrough`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<CpuTopology>,
    /// Cluster CPU type, e.g. `Intel Nehalem Family`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub cpu_type: Option<String>,
}

/// Custom property representation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regexp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomProperties {
    #[serde(default)]
    pub custom_property: Vec<CustomProperty>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Certificate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// Represents a graphic console configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Display {
    /// The IP address of the guest to connect the graphic console client to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Indicates if to override the display address per host.
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub allow_override: Option<bool>,
    /// The TLS certificate in case of a TLS connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub copy_paste_enabled: Option<bool>,
    /// Action taken when the graphic console is disconnected, e.g. `LOCK_SCREEN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disconnect_action: Option<String>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub file_transfer_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard_layout: Option<String>,
    /// The number of monitors opened for this graphic console.
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub monitors: Option<i64>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub secure_port: Option<i64>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub single_qxl_pci: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub smartcard_enabled: Option<bool>,
    /// `spice` or `vnc`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Kernel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

/// Operating system reported by the guest agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuestOperatingSystem {
    /// The architecture of the operating system, such as x86_64.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    /// Code name of the operating system, such as Maipo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
    /// Family of operating system, such as Linux.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel: Option<Kernel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighAvailability {
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

/// Account created or configured inside a guest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Users {
    #[serde(default)]
    pub user: Vec<User>,
}

/// Hosts listed inside another record (DNS servers, placement hosts)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hosts {
    #[serde(default)]
    pub host: Vec<Host>,
}

/// Raw initialization payload (e.g. a sysprep answer file)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// `ovf`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub configuration_type: Option<String>,
}

/// Represents the DNS resolver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_domains: Option<Hosts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Hosts>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Nics {
    #[serde(default)]
    pub nic: Vec<Nic>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<Dns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nics: Option<Nics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizedKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizedKeys {
    #[serde(default)]
    pub authorized_key: Vec<AuthorizedKey>,
}

/// File written into the guest by cloud-init
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct File {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Path of the file inside the guest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Files {
    #[serde(default)]
    pub file: Vec<File>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudInit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorized_keys: Option<AuthorizedKeys>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Files>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Box<Host>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_configuration: Option<NetworkConfiguration>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub regenerate_ssh_keys: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Users>,
}

/// Static network settings for one guest NIC
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NicConfiguration {
    /// `none`, `dhcp` or `static`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<Ip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub on_boot: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NicConfigurations {
    #[serde(default)]
    pub nic_configuration: Vec<NicConfiguration>,
}

/// Guest initialization (cloud-init or sysprep) settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Initialization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_directory_ou: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorized_ssh_keys: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_init: Option<CloudInit>,
    /// `eni`, `openstack_metadata` or `guess`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_init_network_protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Configuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_servers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nic_configurations: Option<NicConfigurations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub regenerate_ids: Option<bool>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub regenerate_ssh_keys: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows_license_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Io {
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub threads: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryOverCommit {
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub percent: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransparentHugePages {
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Memory related properties of VMs, templates and clusters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryPolicy {
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub ballooning: Option<bool>,
    /// Guaranteed memory in bytes
    #[serde(default, with = "wire::opt_u64", skip_serializing_if = "Option::is_none")]
    pub guaranteed: Option<u64>,
    /// Hot-plug ceiling in bytes
    #[serde(default, with = "wire::opt_u64", skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over_commit: Option<MemoryOverCommit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparent_huge_pages: Option<TransparentHugePages>,
}

/// Defines the bandwidth used by migration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationBandwidth {
    /// `auto`, `custom` or `hypervisor_default`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_method: Option<String>,
    /// Mbps, only used with the `custom` assignment method
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub custom_value: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// `true`, `false` or `inherit`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_converge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<MigrationBandwidth>,
    /// `true`, `false` or `inherit`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressed: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BootDevices {
    #[serde(default)]
    pub device: Vec<String>,
}

/// Boot sequence of a virtual machine
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Boot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<BootDevices>,
}

impl Boot {
    /// Boot order from device names (`hd`, `cdrom`, `network`)
    pub fn from_devices<I, S>(devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            devices: Some(BootDevices {
                device: devices.into_iter().map(Into::into).collect(),
            }),
        }
    }

    pub fn devices(&self) -> &[String] {
        self.devices.as_ref().map(|d| d.device.as_slice()).unwrap_or_default()
    }
}

/// Operating system of a VM or a host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatingSystem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot: Option<Boot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmdline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_kernel_cmdline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initrd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel: Option<String>,
    #[serde(default, skip_serializing)]
    pub reported_kernel_cmdline: Option<String>,
    /// Guest OS identifier, e.g. `rhel_8x64` or `other_linux`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeZone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usb {
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// `legacy` or `native`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub usb_type: Option<String>,
}

/// Which hosts a VM may run on and whether it may migrate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VmPlacementPolicy {
    /// `migratable`, `pinned` or `user_migratable`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Hosts>,
}

/// VM status choices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VmStatus {
    Down,
    ImageLocked,
    Migrating,
    NotResponding,
    Paused,
    PoweringDown,
    PoweringUp,
    RebootInProgress,
    RestoringState,
    SavingState,
    Suspended,
    Unassigned,
    Up,
    WaitForLaunch,
    #[serde(other)]
    Unknown,
}

/// Represents a virtual machine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vm {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bios: Option<Bios>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<Box<Cluster>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console: Option<Console>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Cpu>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_profile: Option<Link>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub cpu_shares: Option<i64>,
    #[serde(default, with = "wire::opt_i64", skip_serializing)]
    pub creation_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_compatibility_version: Option<Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_cpu_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_emulated_machine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<CustomProperties>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub delete_protected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
    #[serde(default, skip_serializing)]
    pub fqdn: Option<String>,
    #[serde(default, skip_serializing)]
    pub guest_operating_system: Option<GuestOperatingSystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_availability: Option<HighAvailability>,
    /// Host the VM currently runs on
    #[serde(default, skip_serializing)]
    pub host: Option<Box<Host>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initialization: Option<Initialization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io: Option<Io>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_icon: Option<Link>,
    /// Memory in bytes
    #[serde(default, with = "wire::opt_u64", skip_serializing_if = "Option::is_none")]
    pub memory: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_policy: Option<MemoryPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration: Option<MigrationOptions>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub migration_downtime: Option<i64>,
    #[serde(default, with = "wire::opt_bool", skip_serializing)]
    pub next_run_configuration_exists: Option<bool>,
    /// `interleave`, `preferred` or `strict`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numa_tune_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing)]
    pub original_template: Option<Box<Template>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OperatingSystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_policy: Option<VmPlacementPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<Link>,
    #[serde(default, with = "wire::opt_bool", skip_serializing)]
    pub run_once: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_icon: Option<Link>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub start_paused: Option<bool>,
    #[serde(default, with = "wire::opt_i64", skip_serializing)]
    pub start_time: Option<i64>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub stateless: Option<bool>,
    #[serde(default, skip_serializing)]
    pub status: Option<VmStatus>,
    #[serde(default, skip_serializing)]
    pub stop_reason: Option<String>,
    #[serde(default, with = "wire::opt_i64", skip_serializing)]
    pub stop_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Box<Template>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<TimeZone>,
    /// `desktop`, `server` or `high_performance`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub vm_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usb: Option<Usb>,
}

impl Resource for Vm {
    const KIND: &'static str = "vm";
    const COLLECTION: &'static str = "vms";
    const NAME: &'static str = "VM";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

/// Parameters of [`Vm::start`]
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    pub asynchronous: bool,
    /// Run sysprep/cloud-init filtering of the guest
    pub filter: Option<bool>,
    /// Start the VM paused
    pub pause: Option<bool>,
    pub use_cloud_init: Option<bool>,
    pub use_sysprep: Option<bool>,
    /// Run-once configuration used for this boot only
    pub vm: Option<Vm>,
}

impl Vm {
    /// New unsaved VM in a cluster, based on a template
    pub fn new(name: impl Into<String>, cluster: Cluster, template: Template) -> Self {
        Self {
            name: Some(name.into()),
            cluster: Some(Box::new(cluster)),
            template: Some(Box::new(template)),
            ..Default::default()
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == Some(VmStatus::Up)
    }

    pub fn is_down(&self) -> bool {
        self.status == Some(VmStatus::Down)
    }

    pub fn creation_time(&self) -> Option<DateTime<Utc>> {
        epoch_millis(self.creation_time)
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        epoch_millis(self.start_time)
    }

    pub fn stop_time(&self) -> Option<DateTime<Utc>> {
        epoch_millis(self.stop_time)
    }

    /// Disks attached to this VM
    pub async fn disk_attachments<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
    ) -> Result<Vec<DiskAttachment>, OvirtError> {
        DiskAttachment::list_in(client, self).await
    }

    pub async fn nics<C: OvirtClientTrait + ?Sized>(&self, client: &C) -> Result<Vec<Nic>, OvirtError> {
        Nic::list_in(client, self).await
    }

    pub async fn snapshots<C: OvirtClientTrait + ?Sized>(&self, client: &C) -> Result<Vec<Snapshot>, OvirtError> {
        Snapshot::list_in(client, self).await
    }

    /// Attaches a disk, creating it first when the disk has no id
    pub async fn attach_disk<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        mut attachment: DiskAttachment,
    ) -> Result<DiskAttachment, OvirtError> {
        attachment.save_in(client, self).await?;
        Ok(attachment)
    }

    pub async fn add_nic<C: OvirtClientTrait + ?Sized>(&self, client: &C, mut nic: Nic) -> Result<Nic, OvirtError> {
        nic.save_in(client, self).await?;
        Ok(nic)
    }

    /// Takes a snapshot, optionally including the memory state
    pub async fn create_snapshot<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        description: &str,
        persist_memory: bool,
    ) -> Result<Snapshot, OvirtError> {
        let mut snapshot = Snapshot::new(description, persist_memory);
        snapshot.save_in(client, self).await?;
        Ok(snapshot)
    }

    async fn simple_action<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        verb: &str,
        asynchronous: bool,
    ) -> Result<(), OvirtError> {
        self.perform(client, verb, Action::with_async(asynchronous))
            .await
            .map(|_| ())
    }

    /// Stops any migration of the VM to another host
    pub async fn cancel_migration<C: OvirtClientTrait + ?Sized>(&self, client: &C) -> Result<(), OvirtError> {
        self.perform(client, "cancelmigration", Action::default()).await.map(|_| ())
    }

    /// Clones the VM into a new one described by `new_vm` (at least a name)
    pub async fn clone_vm<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
        new_vm: Vm,
    ) -> Result<(), OvirtError> {
        let action = Action {
            asynchronous: Some(asynchronous),
            vm: Some(Box::new(new_vm)),
            ..Default::default()
        };
        self.perform(client, "clone", action).await.map(|_| ())
    }

    /// Makes the previewed snapshot permanent
    pub async fn commit_snapshot<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
    ) -> Result<(), OvirtError> {
        self.simple_action(client, "commitsnapshot", asynchronous).await
    }

    /// Detaches the VM from its pool
    pub async fn detach<C: OvirtClientTrait + ?Sized>(&self, client: &C) -> Result<(), OvirtError> {
        self.perform(client, "detach", Action::default()).await.map(|_| ())
    }

    /// Exports the VM to an export domain
    pub async fn export<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
        discard_snapshots: bool,
        exclusive: bool,
        storage_domain: StorageDomain,
    ) -> Result<(), OvirtError> {
        let action = Action {
            asynchronous: Some(asynchronous),
            discard_snapshots: Some(discard_snapshots),
            exclusive: Some(exclusive),
            storage_domain: Some(Box::new(storage_domain)),
            ..Default::default()
        };
        self.perform(client, "export", action).await.map(|_| ())
    }

    pub async fn freeze_filesystems<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
    ) -> Result<(), OvirtError> {
        self.simple_action(client, "freezefilesystems", asynchronous).await
    }

    /// Starts the automatic user logon from an external console
    pub async fn logon<C: OvirtClientTrait + ?Sized>(&self, client: &C, asynchronous: bool) -> Result<(), OvirtError> {
        self.simple_action(client, "logon", asynchronous).await
    }

    /// Sets global maintenance mode on the hosted engine VM
    pub async fn maintenance<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
        maintenance_enabled: bool,
    ) -> Result<(), OvirtError> {
        let action = Action {
            asynchronous: Some(asynchronous),
            maintenance_enabled: Some(maintenance_enabled),
            ..Default::default()
        };
        self.perform(client, "maintenance", action).await.map(|_| ())
    }

    /// Migrates the VM, to a given host or wherever the scheduler decides
    pub async fn migrate<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
        cluster: Option<Cluster>,
        force: Option<bool>,
        host: Option<Host>,
    ) -> Result<(), OvirtError> {
        let action = Action {
            asynchronous: Some(asynchronous),
            cluster: cluster.map(Box::new),
            force,
            host: host.map(Box::new),
            ..Default::default()
        };
        self.perform(client, "migrate", action).await.map(|_| ())
    }

    /// Boots the VM into a snapshot without committing to it
    pub async fn preview_snapshot<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
        snapshot: &Snapshot,
        restore_memory: Option<bool>,
    ) -> Result<(), OvirtError> {
        let action = Action {
            asynchronous: Some(asynchronous),
            restore_memory,
            snapshot: Some(Box::new(snapshot.to_ref())),
            ..Default::default()
        };
        self.perform(client, "previewsnapshot", action).await.map(|_| ())
    }

    pub async fn reboot<C: OvirtClientTrait + ?Sized>(&self, client: &C, asynchronous: bool) -> Result<(), OvirtError> {
        self.simple_action(client, "reboot", asynchronous).await
    }

    pub async fn reorder_mac_addresses<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
    ) -> Result<(), OvirtError> {
        self.simple_action(client, "reordermacaddresses", asynchronous).await
    }

    /// Sends a guest shutdown request
    pub async fn shutdown<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
    ) -> Result<(), OvirtError> {
        self.simple_action(client, "shutdown", asynchronous).await
    }

    pub async fn start<C: OvirtClientTrait + ?Sized>(&self, client: &C, options: StartOptions) -> Result<(), OvirtError> {
        let action = Action {
            asynchronous: Some(options.asynchronous),
            filter: options.filter,
            pause: options.pause,
            use_cloud_init: options.use_cloud_init,
            use_sysprep: options.use_sysprep,
            vm: options.vm.map(Box::new),
            ..Default::default()
        };
        self.perform(client, "start", action).await.map(|_| ())
    }

    /// Forces the VM to power off
    pub async fn stop<C: OvirtClientTrait + ?Sized>(&self, client: &C, asynchronous: bool) -> Result<(), OvirtError> {
        self.simple_action(client, "stop", asynchronous).await
    }

    /// Saves the VM state to disk and stops it
    pub async fn suspend<C: OvirtClientTrait + ?Sized>(&self, client: &C, asynchronous: bool) -> Result<(), OvirtError> {
        self.simple_action(client, "suspend", asynchronous).await
    }

    pub async fn thaw_filesystems<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
    ) -> Result<(), OvirtError> {
        self.simple_action(client, "thawfilesystems", asynchronous).await
    }

    /// Leaves snapshot preview and returns to the previous state
    pub async fn undo_snapshot<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
    ) -> Result<(), OvirtError> {
        self.simple_action(client, "undosnapshot", asynchronous).await
    }
}

/// Snapshot status choices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    InPreview,
    Locked,
    Ok,
    #[serde(other)]
    Unknown,
}

/// Point-in-time copy of a VM's disks and, optionally, its memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, with = "wire::opt_i64", skip_serializing)]
    pub date: Option<i64>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub persist_memorystate: Option<bool>,
    #[serde(default, skip_serializing)]
    pub snapshot_status: Option<SnapshotStatus>,
    /// `active`, `regular`, `preview` or `stateless`
    #[serde(default, skip_serializing)]
    pub snapshot_type: Option<String>,
    #[serde(default, skip_serializing)]
    pub vm: Option<Box<Vm>>,
}

impl Resource for Snapshot {
    const KIND: &'static str = "snapshot";
    const COLLECTION: &'static str = "snapshots";
    const NAME: &'static str = "Snapshot";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

impl Snapshot {
    pub fn new(description: impl Into<String>, persist_memory: bool) -> Self {
        Self {
            description: Some(description.into()),
            persist_memorystate: Some(persist_memory),
            ..Default::default()
        }
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        epoch_millis(self.date)
    }

    /// Restores the VM to this snapshot
    pub async fn restore<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
        restore_memory: Option<bool>,
    ) -> Result<(), OvirtError> {
        let action = Action {
            asynchronous: Some(asynchronous),
            restore_memory,
            ..Default::default()
        };
        self.perform(client, "restore", action).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockOvirtClient;
    use crate::models::{Disk, DiskFormat, DiskInterface, VnicProfile};

    #[test]
    fn test_vcpus_of_topology() {
        assert_eq!(CpuTopology::new(2, 4, 2).vcpus(), 16);
        assert_eq!(CpuTopology::default().vcpus(), 1);

        let huge: CpuTopology =
            serde_json::from_value(serde_json::json!({"sockets": "4294967296", "cores": "4294967296", "threads": "2"}))
                .unwrap();
        assert_eq!(huge.vcpus(), i64::MAX);
    }

    const ENGINE: &str = "https://engine.test/ovirt-engine/api";

    fn vm_json() -> serde_json::Value {
        serde_json::json!({
            "id": "v1",
            "href": "/ovirt-engine/api/vms/v1",
            "name": "web01",
            "status": "up",
            "memory": "4294967296",
            "creation_time": 1_700_000_000_000_i64,
            "start_time": "1700000360000",
            "stateless": "false",
            "cpu": {
                "architecture": "x86_64",
                "topology": {"cores": "2", "sockets": "1", "threads": "1"}
            },
            "os": {"type": "rhel_8x64", "boot": {"devices": {"device": ["hd", "network"]}}},
            "host": {"href": "/ovirt-engine/api/hosts/h1", "id": "h1"},
            "link": [{"href": "/ovirt-engine/api/vms/v1/nics", "rel": "nics"}],
            "actions": {"link": [{"href": "/ovirt-engine/api/vms/v1/stop", "rel": "stop"}]}
        })
    }

    #[test]
    fn test_decode_vm() {
        let vm: Vm = serde_json::from_value(vm_json()).unwrap();

        assert!(vm.is_up());
        assert_eq!(vm.memory, Some(4_294_967_296));
        assert_eq!(vm.stateless, Some(false));
        assert_eq!(vm.cpu.as_ref().and_then(|c| c.topology.as_ref()).unwrap().vcpus(), 2);
        assert_eq!(vm.os.as_ref().and_then(|o| o.boot.as_ref()).unwrap().devices(), ["hd", "network"]);
        assert_eq!(vm.creation_time().unwrap().to_rfc3339(), "2023-11-14T22:13:20+00:00");
        assert_eq!(vm.start_time().unwrap().timestamp(), 1_700_000_360);
        assert!(vm.stop_time().is_none());
        assert_eq!(vm.link("nics"), Some("/ovirt-engine/api/vms/v1/nics"));
        assert!(vm.meta.has_action("stop"));
    }

    #[test]
    fn test_unknown_status_decodes() {
        let vm: Vm = serde_json::from_value(serde_json::json!({"status": "hibernating"})).unwrap();
        assert_eq!(vm.status, Some(VmStatus::Unknown));
    }

    #[test]
    fn test_decoded_vm_sends_back_only_writable_fields() {
        let vm: Vm = serde_json::from_value(vm_json()).unwrap();
        let json = serde_json::to_value(&vm).unwrap();

        assert!(json.get("link").is_none());
        assert!(json.get("actions").is_none());
        assert!(json.get("status").is_none());
        assert!(json.get("creation_time").is_none());
        assert!(json.get("host").is_none());
        assert_eq!(json["memory"], "4294967296");
        assert_eq!(json["os"]["boot"]["devices"]["device"][1], "network");
    }

    #[test]
    fn test_new_vm_wire_form() {
        let mut vm = Vm::new("web01", Cluster::named("Default"), Template::named("Blank"));
        vm.memory = Some(1 << 30);
        vm.os = Some(OperatingSystem {
            boot: Some(Boot::from_devices(["hd"])),
            ..Default::default()
        });
        vm.initialization = Some(Initialization {
            host_name: Some("web01.example.com".to_string()),
            nic_configurations: Some(NicConfigurations {
                nic_configuration: vec![NicConfiguration {
                    boot_protocol: Some("static".to_string()),
                    ip: Some(Ip {
                        address: Some("10.0.0.10".to_string()),
                        ..Default::default()
                    }),
                    name: Some("eth0".to_string()),
                    on_boot: Some(true),
                }],
            }),
            ..Default::default()
        });

        let json = serde_json::to_value(&vm).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "web01",
                "cluster": {"name": "Default"},
                "initialization": {
                    "host_name": "web01.example.com",
                    "nic_configurations": {"nic_configuration": [{
                        "boot_protocol": "static",
                        "ip": {"address": "10.0.0.10"},
                        "name": "eth0",
                        "on_boot": "true"
                    }]}
                },
                "memory": "1073741824",
                "os": {"boot": {"devices": {"device": ["hd"]}}},
                "template": {"name": "Blank"}
            })
        );
    }

    #[tokio::test]
    async fn test_start_options_body() {
        let client = MockOvirtClient::new(ENGINE);
        let mut vm = Vm::new("web01", Cluster::default(), Template::named("Blank"));
        vm.save(&client).await.unwrap();

        let options = StartOptions {
            asynchronous: false,
            use_cloud_init: Some(true),
            ..Default::default()
        };
        vm.start(&client, options).await.unwrap();
        vm.shutdown(&client, true).await.unwrap();

        let actions = client.performed_actions();
        assert!(actions[0].0.ends_with("/start"));
        assert_eq!(actions[0].1, serde_json::json!({"async": "false", "use_cloud_init": "true"}));
        assert!(actions[1].0.ends_with("/shutdown"));
        assert_eq!(actions[1].1["async"], "true");
    }

    #[tokio::test]
    async fn test_migrate_and_clone_bodies() {
        let client = MockOvirtClient::new(ENGINE);
        let mut vm = Vm::new("web01", Cluster::default(), Template::named("Blank"));
        vm.save(&client).await.unwrap();

        let mut target = Host::default();
        target.meta.id = Some("h2".to_string());
        vm.migrate(&client, true, None, Some(true), Some(target)).await.unwrap();

        let clone = Vm {
            name: Some("web01-clone".to_string()),
            ..Default::default()
        };
        vm.clone_vm(&client, false, clone).await.unwrap();

        let actions = client.performed_actions();
        assert_eq!(actions[0].1, serde_json::json!({"async": "true", "force": "true", "host": {"id": "h2"}}));
        assert!(actions[1].0.ends_with("/clone"));
        assert_eq!(actions[1].1["vm"]["name"], "web01-clone");
    }

    #[tokio::test]
    async fn test_actions_on_unsaved_vm_fail() {
        let client = MockOvirtClient::new(ENGINE);
        let vm = Vm::new("web01", Cluster::default(), Template::named("Blank"));

        let err = vm.stop(&client, false).await.unwrap_err();
        assert!(matches!(err, OvirtError::NotPersisted("VM")));
        assert!(client.performed_actions().is_empty());
    }

    #[tokio::test]
    async fn test_sub_collections() {
        let client = MockOvirtClient::new(ENGINE);
        let mut vm = Vm::new("db01", Cluster::default(), Template::named("Blank"));
        vm.save(&client).await.unwrap();

        let disk = Disk::new("db01_root", 20 << 30, DiskFormat::Cow, StorageDomain::named("data"));
        let attachment = vm
            .attach_disk(&client, DiskAttachment::new(disk, DiskInterface::VirtioScsi, true))
            .await
            .unwrap();
        assert!(attachment.is_persisted());

        let mut profile = VnicProfile::default();
        profile.meta.id = Some("p1".to_string());
        vm.add_nic(&client, Nic::new("nic1", profile)).await.unwrap();

        assert_eq!(vm.disk_attachments(&client).await.unwrap().len(), 1);
        let nics = vm.nics(&client).await.unwrap();
        assert_eq!(nics[0].name.as_deref(), Some("nic1"));
        assert!(vm.snapshots(&client).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_preview_and_restore() {
        let client = MockOvirtClient::new(ENGINE);
        let mut vm = Vm::new("db01", Cluster::default(), Template::named("Blank"));
        vm.save(&client).await.unwrap();

        let snapshot = vm.create_snapshot(&client, "before upgrade", true).await.unwrap();
        assert_eq!(snapshot.description.as_deref(), Some("before upgrade"));
        assert_eq!(vm.snapshots(&client).await.unwrap().len(), 1);

        vm.preview_snapshot(&client, false, &snapshot, Some(true)).await.unwrap();
        vm.undo_snapshot(&client, false).await.unwrap();
        snapshot.restore(&client, false, None).await.unwrap();

        let actions = client.performed_actions();
        assert_eq!(actions[0].1["snapshot"]["id"], snapshot.id().unwrap());
        assert_eq!(actions[0].1["restore_memory"], "true");
        assert!(actions[1].0.ends_with("/undosnapshot"));
        assert!(actions[2].0.starts_with(snapshot.href().unwrap()));
    }
}
