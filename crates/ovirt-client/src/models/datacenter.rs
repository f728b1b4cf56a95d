//! Data center model

use super::{Action, Cluster, Link, Meta, Network, Version};
use crate::common::wire;
use crate::error::OvirtError;
use crate::ovirt_trait::OvirtClientTrait;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};

/// Data center status choices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataCenterStatus {
    Contend,
    Maintenance,
    NotOperational,
    ProblematicStatus,
    Uninitialized,
    Up,
    #[serde(other)]
    Unknown,
}

/// Versions a data center can be raised to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportedVersions {
    #[serde(default)]
    pub version: Vec<Version>,
}

/// A data center: the top-level container of clusters, storage and networks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataCenter {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Whether the data center uses local storage only
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub local: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_pool: Option<Link>,
    /// `disabled`, `audit` or `enabled`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_mode: Option<String>,
    #[serde(default, skip_serializing)]
    pub status: Option<DataCenterStatus>,
    /// Storage format version, `v1` .. `v5`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_format: Option<String>,
    #[serde(default, skip_serializing)]
    pub supported_versions: Option<SupportedVersions>,
    /// Compatibility version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

impl Resource for DataCenter {
    const KIND: &'static str = "data_center";
    const COLLECTION: &'static str = "datacenters";
    const NAME: &'static str = "DataCenter";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

impl DataCenter {
    /// New unsaved data center
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Clusters belonging to this data center
    pub async fn clusters<C: OvirtClientTrait + ?Sized>(&self, client: &C) -> Result<Vec<Cluster>, OvirtError> {
        Cluster::list_in(client, self).await
    }

    /// Logical networks defined in this data center
    pub async fn networks<C: OvirtClientTrait + ?Sized>(&self, client: &C) -> Result<Vec<Network>, OvirtError> {
        Network::list_in(client, self).await
    }

    /// Removes the finished tasks of this data center from the task manager
    pub async fn clean_finished_tasks<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
    ) -> Result<(), OvirtError> {
        self.perform(client, "cleanfinishedtasks", Action::with_async(asynchronous))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockOvirtClient;

    #[test]
    fn test_decode_engine_document() {
        let dc: DataCenter = serde_json::from_value(serde_json::json!({
            "id": "5e5c8b55-0001",
            "href": "/ovirt-engine/api/datacenters/5e5c8b55-0001",
            "name": "Default",
            "local": "false",
            "quota_mode": "disabled",
            "status": "up",
            "storage_format": "v5",
            "supported_versions": {"version": [{"major": "4", "minor": "7"}]},
            "version": {"major": "4", "minor": "7"},
            "link": [{"href": "/ovirt-engine/api/datacenters/5e5c8b55-0001/clusters", "rel": "clusters"}]
        }))
        .unwrap();

        assert!(dc.is_persisted());
        assert_eq!(dc.local, Some(false));
        assert_eq!(dc.status, Some(DataCenterStatus::Up));
        assert_eq!(dc.version, Some(Version::new(4, 7)));
        assert_eq!(dc.link("clusters"), Some("/ovirt-engine/api/datacenters/5e5c8b55-0001/clusters"));
    }

    #[test]
    fn test_unknown_status_does_not_break_decoding() {
        let dc: DataCenter = serde_json::from_value(serde_json::json!({"status": "brand_new_state"})).unwrap();
        assert_eq!(dc.status, Some(DataCenterStatus::Unknown));
    }

    #[test]
    fn test_read_only_fields_are_not_sent() {
        let dc = DataCenter {
            name: Some("dc1".to_string()),
            local: Some(true),
            status: Some(DataCenterStatus::Up),
            ..Default::default()
        };
        let json = serde_json::to_value(&dc).unwrap();
        assert_eq!(json, serde_json::json!({"name": "dc1", "local": "true"}));
    }

    #[tokio::test]
    async fn test_round_trip_create_get_update_delete() {
        let client = MockOvirtClient::new("https://engine.test/ovirt-engine/api");

        let mut dc = DataCenter::new("test-data-center");
        dc.local = Some(true);
        assert!(!dc.is_persisted());
        dc.save(&client).await.unwrap();
        assert!(dc.is_persisted());
        let id = dc.id().unwrap().to_string();

        let mut retrieved = DataCenter::get(&client, &id).await.unwrap();
        assert_eq!(retrieved.name.as_deref(), Some("test-data-center"));
        assert_eq!(retrieved.local, Some(true));

        retrieved.description = Some("about to delete".to_string());
        retrieved.save(&client).await.unwrap();
        assert_eq!(client.request_count("PUT"), 1);

        dc.refresh(&client).await.unwrap();
        assert_eq!(dc.description.as_deref(), Some("about to delete"));

        retrieved.delete(&client).await.unwrap();
        let err = DataCenter::get(&client, &id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_clusters_follow_the_data_center_link() {
        let client = MockOvirtClient::new("https://engine.test/ovirt-engine/api");
        let mut dc = DataCenter::new("dc");
        dc.save(&client).await.unwrap();

        let mut cluster = Cluster::new("cl", dc.to_ref());
        cluster.save_in(&client, &dc).await.unwrap();

        let clusters = dc.clusters(&client).await.unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].name.as_deref(), Some("cl"));
    }

    #[tokio::test]
    async fn test_root_created_cluster_is_listed_by_its_data_center() {
        let client = MockOvirtClient::new("https://engine.test/ovirt-engine/api");
        let mut dc = DataCenter::new("dc");
        dc.save(&client).await.unwrap();
        let mut other = DataCenter::new("other");
        other.save(&client).await.unwrap();

        let mut cluster = Cluster::new("cl", dc.to_ref());
        cluster.save(&client).await.unwrap();

        let clusters = dc.clusters(&client).await.unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].id(), cluster.id());
        assert!(other.clusters(&client).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cluster_created_in_data_center_is_a_root_cluster() {
        let client = MockOvirtClient::new("https://engine.test/ovirt-engine/api");
        let mut dc = DataCenter::new("dc");
        dc.save(&client).await.unwrap();

        let mut cluster = Cluster::named("cl");
        cluster.save_in(&client, &dc).await.unwrap();
        let id = cluster.id().unwrap().to_string();
        assert_eq!(cluster.href(), Some(format!("/ovirt-engine/api/clusters/{}", id).as_str()));

        let fetched = Cluster::get(&client, &id).await.unwrap();
        assert_eq!(fetched.name.as_deref(), Some("cl"));
        assert_eq!(fetched.data_center.and_then(|d| d.meta.id), dc.meta.id.clone());
        assert_eq!(Cluster::list(&client).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clean_finished_tasks_records_action() {
        let client = MockOvirtClient::new("https://engine.test/ovirt-engine/api");
        let mut dc = DataCenter::new("dc");
        dc.save(&client).await.unwrap();

        dc.clean_finished_tasks(&client, false).await.unwrap();
        let actions = client.performed_actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].0, format!("{}/cleanfinishedtasks", dc.href().unwrap()));
    }
}
