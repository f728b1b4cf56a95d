//! Template model

use super::{Action, Cluster, Cpu, Display, HighAvailability, Meta, OperatingSystem, StorageDomain, Vm, epoch_millis};
use crate::common::wire;
use crate::error::OvirtError;
use crate::ovirt_trait::OvirtClientTrait;
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Template status choices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TemplateStatus {
    Illegal,
    Locked,
    Ok,
    #[serde(other)]
    Unknown,
}

/// Position of a template in its version chain
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_template: Option<Box<Template>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,
    #[serde(default, with = "wire::opt_i64", skip_serializing_if = "Option::is_none")]
    pub version_number: Option<i64>,
}

/// A template VMs are created from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Template {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<Box<Cluster>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Cpu>,
    #[serde(default, with = "wire::opt_i64", skip_serializing)]
    pub creation_time: Option<i64>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub delete_protected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_availability: Option<HighAvailability>,
    #[serde(default, with = "wire::opt_u64", skip_serializing_if = "Option::is_none")]
    pub memory: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OperatingSystem>,
    #[serde(default, with = "wire::opt_bool", skip_serializing_if = "Option::is_none")]
    pub stateless: Option<bool>,
    #[serde(default, skip_serializing)]
    pub status: Option<TemplateStatus>,
    /// `desktop`, `server` or `high_performance`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<TemplateVersion>,
    /// Source VM when creating a template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm: Option<Box<Vm>>,
}

impl Resource for Template {
    const KIND: &'static str = "template";
    const COLLECTION: &'static str = "templates";
    const NAME: &'static str = "Template";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

impl Template {
    /// Reference to a template by name (e.g. `Blank`)
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// New unsaved template sealed from an existing VM
    pub fn from_vm(name: impl Into<String>, vm: &Vm) -> Self {
        Self {
            name: Some(name.into()),
            vm: Some(Box::new(vm.to_ref())),
            ..Default::default()
        }
    }

    pub fn creation_time(&self) -> Option<DateTime<Utc>> {
        epoch_millis(self.creation_time)
    }

    /// Exports the template to an export domain
    pub async fn export<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        asynchronous: bool,
        exclusive: bool,
        storage_domain: StorageDomain,
    ) -> Result<(), OvirtError> {
        let action = Action {
            asynchronous: Some(asynchronous),
            exclusive: Some(exclusive),
            storage_domain: Some(Box::new(storage_domain)),
            ..Default::default()
        };
        self.perform(client, "export", action).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockOvirtClient;

    #[test]
    fn test_from_vm_sends_only_the_reference() {
        let mut vm = Vm::new("golden", Cluster::default(), Template::named("Blank"));
        vm.meta.id = Some("v1".to_string());
        vm.meta.href = Some("/ovirt-engine/api/vms/v1".to_string());

        let template = Template::from_vm("golden-tpl", &vm);
        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "golden-tpl",
                "vm": {"id": "v1", "href": "/ovirt-engine/api/vms/v1"}
            })
        );
    }

    #[test]
    fn test_creation_time() {
        let template: Template =
            serde_json::from_value(serde_json::json!({"name": "Blank", "creation_time": 1_199_145_600_000_i64})).unwrap();
        assert_eq!(template.creation_time().unwrap().to_rfc3339(), "2008-01-01T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_export_action() {
        let client = MockOvirtClient::new("https://engine.test/ovirt-engine/api");
        let mut template = Template::named("tpl");
        template.save(&client).await.unwrap();

        template
            .export(&client, false, true, StorageDomain::named("export"))
            .await
            .unwrap();

        let (href, body) = &client.performed_actions()[0];
        assert!(href.ends_with("/export"));
        assert_eq!(body["exclusive"], "true");
        assert_eq!(body["storage_domain"]["name"], "export");
    }
}
