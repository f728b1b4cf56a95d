//! Generic linked-resource persistence
//!
//! Every engine object is addressed by the `href` the engine hands out.
//! A resource without an href has not been saved yet: `save` creates it with
//! a POST to its collection, and once it has an href `save` updates it with a
//! PUT to that href. Responses always carry the full object, which replaces
//! the local copy.
//!
//! Top-level collections are found through the API root links (`vms`,
//! `datacenters`, ...). Sub-collections (`diskattachments`, `nics`, ...) are
//! found through the parent's own `link` array.

use crate::common::query::{collection_items, with_query};
use crate::error::OvirtError;
use crate::models::{Action, Meta};
use crate::ovirt_trait::OvirtClientTrait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// A typed engine resource with hyperlink-based persistence
#[async_trait::async_trait]
pub trait Resource: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// JSON key of the type inside collection bodies (e.g. `vm`)
    const KIND: &'static str;
    /// Relation of the collection holding this type (e.g. `vms`)
    const COLLECTION: &'static str;
    /// Name used in error messages
    const NAME: &'static str;

    fn meta(&self) -> &Meta;
    fn meta_mut(&mut self) -> &mut Meta;

    fn id(&self) -> Option<&str> {
        self.meta().id.as_deref()
    }

    fn href(&self) -> Option<&str> {
        self.meta().href.as_deref().filter(|h| !h.is_empty())
    }

    /// A resource with an href has been saved to the engine
    fn is_persisted(&self) -> bool {
        self.href().is_some()
    }

    /// Href of one of this resource's links (e.g. `nics` on a VM)
    fn link(&self, rel: &str) -> Option<&str> {
        self.meta().link(rel)
    }

    /// Reference placeholder pointing at this resource
    fn to_ref(&self) -> Self {
        let mut reference = Self::default();
        reference.meta_mut().id = self.meta().id.clone();
        reference.meta_mut().href = self.meta().href.clone();
        reference
    }

    /// Retrieve a resource from the server by id
    async fn get<C: OvirtClientTrait + ?Sized>(client: &C, id: &str) -> Result<Self, OvirtError> {
        let href = format!(
            "{}/{}",
            client.collection_href(Self::COLLECTION)?,
            urlencoding::encode(id)
        );
        debug!("Fetching {} {}", Self::KIND, id);
        let body = client.get_json(&href).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Retrieve every resource of this type
    async fn list<C: OvirtClientTrait + ?Sized>(client: &C) -> Result<Vec<Self>, OvirtError> {
        Self::query(client, &[]).await
    }

    /// Query the collection with engine parameters
    ///
    /// # Arguments
    /// * `filters` - Query parameters (e.g., [("search", "name=web*"), ("max", "10")])
    async fn query<C: OvirtClientTrait + ?Sized>(
        client: &C,
        filters: &[(&str, &str)],
    ) -> Result<Vec<Self>, OvirtError> {
        let href = with_query(&client.collection_href(Self::COLLECTION)?, filters);
        debug!("Querying {} with filters: {:?}", Self::COLLECTION, filters);
        let body = client.get_json(&href).await?;
        collection_items(body, Self::KIND)
    }

    /// First resource whose name matches exactly
    async fn find_by_name<C: OvirtClientTrait + ?Sized>(client: &C, name: &str) -> Result<Option<Self>, OvirtError> {
        let search = format!("name={}", name);
        let mut found = Self::query(client, &[("search", search.as_str())]).await?;
        Ok(if found.is_empty() { None } else { Some(found.swap_remove(0)) })
    }

    /// Retrieve the resources of this type linked from a parent
    /// (e.g. the disk attachments of a VM)
    async fn list_in<C, P>(client: &C, parent: &P) -> Result<Vec<Self>, OvirtError>
    where
        C: OvirtClientTrait + ?Sized,
        P: Resource,
    {
        let href = sub_collection_href::<Self, P>(parent)?;
        debug!("Listing {} of {} {}", Self::COLLECTION, P::KIND, parent.id().unwrap_or_default());
        let body = client.get_json(&href).await?;
        collection_items(body, Self::KIND)
    }

    /// Updates the server with the local copy
    ///
    /// POSTs to the collection when the resource has no href yet, PUTs to its
    /// href otherwise, and replaces the local copy with the engine's answer.
    async fn save<C: OvirtClientTrait + ?Sized>(&mut self, client: &C) -> Result<(), OvirtError> {
        let body = serde_json::to_value(&*self)?;
        let response = match self.href() {
            Some(href) => {
                debug!("Updating {} {}", Self::KIND, href);
                client.put_json(href, &body).await?
            }
            None => {
                let href = client.collection_href(Self::COLLECTION)?;
                debug!("Creating {} in {}", Self::KIND, href);
                client.post_json(&href, &body).await?
            }
        };
        *self = serde_json::from_value(response)?;
        Ok(())
    }

    /// Like [`save`](Resource::save), but creation goes to the parent's
    /// sub-collection
    async fn save_in<C, P>(&mut self, client: &C, parent: &P) -> Result<(), OvirtError>
    where
        C: OvirtClientTrait + ?Sized,
        P: Resource,
    {
        let body = serde_json::to_value(&*self)?;
        let response = match self.href() {
            Some(href) => {
                debug!("Updating {} {}", Self::KIND, href);
                client.put_json(href, &body).await?
            }
            None => {
                let href = sub_collection_href::<Self, P>(parent)?;
                debug!("Creating {} in {}", Self::KIND, href);
                client.post_json(&href, &body).await?
            }
        };
        *self = serde_json::from_value(response)?;
        Ok(())
    }

    /// Synchronize the local copy with the server
    async fn refresh<C: OvirtClientTrait + ?Sized>(&mut self, client: &C) -> Result<(), OvirtError> {
        let href = self.href().ok_or(OvirtError::NotPersisted(Self::NAME))?;
        debug!("Refreshing {} {}", Self::KIND, href);
        let body = client.get_json(href).await?;
        *self = serde_json::from_value(body)?;
        Ok(())
    }

    /// Remove the resource from the server
    async fn delete<C: OvirtClientTrait + ?Sized>(&self, client: &C) -> Result<(), OvirtError> {
        let href = self.href().ok_or(OvirtError::NotPersisted(Self::NAME))?;
        debug!("Deleting {} {}", Self::KIND, href);
        client.delete_href(href).await
    }

    /// Fetch the full resource behind a reference placeholder
    async fn resolve<C: OvirtClientTrait + ?Sized>(&self, client: &C) -> Result<Self, OvirtError> {
        match self.href() {
            Some(href) => {
                debug!("Resolving {} reference {}", Self::KIND, href);
                let body = client.get_json(href).await?;
                Ok(serde_json::from_value(body)?)
            }
            None => match self.id() {
                Some(id) => Self::get(client, id).await,
                None => Err(OvirtError::NotPersisted(Self::NAME)),
            },
        }
    }

    /// POST an action (e.g. `start`) to the resource
    ///
    /// A response whose status is `failed` becomes
    /// [`OvirtError::ActionFailed`].
    async fn perform<C: OvirtClientTrait + ?Sized>(
        &self,
        client: &C,
        action: &str,
        params: Action,
    ) -> Result<Action, OvirtError> {
        let href = self.href().ok_or(OvirtError::NotPersisted(Self::NAME))?;
        let body = serde_json::to_value(&params)?;
        debug!("Performing {} on {} {}", action, Self::KIND, href);
        let response = client.post_json(&format!("{}/{}", href, action), &body).await?;
        let result: Action = match response {
            Value::Null => Action::default(),
            other => serde_json::from_value(other)?,
        };
        if result.is_failed() {
            return Err(OvirtError::ActionFailed {
                action: action.to_string(),
                fault: result.fault.unwrap_or_default(),
            });
        }
        Ok(result)
    }
}

/// Href of the `T` collection below `parent`
///
/// Uses the parent's advertised link, falling back to the engine's
/// `<parent href>/<collection>` layout when the parent was built locally.
fn sub_collection_href<T: Resource, P: Resource>(parent: &P) -> Result<String, OvirtError> {
    if let Some(href) = parent.link(T::COLLECTION) {
        return Ok(href.to_string());
    }
    parent
        .href()
        .map(|href| format!("{}/{}", href, T::COLLECTION))
        .ok_or(OvirtError::NotPersisted(P::NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockOvirtClient;
    use crate::models::DataCenter;

    const ENGINE: &str = "https://engine.test/ovirt-engine/api";

    #[tokio::test]
    async fn test_unsaved_resource_cannot_refresh_or_delete() {
        let client = MockOvirtClient::new(ENGINE);
        let mut dc = DataCenter::new("draft");

        let err = dc.refresh(&client).await.unwrap_err();
        assert!(matches!(err, OvirtError::NotPersisted("DataCenter")));
        let err = dc.delete(&client).await.unwrap_err();
        assert!(matches!(err, OvirtError::NotPersisted("DataCenter")));

        // Nothing reached the engine
        assert_eq!(client.request_count("GET") + client.request_count("DELETE"), 0);
        assert_eq!(dc.name.as_deref(), Some("draft"));
    }

    #[tokio::test]
    async fn test_resolve_reference_by_href() {
        let client = MockOvirtClient::new(ENGINE);
        let mut dc = DataCenter::new("dc");
        dc.description = Some("primary site".to_string());
        dc.save(&client).await.unwrap();

        let reference = dc.to_ref();
        assert!(reference.name.is_none());

        let full = reference.resolve(&client).await.unwrap();
        assert_eq!(full.id(), dc.id());
        assert_eq!(full.name.as_deref(), Some("dc"));
        assert_eq!(full.description.as_deref(), Some("primary site"));
        assert_eq!(client.last_request_href().as_deref(), dc.href());
    }

    #[tokio::test]
    async fn test_resolve_id_only_reference_goes_through_collection() {
        let client = MockOvirtClient::new(ENGINE);
        let mut dc = DataCenter::new("dc");
        dc.save(&client).await.unwrap();

        let mut reference = DataCenter::default();
        reference.meta.id = dc.meta.id.clone();

        let full = reference.resolve(&client).await.unwrap();
        assert_eq!(full.name.as_deref(), Some("dc"));
        assert_eq!(
            client.last_request_href(),
            Some(format!("/ovirt-engine/api/datacenters/{}", dc.id().unwrap()))
        );
    }

    #[tokio::test]
    async fn test_resolve_empty_reference_is_not_persisted() {
        let client = MockOvirtClient::new(ENGINE);
        let err = DataCenter::default().resolve(&client).await.unwrap_err();
        assert!(matches!(err, OvirtError::NotPersisted("DataCenter")));
        assert_eq!(client.request_count("GET"), 0);
    }
}
