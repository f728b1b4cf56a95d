//! Mock OvirtClient for unit testing
//!
//! This module provides an in-memory engine implementing OvirtClientTrait so
//! typed resources can be exercised without a running oVirt engine.
//!
//! The mock follows the engine's hyperlink layout:
//! - the API root links every top-level collection (`/ovirt-engine/api/vms`)
//! - POST to a collection stores the object under `<collection>/<uuid>` and
//!   adds its sub-collection links (`vms` get `diskattachments`, `nics` and
//!   `snapshots`, `datacenters` get `clusters` and `networks`, ...)
//! - data center, cluster and network sub-collections are views of the root
//!   collections filtered on the member's reference (`datacenters/<id>/clusters`
//!   lists the clusters whose `data_center.id` is `<id>`); POST to such a view
//!   creates the member in the root collection. VM disk attachments, NICs and
//!   snapshots are stored below the VM
//! - POST to `<object>/<verb>` is an action; it is recorded and completes
//! - PUT merges the body into the stored object, DELETE removes the object
//!   together with everything below it
//! - `search=key=value` and `max=N` filter collection listings

mod helpers;

use crate::common::status_error;
use crate::error::OvirtError;
use crate::models::Fault;
use crate::ovirt_trait::OvirtClientTrait;
use helpers::{
    ROOT_COLLECTIONS, collection_rel_of, kind_of, linked_view, matches_search, merge, reference_id, server_defaults,
    split_href, sub_collections,
};
use reqwest::{Method, StatusCode, Url};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Clone)]
pub(crate) struct Stored {
    seq: u64,
    object: Value,
}

/// Where the members of a collection path live
#[derive(Debug)]
enum Collection {
    /// Stored directly below the collection path
    Owned { path: String, kind: &'static str },
    /// Root collection members whose `reference` points at `parent`
    View {
        root: String,
        kind: &'static str,
        reference: &'static str,
        parent: String,
    },
}

/// Mock OvirtClient for testing
///
/// This mock stores objects in memory keyed by href and records every request
/// so tests can assert on what was sent.
#[derive(Debug, Clone)]
pub struct MockOvirtClient {
    pub(crate) base_url: String,
    pub(crate) api_path: String,
    pub(crate) objects: Arc<Mutex<HashMap<String, Stored>>>,
    pub(crate) requests: Arc<Mutex<Vec<(Method, String)>>>,
    pub(crate) actions: Arc<Mutex<Vec<(String, Value)>>>,
    pub(crate) next_failure: Arc<Mutex<Option<(u16, Fault)>>>,
    pub(crate) next_action_failure: Arc<Mutex<Option<Fault>>>,
    // Creation order, so listings come back in insertion order
    pub(crate) next_seq: Arc<Mutex<u64>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockOvirtClient {
    /// Create a new mock engine
    ///
    /// # Arguments
    /// * `base_url` - API entry point, e.g. "https://engine.test/ovirt-engine/api"
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let (api_path, _) = split_href(&base_url);
        Self {
            base_url,
            api_path,
            objects: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            actions: Arc::new(Mutex::new(Vec::new())),
            next_failure: Arc::new(Mutex::new(None)),
            next_action_failure: Arc::new(Mutex::new(None)),
            next_seq: Arc::new(Mutex::new(1)),
        }
    }

    /// Store an object in a top-level collection (for test setup)
    ///
    /// Returns the stored object with its engine-assigned `id`, `href` and links.
    pub fn add_object(&self, rel: &str, object: Value) -> Result<Value, OvirtError> {
        let kind = ROOT_COLLECTIONS
            .iter()
            .find(|(r, _)| *r == rel)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| OvirtError::MissingLink(format!("API root has no {} link", rel)))?;
        self.create(&format!("{}/{}", self.api_path, rel), kind, &object)
    }

    /// Make the next request fail with the given HTTP status and fault
    pub fn fail_next(&self, status: u16, fault: Fault) {
        *lock(&self.next_failure) = Some((status, fault));
    }

    /// Make the next action complete with `status: failed` and the given fault
    pub fn fail_next_action(&self, fault: Fault) {
        *lock(&self.next_action_failure) = Some(fault);
    }

    /// Number of requests made with an HTTP method (`"GET"`, `"PUT"`, ...)
    pub fn request_count(&self, method: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|(m, _)| m.as_str() == method)
            .count()
    }

    /// Href (including the query string) of the latest request
    pub fn last_request_href(&self) -> Option<String> {
        lock(&self.requests).last().map(|(_, href)| href.clone())
    }

    /// Actions performed so far as `(<object href>/<verb>, body)`
    pub fn performed_actions(&self) -> Vec<(String, Value)> {
        lock(&self.actions).clone()
    }

    /// Stored copy of an object, by href
    pub fn object(&self, href: &str) -> Option<Value> {
        let (path, _) = split_href(href);
        lock(&self.objects).get(&path).map(|stored| stored.object.clone())
    }

    fn next_seq(&self) -> u64 {
        let mut seq = lock(&self.next_seq);
        let current = *seq;
        *seq += 1;
        current
    }

    /// Log the request and apply a pending injected failure
    fn record(&self, method: Method, href: &str) -> Result<(), OvirtError> {
        debug!("mock {} {}", method, href);
        lock(&self.requests).push((method.clone(), href.to_string()));

        match lock(&self.next_failure).take() {
            Some((status, fault)) => {
                let url = Url::parse(&self.base_url)
                    .and_then(|base| base.join(href))
                    .map_err(|e| OvirtError::InvalidConfig(format!("invalid href {}: {}", href, e)))?;
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let body = serde_json::to_string(&fault)?;
                Err(status_error(&method, &url, status, &body))
            }
            None => Ok(()),
        }
    }

    /// Resolve `path` to a collection, if it is one
    fn collection(&self, path: &str) -> Option<Collection> {
        let (parent, rel) = path.rsplit_once('/')?;
        if parent == self.api_path {
            let kind = ROOT_COLLECTIONS.iter().find(|(r, _)| *r == rel).map(|(_, kind)| *kind)?;
            return Some(Collection::Owned {
                path: path.to_string(),
                kind,
            });
        }
        let parent_rel = collection_rel_of(parent)?;
        if !sub_collections(parent_rel).contains(&rel) || !lock(&self.objects).contains_key(parent) {
            return None;
        }
        let kind = kind_of(rel)?;
        Some(match linked_view(parent_rel, rel) {
            Some(reference) => Collection::View {
                root: format!("{}/{}", self.api_path, rel),
                kind,
                reference,
                parent: parent.to_string(),
            },
            None => Collection::Owned {
                path: path.to_string(),
                kind,
            },
        })
    }

    /// Create a member of a view in its root collection, pointing its
    /// reference at the view's parent unless the body already sets one
    fn create_in_view(
        &self,
        root: &str,
        kind: &str,
        reference: &str,
        parent: &str,
        body: &Value,
    ) -> Result<Value, OvirtError> {
        let mut body = body.clone();
        if reference_id(&body, reference).is_none() {
            if let Value::Object(fields) = &mut body {
                let parent_id = parent.rsplit('/').next().unwrap_or_default();
                fields.insert(reference.to_string(), json!({"id": parent_id, "href": parent}));
            }
        }
        self.create(root, kind, &body)
    }

    fn create(&self, collection: &str, kind: &str, body: &Value) -> Result<Value, OvirtError> {
        let Value::Object(fields) = body else {
            return Err(OvirtError::Api {
                status: 400,
                fault: Fault::detail(format!("expected a {} object", kind)),
            });
        };

        let id = uuid::Uuid::new_v4().to_string();
        let href = format!("{}/{}", collection, id);
        let mut object = Map::new();
        merge(&mut object, fields);
        object.insert("id".to_string(), Value::from(id));
        object.insert("href".to_string(), Value::from(href.clone()));

        let links: Vec<Value> = collection_rel_of(&href)
            .map(sub_collections)
            .unwrap_or_default()
            .iter()
            .map(|sub| json!({"href": format!("{}/{}", href, sub), "rel": sub}))
            .collect();
        if !links.is_empty() {
            object.insert("link".to_string(), Value::Array(links));
        }
        server_defaults(kind, &mut object);

        let object = Value::Object(object);
        let seq = self.next_seq();
        lock(&self.objects).insert(
            href,
            Stored {
                seq,
                object: object.clone(),
            },
        );
        Ok(object)
    }

    /// List `collection`; `owner` keeps only members whose reference field
    /// (first) has the given id (second)
    fn list(
        &self,
        collection: &str,
        kind: &str,
        owner: Option<(&str, &str)>,
        params: &[(String, String)],
    ) -> Value {
        let search = params.iter().find(|(k, _)| k == "search").map(|(_, v)| v.as_str());
        let max = params
            .iter()
            .find(|(k, _)| k == "max")
            .and_then(|(_, v)| v.parse::<usize>().ok());

        let objects = lock(&self.objects);
        let mut members: Vec<&Stored> = objects
            .iter()
            .filter(|(href, _)| href.rsplit_once('/').is_some_and(|(parent, _)| parent == collection))
            .map(|(_, stored)| stored)
            .filter(|stored| owner.is_none_or(|(reference, id)| reference_id(&stored.object, reference) == Some(id)))
            .filter(|stored| search.is_none_or(|s| matches_search(&stored.object, s)))
            .collect();
        members.sort_by_key(|stored| stored.seq);
        if let Some(max) = max {
            members.truncate(max);
        }

        if members.is_empty() {
            // The engine omits the key entirely for an empty collection
            return json!({});
        }
        let items: Vec<Value> = members.into_iter().map(|stored| stored.object.clone()).collect();
        json!({ kind: items })
    }

    fn api_root(&self) -> Value {
        let links: Vec<Value> = ROOT_COLLECTIONS
            .iter()
            .map(|(rel, _)| json!({"href": format!("{}/{}", self.api_path, rel), "rel": rel}))
            .collect();
        json!({
            "link": links,
            "product_info": {
                "name": "oVirt Engine",
                "vendor": "ovirt.org",
                "version": {"major": "4", "minor": "5", "build": "0", "revision": "0", "full_version": "4.5.0-mock"}
            },
            "time": chrono::Utc::now().timestamp_millis()
        })
    }

    fn not_found(path: &str) -> OvirtError {
        OvirtError::NotFound(format!("Resource not found: {}", path))
    }
}

#[async_trait::async_trait]
impl OvirtClientTrait for MockOvirtClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn validate_connection(&self) -> Result<(), OvirtError> {
        self.record(Method::GET, &self.api_path)
    }

    fn collection_href(&self, rel: &str) -> Result<String, OvirtError> {
        if ROOT_COLLECTIONS.iter().any(|(r, _)| *r == rel) {
            Ok(format!("{}/{}", self.api_path, rel))
        } else {
            Err(OvirtError::MissingLink(format!("API root has no {} link", rel)))
        }
    }

    async fn get_json(&self, href: &str) -> Result<Value, OvirtError> {
        self.record(Method::GET, href)?;
        let (path, params) = split_href(href);

        if path == self.api_path {
            return Ok(self.api_root());
        }
        match self.collection(&path) {
            Some(Collection::Owned { path, kind }) => return Ok(self.list(&path, kind, None, &params)),
            Some(Collection::View {
                root,
                kind,
                reference,
                parent,
            }) => {
                let parent_id = parent.rsplit('/').next().unwrap_or_default();
                return Ok(self.list(&root, kind, Some((reference, parent_id)), &params));
            }
            None => {}
        }
        lock(&self.objects)
            .get(&path)
            .map(|stored| stored.object.clone())
            .ok_or_else(|| Self::not_found(&path))
    }

    async fn post_json(&self, href: &str, body: &Value) -> Result<Value, OvirtError> {
        self.record(Method::POST, href)?;
        let (path, _) = split_href(href);

        match self.collection(&path) {
            Some(Collection::Owned { path, kind }) => return self.create(&path, kind, body),
            Some(Collection::View {
                root,
                kind,
                reference,
                parent,
            }) => return self.create_in_view(&root, kind, reference, &parent, body),
            None => {}
        }

        let target_exists = path
            .rsplit_once('/')
            .is_some_and(|(object, _verb)| lock(&self.objects).contains_key(object));
        if !target_exists {
            return Err(Self::not_found(&path));
        }

        lock(&self.actions).push((path, body.clone()));
        match lock(&self.next_action_failure).take() {
            Some(fault) => Ok(json!({"status": "failed", "fault": fault})),
            None => Ok(json!({"status": "complete"})),
        }
    }

    async fn put_json(&self, href: &str, body: &Value) -> Result<Value, OvirtError> {
        self.record(Method::PUT, href)?;
        let (path, _) = split_href(href);

        let mut objects = lock(&self.objects);
        let stored = objects.get_mut(&path).ok_or_else(|| Self::not_found(&path))?;
        if let (Value::Object(existing), Value::Object(update)) = (&mut stored.object, body) {
            merge(existing, update);
        }
        Ok(stored.object.clone())
    }

    async fn delete_href(&self, href: &str) -> Result<(), OvirtError> {
        self.record(Method::DELETE, href)?;
        let (path, _) = split_href(href);

        let mut objects = lock(&self.objects);
        if objects.remove(&path).is_none() {
            return Err(Self::not_found(&path));
        }
        let below = format!("{}/", path);
        objects.retain(|href, _| !href.starts_with(&below));
        Ok(())
    }
}
