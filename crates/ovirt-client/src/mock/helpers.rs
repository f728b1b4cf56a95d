//! Engine layout tables and request helpers for the mock engine

use serde_json::{Map, Value};

/// Root collection relations and the JSON key of their members
pub(crate) const ROOT_COLLECTIONS: &[(&str, &str)] = &[
    ("clusters", "cluster"),
    ("datacenters", "data_center"),
    ("disks", "disk"),
    ("hosts", "host"),
    ("networks", "network"),
    ("storagedomains", "storage_domain"),
    ("templates", "template"),
    ("vms", "vm"),
    ("vnicprofiles", "vnic_profile"),
];

/// Sub-collections each kind of object links to
const SUB_COLLECTIONS: &[(&str, &[&str])] = &[
    ("clusters", &["networks"]),
    ("datacenters", &["clusters", "networks"]),
    ("networks", &["vnicprofiles"]),
    ("vms", &["diskattachments", "nics", "snapshots"]),
];

/// Sub-collections the engine serves as views of a root collection:
/// `(parent rel, sub rel, reference field)`. Members live in the root
/// collection and belong to the view when `reference.id` is the parent's id.
const LINKED_VIEWS: &[(&str, &str, &str)] = &[
    ("clusters", "networks", "cluster"),
    ("datacenters", "clusters", "data_center"),
    ("datacenters", "networks", "data_center"),
    ("networks", "vnicprofiles", "network"),
];

/// Reference field linking members of `rel` below a `parent_rel` object
pub(crate) fn linked_view(parent_rel: &str, rel: &str) -> Option<&'static str> {
    LINKED_VIEWS
        .iter()
        .find(|(parent, sub, _)| *parent == parent_rel && *sub == rel)
        .map(|(_, _, reference)| *reference)
}

/// Id of the object `object[key]` refers to
pub(crate) fn reference_id<'a>(object: &'a Value, key: &str) -> Option<&'a str> {
    object.get(key)?.get("id")?.as_str()
}

/// JSON member key of any collection relation
pub(crate) fn kind_of(rel: &str) -> Option<&'static str> {
    match rel {
        "diskattachments" => Some("disk_attachment"),
        "nics" => Some("nic"),
        "snapshots" => Some("snapshot"),
        _ => ROOT_COLLECTIONS.iter().find(|(r, _)| *r == rel).map(|(_, kind)| *kind),
    }
}

pub(crate) fn sub_collections(rel: &str) -> &'static [&'static str] {
    SUB_COLLECTIONS
        .iter()
        .find(|(r, _)| *r == rel)
        .map(|(_, subs)| *subs)
        .unwrap_or_default()
}

/// Collection relation an object href belongs to: `vms` for `/api/vms/1`
pub(crate) fn collection_rel_of(object_href: &str) -> Option<&str> {
    let (collection, _id) = object_href.rsplit_once('/')?;
    collection.rsplit('/').next()
}

/// Split an href into its path (no origin) and decoded query parameters
pub(crate) fn split_href(href: &str) -> (String, Vec<(String, String)>) {
    let without_origin = match href.find("://") {
        Some(scheme_end) => {
            let rest = &href[scheme_end + 3..];
            rest.find('/').map_or("/", |slash| &rest[slash..])
        }
        None => href,
    };
    let (path, query) = without_origin.split_once('?').unwrap_or((without_origin, ""));
    let params = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect();
    (path.trim_end_matches('/').to_string(), params)
}

fn decode(text: &str) -> String {
    urlencoding::decode(text)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| text.to_string())
}

/// Whether an object matches an engine search expression
///
/// Supports `key=value` terms joined with ` and `; a trailing `*` matches a
/// prefix. `key` is compared against the object's own field or the `name`
/// or `id` of a referenced object; `key.field` addresses one field of a
/// referenced object (`cluster.id=...`).
pub(crate) fn matches_search(object: &Value, search: &str) -> bool {
    search.split(" and ").all(|term| match term.trim().split_once('=') {
        Some((key, pattern)) => field_values(object, key.trim())
            .iter()
            .any(|value| matches_pattern(value, pattern.trim())),
        None => true,
    })
}

fn field_values<'a>(object: &'a Value, key: &str) -> Vec<&'a str> {
    if let Some((reference, sub)) = key.split_once('.') {
        return object
            .get(reference)
            .and_then(|r| r.get(sub))
            .and_then(Value::as_str)
            .into_iter()
            .collect();
    }
    let Some(field) = object.get(key) else {
        return Vec::new();
    };
    match field {
        Value::String(s) => vec![s.as_str()],
        Value::Object(_) => ["name", "id"]
            .iter()
            .filter_map(|k| field.get(*k).and_then(Value::as_str))
            .collect(),
        _ => Vec::new(),
    }
}

fn matches_pattern(value: &str, pattern: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => value.starts_with(prefix),
        None => value == pattern,
    }
}

/// Merge `update` into `target`, key by key, recursing into objects
pub(crate) fn merge(target: &mut Map<String, Value>, update: &Map<String, Value>) {
    for (key, value) in update {
        if matches!(key.as_str(), "id" | "href" | "link" | "actions") {
            continue;
        }
        if let Value::Object(incoming) = value {
            if let Some(Value::Object(existing)) = target.get_mut(key) {
                merge(existing, incoming);
                continue;
            }
        }
        target.insert(key.clone(), value.clone());
    }
}

/// Read-only fields the engine fills in on creation
pub(crate) fn server_defaults(kind: &str, object: &mut Map<String, Value>) {
    let now = Value::from(chrono::Utc::now().timestamp_millis());
    let defaults = match kind {
        "vm" => vec![("status", Value::from("down")), ("creation_time", now)],
        "template" => vec![("status", Value::from("ok")), ("creation_time", now)],
        "host" => vec![("status", Value::from("installing"))],
        "disk" => vec![("status", Value::from("ok"))],
        "data_center" => vec![("status", Value::from("uninitialized"))],
        "storage_domain" => vec![("status", Value::from("unattached"))],
        "snapshot" => vec![
            ("snapshot_status", Value::from("ok")),
            ("snapshot_type", Value::from("regular")),
            ("date", now),
        ],
        _ => Vec::new(),
    };
    for (key, value) in defaults {
        object.entry(key.to_string()).or_insert(value);
    }
}
