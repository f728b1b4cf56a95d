//! oVirt REST API Client
//!
//! A Rust client library for the oVirt engine v4 REST API.
//! Provides typed models for data centers, clusters, hosts, storage, networks,
//! templates and virtual machines, with hyperlink-based persistence and typed
//! actions.
//!
//! # Example
//!
//! ```no_run
//! use ovirt_client::{Cluster, OvirtClient, OvirtConfig, Resource, StartOptions, Template, Vm};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Connect (SSO login, then fetch the API root)
//! let config = OvirtConfig::new(
//!     "https://engine.example.com/ovirt-engine/api",
//!     "admin@internal",
//!     "secret",
//! );
//! let client = OvirtClient::connect(config).await?;
//!
//! // Create a VM from the Blank template: POST to /vms
//! let mut vm = Vm::new("web01", Cluster::named("Default"), Template::named("Blank"));
//! vm.memory = Some(2 << 30);
//! vm.save(&client).await?;
//!
//! // Update it: PUT to its href
//! vm.description = Some("frontend".to_string());
//! vm.save(&client).await?;
//!
//! // Run an action, then re-read the state
//! vm.start(&client, StartOptions::default()).await?;
//! vm.refresh(&client).await?;
//!
//! // Search a collection
//! let web = Vm::query(&client, &[("search", "name=web*")]).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Generic persistence**: `get`, `list`, `query`, `save`, `refresh`, `delete`
//!   for every resource through the [`Resource`] trait
//! - **Typed actions**: VM power and snapshot operations, host maintenance,
//!   disk copy/move, exports
//! - **Authentication**: engine SSO bearer token or HTTP Basic
//! - **Transport debugging**: full request/response logging via `DEBUG_TRANSPORT`
//! - **Testing**: `MockOvirtClient` in-memory engine behind the `test-util` feature

pub mod client;
pub mod common;
pub mod config;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod ovirt_trait;
pub mod resource;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::OvirtClient;
pub use common::HttpClient;
pub use config::{AuthMethod, OvirtConfig};
pub use error::OvirtError;
pub use models::*;
pub use ovirt_trait::OvirtClientTrait;
pub use resource::Resource;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockOvirtClient;
