//! oVirt client errors

use crate::models::Fault;
use thiserror::Error;

/// Errors that can occur when interacting with the oVirt engine
#[derive(Debug, Error)]
pub enum OvirtError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The engine answered with a non-success status
    #[error("oVirt API error ({status}): {fault}")]
    Api {
        /// HTTP status code returned by the engine
        status: u16,
        /// Fault body, or the raw body text when it was not a fault document
        fault: Fault,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (bad credentials, expired token, SSO refusal)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation needs a server-side copy but the resource has no href yet
    #[error("{0} has not been saved to the server")]
    NotPersisted(&'static str),

    /// A link relation the operation needs is absent
    #[error("Missing link: {0}")]
    MissingLink(String),

    /// The engine accepted an action but reported it as failed
    #[error("Action {action} failed: {fault}")]
    ActionFailed {
        /// Action verb, e.g. `start`
        action: String,
        /// Fault reported in the action response
        fault: Fault,
    },

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl OvirtError {
    /// HTTP status code, when the error came from an engine response
    pub fn status(&self) -> Option<u16> {
        match self {
            OvirtError::Api { status, .. } => Some(*status),
            OvirtError::NotFound(_) => Some(404),
            OvirtError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether this error means the addressed resource does not exist
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
