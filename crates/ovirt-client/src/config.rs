//! Client configuration
//!
//! Loaded from `OVIRT_*` environment variables or from a YAML file:
//!
//! ```yaml
//! url: https://engine.example.com/ovirt-engine/api
//! username: admin@internal
//! password: secret
//! auth: sso
//! ca_file: /etc/pki/ovirt-engine/ca.pem
//! timeout_secs: 60
//! ```

use crate::error::OvirtError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How the client authenticates against the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// OAuth password grant against the engine SSO, then bearer token
    #[default]
    Sso,
    /// HTTP Basic credentials on every request
    Basic,
}

impl FromStr for AuthMethod {
    type Err = OvirtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sso" | "oauth" => Ok(AuthMethod::Sso),
            "basic" => Ok(AuthMethod::Basic),
            other => Err(OvirtError::InvalidConfig(format!(
                "unknown auth method {:?}, expected sso or basic",
                other
            ))),
        }
    }
}

/// Connection settings for [`OvirtClient`](crate::client::OvirtClient)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvirtConfig {
    /// API entry point, e.g. `https://engine/ovirt-engine/api`
    pub url: String,
    /// User with profile, e.g. `admin@internal`
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub auth: AuthMethod,
    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure: bool,
    /// PEM bundle of the engine CA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_file: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Log full request and response bodies
    #[serde(default)]
    pub debug_transport: bool,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl fmt::Debug for OvirtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OvirtConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("auth", &self.auth)
            .field("insecure", &self.insecure)
            .field("ca_file", &self.ca_file)
            .field("timeout_secs", &self.timeout_secs)
            .field("debug_transport", &self.debug_transport)
            .finish()
    }
}

impl OvirtConfig {
    /// Settings with the defaults for everything but the credentials
    pub fn new(url: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            auth: AuthMethod::default(),
            insecure: false,
            ca_file: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            debug_transport: false,
        }
    }

    /// Load configuration from environment variables
    ///
    /// `OVIRT_URL`, `OVIRT_USERNAME` and `OVIRT_PASSWORD` are required.
    /// Optional: `OVIRT_AUTH` (`sso`|`basic`), `OVIRT_INSECURE`,
    /// `OVIRT_CA_FILE`, `OVIRT_TIMEOUT_SECS`, `DEBUG_TRANSPORT`.
    pub fn from_env() -> Result<Self, OvirtError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, OvirtError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| OvirtError::InvalidConfig(format!("{} environment variable is required", key)))
        };

        let mut config = Self::new(required("OVIRT_URL")?, required("OVIRT_USERNAME")?, required("OVIRT_PASSWORD")?);

        if let Some(auth) = lookup("OVIRT_AUTH") {
            config.auth = auth.parse()?;
        }
        config.insecure = lookup("OVIRT_INSECURE").is_some_and(|v| parse_flag(&v));
        config.ca_file = lookup("OVIRT_CA_FILE").filter(|v| !v.is_empty()).map(PathBuf::from);
        if let Some(timeout) = lookup("OVIRT_TIMEOUT_SECS") {
            config.timeout_secs = timeout
                .trim()
                .parse()
                .map_err(|e| OvirtError::InvalidConfig(format!("OVIRT_TIMEOUT_SECS={:?}: {}", timeout, e)))?;
        }
        config.debug_transport = lookup("DEBUG_TRANSPORT").is_some_and(|v| parse_flag(&v));

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, OvirtError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| OvirtError::InvalidConfig(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, OvirtError> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| OvirtError::InvalidConfig(format!("invalid YAML configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings can produce a working client
    pub fn validate(&self) -> Result<(), OvirtError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(OvirtError::InvalidConfig(format!(
                "engine URL must be http(s), got {:?}",
                self.url
            )));
        }
        if self.username.is_empty() {
            return Err(OvirtError::InvalidConfig("username must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(OvirtError::InvalidConfig("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

/// `1`, `true`, `yes` and `on` enable a switch
fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_env_defaults() {
        let config = OvirtConfig::from_lookup(lookup(&[
            ("OVIRT_URL", "https://engine/ovirt-engine/api"),
            ("OVIRT_USERNAME", "admin@internal"),
            ("OVIRT_PASSWORD", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.auth, AuthMethod::Sso);
        assert!(!config.insecure);
        assert!(!config.debug_transport);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.ca_file.is_none());
    }

    #[test]
    fn test_from_env_optional_switches() {
        let config = OvirtConfig::from_lookup(lookup(&[
            ("OVIRT_URL", "https://engine/ovirt-engine/api"),
            ("OVIRT_USERNAME", "admin@internal"),
            ("OVIRT_PASSWORD", "secret"),
            ("OVIRT_AUTH", "Basic"),
            ("OVIRT_INSECURE", "yes"),
            ("OVIRT_CA_FILE", "/etc/pki/ca.pem"),
            ("OVIRT_TIMEOUT_SECS", "90"),
            ("DEBUG_TRANSPORT", "1"),
        ]))
        .unwrap();

        assert_eq!(config.auth, AuthMethod::Basic);
        assert!(config.insecure);
        assert!(config.debug_transport);
        assert_eq!(config.timeout_secs, 90);
        assert_eq!(config.ca_file, Some(PathBuf::from("/etc/pki/ca.pem")));
    }

    #[test]
    fn test_from_env_missing_password() {
        let err = OvirtConfig::from_lookup(lookup(&[
            ("OVIRT_URL", "https://engine/ovirt-engine/api"),
            ("OVIRT_USERNAME", "admin@internal"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("OVIRT_PASSWORD"));
    }

    #[test]
    fn test_from_env_rejects_bad_values() {
        let base = [
            ("OVIRT_URL", "https://engine/ovirt-engine/api"),
            ("OVIRT_USERNAME", "admin@internal"),
            ("OVIRT_PASSWORD", "secret"),
        ];

        let mut vars = base.to_vec();
        vars.push(("OVIRT_AUTH", "kerberos"));
        assert!(matches!(
            OvirtConfig::from_lookup(lookup(&vars)),
            Err(OvirtError::InvalidConfig(_))
        ));

        let mut vars = base.to_vec();
        vars.push(("OVIRT_TIMEOUT_SECS", "soon"));
        assert!(OvirtConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_from_yaml() {
        let config = OvirtConfig::from_yaml_str(
            "url: https://engine/ovirt-engine/api\nusername: admin@internal\npassword: secret\nauth: basic\ntimeout_secs: 5\n",
        )
        .unwrap();
        assert_eq!(config.auth, AuthMethod::Basic);
        assert_eq!(config.timeout_secs, 5);

        let err = OvirtConfig::from_yaml_str("url: ftp://engine\nusername: a\npassword: b\n").unwrap_err();
        assert!(matches!(err, OvirtError::InvalidConfig(_)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = OvirtConfig::new("https://engine/ovirt-engine/api", "admin@internal", "hunter2");
        let dump = format!("{:?}", config);
        assert!(!dump.contains("hunter2"));
        assert!(dump.contains("<redacted>"));
    }
}
