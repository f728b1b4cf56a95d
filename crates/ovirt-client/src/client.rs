//! oVirt engine client
//!
//! Authenticates once (SSO bearer token or HTTP Basic), fetches the API root
//! and keeps its collection links. Every call afterwards is a single HTTP
//! round trip through [`HttpClient`].

use crate::common::HttpClient;
use crate::config::{AuthMethod, OvirtConfig};
use crate::error::OvirtError;
use crate::models::{ApiRoot, ProductInfo};
use crate::ovirt_trait::OvirtClientTrait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Answer of the engine SSO token endpoint
#[derive(Debug, Default, Deserialize)]
struct SsoToken {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// oVirt API client
#[derive(Debug, Clone)]
pub struct OvirtClient {
    http: HttpClient,
    root: ApiRoot,
}

impl OvirtClient {
    /// Connect and authenticate to the engine
    ///
    /// # Arguments
    /// * `config` - Engine URL, credentials and TLS settings
    pub async fn connect(config: OvirtConfig) -> Result<Self, OvirtError> {
        config.validate()?;

        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if let Some(ca_file) = &config.ca_file {
            let pem = tokio::fs::read(ca_file)
                .await
                .map_err(|e| OvirtError::InvalidConfig(format!("cannot read CA file {}: {}", ca_file.display(), e)))?;
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?);
        }
        if config.insecure {
            warn!("TLS certificate verification is disabled for {}", config.url);
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build()?;

        let auth = match config.auth {
            AuthMethod::Sso => format!("Bearer {}", sso_login(&client, &config).await?),
            AuthMethod::Basic => basic_auth(&config.username, &config.password),
        };

        let http = HttpClient::new(client, &config.url, auth, config.debug_transport)?;
        let root: ApiRoot = serde_json::from_value(http.get(http.base_url()).await?)?;

        let version = root
            .product_info
            .as_ref()
            .and_then(|p| p.version.as_ref())
            .and_then(|v| v.full_version.clone())
            .unwrap_or_else(|| "unknown".to_string());
        info!(
            "Connected to {} as {} (engine version {}, {} collections)",
            http.base_url(),
            config.username,
            version,
            root.links.len()
        );

        Ok(Self { http, root })
    }

    /// Connect with [`OvirtConfig::from_env`]
    pub async fn from_env() -> Result<Self, OvirtError> {
        Self::connect(OvirtConfig::from_env()?).await
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// API root document fetched at connect time
    pub fn api_root(&self) -> &ApiRoot {
        &self.root
    }

    pub fn product_info(&self) -> Option<&ProductInfo> {
        self.root.product_info.as_ref()
    }

    /// Check that the engine is still reachable with the current credentials
    pub async fn validate_connection(&self) -> Result<(), OvirtError> {
        debug!("Validating oVirt engine connectivity");
        self.http.get(self.http.base_url()).await?;
        debug!("Connection validated successfully");
        Ok(())
    }

    /// Href of a top-level collection from the API root links
    pub fn collection_href(&self, rel: &str) -> Result<String, OvirtError> {
        self.root
            .link(rel)
            .map(str::to_string)
            .ok_or_else(|| OvirtError::MissingLink(format!("API root has no {} link", rel)))
    }
}

/// SSO token endpoint below the engine context, e.g.
/// `https://engine/ovirt-engine/sso/oauth/token` for
/// `https://engine/ovirt-engine/api`
pub(crate) fn sso_token_url(api_url: &str) -> Result<String, OvirtError> {
    api_url
        .trim_end_matches('/')
        .strip_suffix("/api")
        .map(|engine| format!("{}/sso/oauth/token", engine))
        .ok_or_else(|| {
            OvirtError::InvalidConfig(format!("cannot derive the SSO endpoint from {}: URL must end in /api", api_url))
        })
}

pub(crate) fn basic_auth(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    format!(
        "Basic {}",
        base64::Engine::encode(&base64::engine::general_purpose::STANDARD, credentials)
    )
}

/// Password grant against the engine SSO, returning the access token
async fn sso_login(client: &Client, config: &OvirtConfig) -> Result<String, OvirtError> {
    let url = sso_token_url(&config.url)?;
    debug!("Requesting SSO token from {} for {}", url, config.username);

    let response = client
        .post(&url)
        .header("Accept", "application/json")
        .form(&[
            ("grant_type", "password"),
            ("scope", "ovirt-app-api"),
            ("username", config.username.as_str()),
            ("password", config.password.as_str()),
        ])
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;
    let token: SsoToken = serde_json::from_str(&text).unwrap_or_default();

    match token.access_token {
        Some(access_token) if status.is_success() && token.error.is_none() => Ok(access_token),
        _ => {
            let reason = token
                .error_description
                .or(token.error)
                .unwrap_or_else(|| format!("{} - {}", status, text.trim()));
            Err(OvirtError::Authentication(format!("SSO login for {} failed: {}", config.username, reason)))
        }
    }
}

#[async_trait::async_trait]
impl OvirtClientTrait for OvirtClient {
    fn base_url(&self) -> &str {
        self.base_url()
    }

    async fn validate_connection(&self) -> Result<(), OvirtError> {
        self.validate_connection().await
    }

    fn collection_href(&self, rel: &str) -> Result<String, OvirtError> {
        self.collection_href(rel)
    }

    async fn get_json(&self, href: &str) -> Result<Value, OvirtError> {
        self.http.get(href).await
    }

    async fn post_json(&self, href: &str, body: &Value) -> Result<Value, OvirtError> {
        self.http.post(href, body).await
    }

    async fn put_json(&self, href: &str, body: &Value) -> Result<Value, OvirtError> {
        self.http.put(href, body).await
    }

    async fn delete_href(&self, href: &str) -> Result<(), OvirtError> {
        self.http.delete(href).await
    }
}
