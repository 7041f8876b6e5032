//! Configuration management for PostPulse hosts

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::credentials::{Credential, DEFAULT_BASE_URL};
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub client_id: Option<String>,
    pub access_token: Option<String>,
    /// Name of an environment variable holding the access token
    pub access_token_env: Option<String>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            client_id: None,
            access_token: None,
            access_token_env: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Record per-item failures as `{error}` results instead of aborting the batch
    #[serde(default)]
    pub continue_on_fail: bool,
    #[serde(default)]
    pub upload_protocol: UploadProtocol,
}

/// How files are uploaded by the media `upload` operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadProtocol {
    /// Request a presigned URL, then upload straight to storage
    #[default]
    Presigned,
    /// Legacy single multipart POST to the API
    Direct,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("libpostpulse/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Build the credential described by the `[credentials]` section
    ///
    /// An inline `access_token` wins over `access_token_env`.
    pub fn credential(&self) -> Result<Credential> {
        let section = &self.credentials;

        let client_id = section
            .client_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingField("credentials.client_id".to_string()))?;

        let token = match (&section.access_token, &section.access_token_env) {
            (Some(token), _) if !token.is_empty() => token.clone(),
            (_, Some(var)) => std::env::var(var).map_err(|_| {
                ConfigError::MissingField(format!("environment variable {}", var))
            })?,
            _ => {
                return Err(
                    ConfigError::MissingField("credentials.access_token".to_string()).into(),
                )
            }
        };

        Ok(Credential::new(token, client_id).with_base_url(section.base_url.clone()))
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("POSTPULSE_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("postpulse").join("config.toml"))
}
