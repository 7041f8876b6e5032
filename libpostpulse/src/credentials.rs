//! PostPulse credential type and OAuth2 credential definition
//!
//! Credentials are owned by the host's credential store. This module only
//! describes their shape, the OAuth2 settings the host needs to obtain an
//! access token, and the self-test the host runs after connecting.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::error::Result;
use crate::request::{build_request, RequestBody};
use crate::transport::Transport;

/// Default API host, overridable per credential
pub const DEFAULT_BASE_URL: &str = "https://api.post-pulse.com";

/// OAuth2 authorization endpoint
pub const AUTH_URL: &str = "https://auth.post-pulse.com/authorize";

/// OAuth2 token endpoint
pub const ACCESS_TOKEN_URL: &str = "https://auth.post-pulse.com/oauth/token";

/// Scopes requested at credential creation time
pub const SCOPES: &str = concat!(
    "openid profile email offline_access ",
    "postpulse-api/accounts.read postpulse-api/api postpulse-api/media.write ",
    "postpulse-api/posts.read postpulse-api/posts.write"
);

/// Extra query parameters for the authorization request
pub const AUTH_QUERY_PARAMETERS: &str = "audience=https://api.post-pulse.com";

/// Name under which hosts register this credential type
pub const CREDENTIAL_NAME: &str = "postPulseOAuth2Api";

/// Resolved PostPulse credential
pub struct Credential {
    /// OAuth2 access token, attached by the transport as a bearer token
    pub access_token: SecretString,
    /// OAuth2 client id, sent on every request as `x-api-key`
    pub client_id: String,
    /// API base URL
    pub base_url: String,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            client_id: client_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Base URL with trailing slashes removed, falling back to the default host
    pub fn normalized_base_url(&self) -> &str {
        let trimmed = self.base_url.trim_end_matches('/');
        if trimmed.is_empty() {
            DEFAULT_BASE_URL
        } else {
            trimmed
        }
    }
}

impl Clone for Credential {
    fn clone(&self) -> Self {
        Self {
            access_token: SecretString::from(self.access_token.expose_secret().to_string()),
            client_id: self.client_id.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("client_id", &self.client_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// OAuth2 settings a host needs to register the credential type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialDefinition {
    pub name: &'static str,
    pub grant_type: &'static str,
    pub auth_url: &'static str,
    pub access_token_url: &'static str,
    pub scope: &'static str,
    pub auth_query_parameters: &'static str,
    /// Where the client credentials go in the token request
    pub authentication: &'static str,
    pub base_url: &'static str,
    /// Path requested by the credential self-test
    pub test_path: &'static str,
}

impl Default for CredentialDefinition {
    fn default() -> Self {
        Self {
            name: CREDENTIAL_NAME,
            grant_type: "authorizationCode",
            auth_url: AUTH_URL,
            access_token_url: ACCESS_TOKEN_URL,
            scope: SCOPES,
            auth_query_parameters: AUTH_QUERY_PARAMETERS,
            authentication: "body",
            base_url: DEFAULT_BASE_URL,
            test_path: "/v1/accounts",
        }
    }
}

/// Credential self-test: lists accounts and expects a non-error response
pub async fn test_credential(transport: &dyn Transport, credential: &Credential) -> Result<()> {
    debug!("Testing PostPulse credential against {}", credential.normalized_base_url());

    let request = build_request(
        credential,
        reqwest::Method::GET,
        CredentialDefinition::default().test_path,
        RequestBody::Empty,
        Vec::new(),
    );
    transport.request(credential, request).await?;

    info!("PostPulse credential verified");
    Ok(())
}
