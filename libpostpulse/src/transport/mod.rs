//! Authenticated transport seam
//!
//! Operation handlers never talk to the network directly. They hand a
//! [`RequestDescriptor`] to a [`Transport`], which attaches the bearer token,
//! performs a single attempt and parses the JSON response. Presigned uploads
//! go to third-party storage and use [`Transport::send_raw`], which attaches
//! nothing and reports the status code instead of failing on it.
//!
//! # Examples
//!
//! ```no_run
//! use libpostpulse::config::HttpConfig;
//! use libpostpulse::credentials::Credential;
//! use libpostpulse::request::{build_request, RequestBody};
//! use libpostpulse::transport::{http::HttpTransport, Transport};
//!
//! # async fn example() -> libpostpulse::Result<()> {
//! let transport = HttpTransport::new(&HttpConfig::default())?;
//! let credential = Credential::new("access-token", "client-id");
//!
//! let request = build_request(
//!     &credential,
//!     reqwest::Method::GET,
//!     "/v1/accounts",
//!     RequestBody::Empty,
//!     Vec::new(),
//! );
//! let accounts = transport.request(&credential, request).await?;
//! println!("{}", accounts);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::credentials::Credential;
use crate::error::Result;
use crate::request::RequestDescriptor;

pub mod http;

// Available in all builds so integration tests and hosts can script responses
pub mod mock;

/// Unauthenticated request with a raw body, used for presigned uploads
#[derive(Debug, Clone, PartialEq)]
pub struct RawRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Full response of a raw request
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an API request with the credential's bearer token attached
    ///
    /// # Errors
    ///
    /// Returns `PostPulseError::ApiRequestFailed` for network failures, non-2xx
    /// responses (with the server's message when one is present) and bodies
    /// that are not valid JSON. An empty body yields `Value::Null`.
    async fn request(&self, credential: &Credential, request: RequestDescriptor) -> Result<Value>;

    /// Send a raw request without any authentication headers
    ///
    /// Non-2xx statuses are reported through [`RawResponse::status`]; only
    /// network-level failures are returned as errors.
    async fn send_raw(&self, request: RawRequest) -> Result<RawResponse>;
}
