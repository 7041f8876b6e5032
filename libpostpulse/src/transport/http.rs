//! reqwest-backed transport

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::HttpConfig;
use crate::credentials::Credential;
use crate::error::{PostPulseError, Result};
use crate::request::{RequestBody, RequestDescriptor};
use crate::transport::{RawRequest, RawResponse, Transport};

/// HTTP transport talking to the PostPulse API over reqwest
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| network_error("build HTTP client", e))?;

        Ok(Self { client })
    }

    /// Turn a descriptor into a ready-to-send reqwest builder with auth attached
    pub fn prepare(
        &self,
        credential: &Credential,
        request: RequestDescriptor,
    ) -> Result<RequestBuilder> {
        let mut builder = self.client.request(request.method, &request.url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = builder.bearer_auth(credential.access_token.expose_secret());

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(
                serde_json::to_vec(&value).map_err(|e| PostPulseError::ApiRequestFailed {
                    status: None,
                    message: format!("Failed to encode request body: {}", e),
                })?,
            ),
            RequestBody::Multipart(file) => {
                let part = reqwest::multipart::Part::bytes(file.data)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)
                    .map_err(|e| {
                        PostPulseError::invalid_parameter(
                            "mimeType",
                            format!("'{}' is not a valid MIME type: {}", file.content_type, e),
                        )
                    })?;
                builder.multipart(reqwest::multipart::Form::new().part(file.field, part))
            }
        };

        Ok(builder)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, credential: &Credential, request: RequestDescriptor) -> Result<Value> {
        let method = request.method.clone();
        let url = request.url.clone();
        debug!("Sending {} {}", method, url);

        let response = self
            .prepare(credential, request)?
            .send()
            .await
            .map_err(|e| {
                error!("{} {} failed: {}", method, url, e);
                network_error("send request", e)
            })?;

        read_json(response).await
    }

    async fn send_raw(&self, request: RawRequest) -> Result<RawResponse> {
        debug!("Sending raw {} to {}", request.method, request.url);

        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| network_error("send raw request", e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| network_error("read raw response", e))?;

        Ok(RawResponse { status, body })
    }
}

async fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| network_error("read response", e))?;

    if !status.is_success() {
        error!("PostPulse API returned status {}", status);
        return Err(PostPulseError::ApiRequestFailed {
            status: Some(status.as_u16()),
            message: server_message(&text, status.as_u16()),
        });
    }

    parse_body(&text, status.as_u16())
}

fn parse_body(text: &str, status: u16) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(text).map_err(|e| PostPulseError::ApiRequestFailed {
        status: Some(status),
        message: format!("Response is not valid JSON: {}", e),
    })
}

/// Extract the most useful message from an error response body
pub(crate) fn server_message(body: &str, status: u16) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for field in ["message", "error", "detail"] {
            if let Some(message) = value.get(field).and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        format!("HTTP status {}", status)
    } else {
        body.to_string()
    }
}

fn network_error(context: &str, error: reqwest::Error) -> PostPulseError {
    let message = if error.is_timeout() {
        format!("Timed out while trying to {}", context)
    } else {
        format!("Failed to {}: {}", context, error)
    };

    PostPulseError::ApiRequestFailed {
        status: error.status().map(|s| s.as_u16()),
        message,
    }
}
