//! Mock transport for testing
//!
//! Scripts API responses per method and path, records every request it
//! receives and answers presigned uploads with a configurable status. Lets
//! operation handlers and the dispatcher be exercised without network access.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::credentials::Credential;
use crate::error::{PostPulseError, Result};
use crate::request::RequestDescriptor;
use crate::transport::{RawRequest, RawResponse, Transport};

#[derive(Debug, Clone)]
enum MockOutcome {
    Json(Value),
    Failure { status: u16, message: String },
}

#[derive(Debug, Clone)]
struct MockRoute {
    method: Method,
    path: String,
    outcome: MockOutcome,
}

/// Scriptable transport
#[derive(Debug, Clone)]
pub struct MockTransport {
    routes: Vec<MockRoute>,
    raw_status: u16,

    /// API requests received, in order
    requests: Arc<Mutex<Vec<RequestDescriptor>>>,

    /// Raw (presigned) requests received, in order
    raw_requests: Arc<Mutex<Vec<RawRequest>>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            raw_status: 200,
            requests: Arc::new(Mutex::new(Vec::new())),
            raw_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` with the given JSON
    pub fn respond(mut self, method: Method, path: &str, body: Value) -> Self {
        self.routes.push(MockRoute {
            method,
            path: path.to_string(),
            outcome: MockOutcome::Json(body),
        });
        self
    }

    /// Fail `method path` with the given status and server message
    pub fn fail(mut self, method: Method, path: &str, status: u16, message: &str) -> Self {
        self.routes.push(MockRoute {
            method,
            path: path.to_string(),
            outcome: MockOutcome::Failure {
                status,
                message: message.to_string(),
            },
        });
        self
    }

    /// Status returned for every raw request
    pub fn raw_status(mut self, status: u16) -> Self {
        self.raw_status = status;
        self
    }

    /// All API requests received so far
    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().unwrap().clone()
    }

    /// All raw requests received so far
    pub fn raw_requests(&self) -> Vec<RawRequest> {
        self.raw_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, _credential: &Credential, request: RequestDescriptor) -> Result<Value> {
        let route = self
            .routes
            .iter()
            .find(|route| route.method == request.method && route.path == request.path)
            .cloned();

        self.requests.lock().unwrap().push(request.clone());

        match route.map(|r| r.outcome) {
            Some(MockOutcome::Json(body)) => Ok(body),
            Some(MockOutcome::Failure { status, message }) => Err(PostPulseError::ApiRequestFailed {
                status: Some(status),
                message,
            }),
            None => Err(PostPulseError::ApiRequestFailed {
                status: Some(404),
                message: format!("No mock route for {} {}", request.method, request.path),
            }),
        }
    }

    async fn send_raw(&self, request: RawRequest) -> Result<RawResponse> {
        self.raw_requests.lock().unwrap().push(request);

        Ok(RawResponse {
            status: self.raw_status,
            body: String::new(),
        })
    }
}
