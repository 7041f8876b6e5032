//! Outbound request construction
//!
//! Builds a transport-neutral description of a PostPulse API call. The bearer
//! token is not part of the descriptor; the transport attaches it when it
//! sends the request.

use reqwest::Method;
use serde_json::Value;

use crate::credentials::Credential;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const API_KEY_HEADER: &str = "x-api-key";

/// A single file sent as `multipart/form-data`
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(FilePart),
}

impl RequestBody {
    /// JSON payload, if this is a JSON body
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    /// Path relative to the base URL, always starting with `/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl RequestDescriptor {
    /// First header value with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Join a base URL and a path with exactly one `/` between them
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

/// Build a request against the credential's API host
///
/// JSON and empty bodies get `Content-Type: application/json`. Multipart
/// bodies carry their own boundary content type. Every request carries the
/// credential's client id as `x-api-key`.
pub fn build_request(
    credential: &Credential,
    method: Method,
    path: &str,
    body: RequestBody,
    query: Vec<(String, String)>,
) -> RequestDescriptor {
    let path = format!("/{}", path.trim_start_matches('/'));
    let url = join_url(credential.normalized_base_url(), &path);

    let mut headers = vec![("Accept".to_string(), JSON_CONTENT_TYPE.to_string())];
    match &body {
        RequestBody::Empty | RequestBody::Json(_) => {
            headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
        }
        RequestBody::Multipart(_) => {}
    }
    headers.push((API_KEY_HEADER.to_string(), credential.client_id.clone()));

    tracing::debug!("Built {} {}", method, url);

    RequestDescriptor {
        method,
        url,
        path,
        query,
        headers,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credential() -> Credential {
        Credential::new("token", "client-123")
    }

    #[test]
    fn test_join_url_single_separator() {
        assert_eq!(join_url("https://a.test", "/v1/x"), "https://a.test/v1/x");
        assert_eq!(join_url("https://a.test/", "v1/x"), "https://a.test/v1/x");
        assert_eq!(join_url("https://a.test//", "//v1/x"), "https://a.test/v1/x");
    }

    #[test]
    fn test_build_request_json_defaults() {
        let request = build_request(
            &credential(),
            Method::POST,
            "/v1/posts",
            RequestBody::Json(json!({"isDraft": false})),
            Vec::new(),
        );

        assert_eq!(request.url, "https://api.post-pulse.com/v1/posts");
        assert_eq!(request.path, "/v1/posts");
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.header("x-api-key"), Some("client-123"));
        assert_eq!(request.body.as_json(), Some(&json!({"isDraft": false})));
    }

    #[test]
    fn test_build_request_adds_leading_slash() {
        let request = build_request(
            &credential(),
            Method::GET,
            "v1/accounts",
            RequestBody::Empty,
            Vec::new(),
        );
        assert_eq!(request.path, "/v1/accounts");
        assert_eq!(request.url, "https://api.post-pulse.com/v1/accounts");
    }

    #[test]
    fn test_build_request_respects_custom_base_url() {
        let credential = credential().with_base_url("https://sandbox.post-pulse.test/");
        let request = build_request(
            &credential,
            Method::GET,
            "/v1/accounts",
            RequestBody::Empty,
            Vec::new(),
        );
        assert_eq!(request.url, "https://sandbox.post-pulse.test/v1/accounts");
    }

    #[test]
    fn test_build_request_multipart_skips_json_content_type() {
        let request = build_request(
            &credential(),
            Method::POST,
            "/v1/media/upload",
            RequestBody::Multipart(FilePart {
                field: "file".into(),
                file_name: "a.png".into(),
                content_type: "image/png".into(),
                data: vec![1, 2, 3],
            }),
            Vec::new(),
        );
        assert_eq!(request.header("Content-Type"), None);
        assert_eq!(request.header("x-api-key"), Some("client-123"));
    }

    #[test]
    fn test_build_request_keeps_query() {
        let request = build_request(
            &credential(),
            Method::GET,
            "/v1/accounts/7/chats",
            RequestBody::Empty,
            vec![("platform".to_string(), "TELEGRAM".to_string())],
        );
        assert_eq!(
            request.query,
            vec![("platform".to_string(), "TELEGRAM".to_string())]
        );
    }
}
