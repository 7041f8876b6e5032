//! Media operations
//!
//! Files reach PostPulse in one of three ways:
//!
//! - presigned upload: ask the API for a storage URL, then send the bytes
//!   straight to storage; the returned key is the attachment path
//! - legacy direct upload: one multipart POST to the API
//! - URL import: the API downloads the file itself as an asynchronous job,
//!   polled with `getUploadStatus`

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::UploadProtocol;
use crate::context::{BinaryData, ExecutionContext, Parameters};
use crate::error::{PostPulseError, Result};
use crate::request::{FilePart, RequestBody};
use crate::resources::call_api;
use crate::transport::{RawRequest, Transport};
use crate::types::{non_empty, MediaImportRequest, MediaUploadRequest};

pub const UPLOAD_PATH: &str = "/v1/media/upload";
pub const PRESIGNED_URLS_PATH: &str = "/v1/media/upload/urls";
pub const IMPORT_PATH: &str = "/v1/media/upload/import";

pub const DEFAULT_BINARY_PROPERTY: &str = "data";
pub const MAX_FILENAME_HINT_CHARS: usize = 255;

pub fn import_status_path(import_id: i64) -> String {
    format!("{}/{}", IMPORT_PATH, import_id)
}

/// Storage upload instructions returned by the API
#[derive(Debug, Clone, PartialEq)]
pub struct PresignedUpload {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub key: String,
}

impl PresignedUpload {
    /// Validate the presign response; `url` and `key` are mandatory
    pub fn from_response(response: &Value) -> Result<Self> {
        let required = |field: &str| {
            response
                .get(field)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    PostPulseError::PresignedUrl(format!("response is missing '{}'", field))
                })
        };
        let url = required("url")?;
        let key = required("key")?;

        let method_name = response
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or("PUT")
            .to_uppercase();
        let method = Method::from_bytes(method_name.as_bytes()).map_err(|_| {
            PostPulseError::PresignedUrl(format!("unsupported upload method '{}'", method_name))
        })?;

        let headers = response
            .get("headers")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .map(|(name, value)| {
                        let value = match value {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (name.clone(), value)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            url,
            method,
            headers,
            key,
        })
    }

    /// Headers for the storage request: the file's content type, overridden
    /// by anything the presign response prescribes
    fn merged_headers(&self, content_type: &str) -> Vec<(String, String)> {
        let mut headers = self.headers.clone();
        if !headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        {
            headers.insert(0, ("Content-Type".to_string(), content_type.to_string()));
        }
        headers
    }
}

/// Upload the binary attachment of one record
///
/// # Errors
///
/// - `MissingBinaryData` when the record has no attachment under the
///   configured property
/// - `PresignedUrl` when the presign response lacks `url` or `key`; storage
///   is not contacted in that case
/// - `DirectUpload` when storage rejects the bytes or cannot be reached
pub async fn upload(
    ctx: &dyn ExecutionContext,
    transport: &dyn Transport,
    protocol: UploadProtocol,
    item_index: usize,
) -> Result<Value> {
    let params = Parameters::new(ctx, item_index);
    let property = params.string_or("binaryPropertyName", DEFAULT_BINARY_PROPERTY)?;

    let binary = ctx
        .binary(item_index, &property)
        .ok_or_else(|| PostPulseError::MissingBinaryData { property })?;

    match protocol {
        UploadProtocol::Presigned => upload_presigned(ctx, transport, binary).await,
        UploadProtocol::Direct => upload_direct(ctx, transport, binary).await,
    }
}

async fn upload_presigned(
    ctx: &dyn ExecutionContext,
    transport: &dyn Transport,
    binary: BinaryData,
) -> Result<Value> {
    let request = MediaUploadRequest {
        filename: binary.file_name_or_default().to_string(),
        content_type: binary.mime_type_or_default().to_string(),
        size_bytes: binary.size(),
    };
    debug!(
        "Requesting presigned URL for {} ({} bytes)",
        request.filename, request.size_bytes
    );

    let body = serde_json::to_value(&request)
        .map_err(|e| PostPulseError::PresignedUrl(e.to_string()))?;
    let response = call_api(
        ctx,
        transport,
        Method::POST,
        PRESIGNED_URLS_PATH,
        RequestBody::Json(body),
        Vec::new(),
    )
    .await?;

    let presigned = PresignedUpload::from_response(&response)?;

    let storage_response = transport
        .send_raw(RawRequest {
            method: presigned.method.clone(),
            url: presigned.url.clone(),
            headers: presigned.merged_headers(binary.mime_type_or_default()),
            body: binary.data,
        })
        .await
        .map_err(|e| PostPulseError::DirectUpload(e.to_string()))?;

    if !storage_response.is_success() {
        return Err(PostPulseError::DirectUpload(format!(
            "storage responded with status {}",
            storage_response.status
        )));
    }

    info!("Uploaded media as {}", presigned.key);
    Ok(json!({ "path": presigned.key }))
}

async fn upload_direct(
    ctx: &dyn ExecutionContext,
    transport: &dyn Transport,
    binary: BinaryData,
) -> Result<Value> {
    debug!("Uploading {} through the legacy endpoint", binary.file_name_or_default());

    let file = FilePart {
        field: "file".to_string(),
        file_name: binary.file_name_or_default().to_string(),
        content_type: binary.mime_type_or_default().to_string(),
        data: binary.data,
    };

    call_api(
        ctx,
        transport,
        Method::POST,
        UPLOAD_PATH,
        RequestBody::Multipart(file),
        Vec::new(),
    )
    .await
}

/// Start an asynchronous import of a publicly reachable file
pub async fn upload_from_url(
    ctx: &dyn ExecutionContext,
    transport: &dyn Transport,
    item_index: usize,
) -> Result<Value> {
    let params = Parameters::new(ctx, item_index);

    let url = params.string_or("url", "")?.trim().to_string();
    if url.is_empty() {
        return Err(PostPulseError::MissingUrl);
    }

    let filename_hint = non_empty(params.string_or("filenameHint", "")?.trim());
    if let Some(hint) = &filename_hint {
        if hint.chars().count() > MAX_FILENAME_HINT_CHARS {
            return Err(PostPulseError::invalid_parameter(
                "filenameHint",
                format!("must be at most {} characters", MAX_FILENAME_HINT_CHARS),
            ));
        }
    }

    let request = MediaImportRequest { url, filename_hint };
    let body = serde_json::to_value(&request)
        .map_err(|e| PostPulseError::invalid_parameter("url", e.to_string()))?;

    let response = call_api(
        ctx,
        transport,
        Method::POST,
        IMPORT_PATH,
        RequestBody::Json(body),
        Vec::new(),
    )
    .await?;

    let id = response.get("id").and_then(Value::as_i64).ok_or_else(|| {
        PostPulseError::InvalidImportResponse("response has no numeric 'id'".to_string())
    })?;
    let state = response.get("state").cloned().unwrap_or(Value::Null);

    info!("Started media import {} ({})", id, state);
    Ok(json!({ "id": id, "state": state }))
}

/// Poll the state of a media import job
pub async fn get_upload_status(
    ctx: &dyn ExecutionContext,
    transport: &dyn Transport,
    item_index: usize,
) -> Result<Value> {
    let import_id = Parameters::new(ctx, item_index).number_or("importId", 0)?;
    if import_id <= 0 {
        return Err(PostPulseError::MissingImportId);
    }

    let response = call_api(
        ctx,
        transport,
        Method::GET,
        &import_status_path(import_id),
        RequestBody::Empty,
        Vec::new(),
    )
    .await?;

    if response.get("id").map_or(true, Value::is_null) {
        return Err(PostPulseError::InvalidImportResponse(format!(
            "status of import {} has no 'id'",
            import_id
        )));
    }

    Ok(response)
}
