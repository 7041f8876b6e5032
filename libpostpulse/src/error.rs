//! Error types for PostPulse operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PostPulseError>;

#[derive(Error, Debug)]
pub enum PostPulseError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No binary data found for property \"{property}\"")]
    MissingBinaryData { property: String },

    #[error("Media URL is required")]
    MissingUrl,

    #[error("Import ID is required")]
    MissingImportId,

    #[error("Failed to obtain presigned upload URL: {0}")]
    PresignedUrl(String),

    #[error("Direct upload to storage failed: {0}")]
    DirectUpload(String),

    #[error("Invalid media import response: {0}")]
    InvalidImportResponse(String),

    #[error("Unknown {resource} operation: {operation}")]
    UnknownOperation { resource: String, operation: String },

    #[error("PostPulse API request failed: {message}")]
    ApiRequestFailed { status: Option<u16>, message: String },

    #[error("Platform settings of publication {publication} are not valid JSON: {source}")]
    MalformedPlatformSettingsJson {
        publication: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Credential unavailable: {0}")]
    Credential(String),
}

impl PostPulseError {
    /// Stable name of the error kind, used in structured logs
    pub fn code(&self) -> &'static str {
        match self {
            PostPulseError::Config(_) => "Config",
            PostPulseError::MissingBinaryData { .. } => "MissingBinaryData",
            PostPulseError::MissingUrl => "MissingUrl",
            PostPulseError::MissingImportId => "MissingImportId",
            PostPulseError::PresignedUrl(_) => "PresignedUrlError",
            PostPulseError::DirectUpload(_) => "DirectUploadError",
            PostPulseError::InvalidImportResponse(_) => "InvalidImportResponse",
            PostPulseError::UnknownOperation { .. } => "UnknownOperation",
            PostPulseError::ApiRequestFailed { .. } => "ApiRequestFailed",
            PostPulseError::MalformedPlatformSettingsJson { .. } => {
                "MalformedPlatformSettingsJson"
            }
            PostPulseError::MissingParameter(_) => "MissingParameter",
            PostPulseError::InvalidParameter { .. } => "InvalidParameter",
            PostPulseError::Credential(_) => "Credential",
        }
    }

    /// Shorthand for an `InvalidParameter` error
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        PostPulseError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Attribute this error to the input record at `item_index`
    pub fn at_item(self, item_index: usize) -> ItemError {
        ItemError {
            item_index,
            source: self,
        }
    }
}

/// An error raised while processing one input record
#[derive(Error, Debug)]
#[error("Item {item_index}: {source}")]
pub struct ItemError {
    pub item_index: usize,
    #[source]
    pub source: PostPulseError,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}
