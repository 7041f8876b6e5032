//! Host capabilities available to operation handlers
//!
//! The workflow host resolves parameters, stores credentials and keeps binary
//! attachments. Handlers see all of that through [`ExecutionContext`], which
//! keeps them testable without a live host (see [`memory::MemoryContext`]).

use base64::Engine;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::credentials::Credential;
use crate::error::{PostPulseError, Result};

pub mod memory;

pub const DEFAULT_FILE_NAME: &str = "file";
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Capability interface supplied by the host for one execution
pub trait ExecutionContext: Send + Sync {
    /// Number of input records in the batch
    fn item_count(&self) -> usize;

    /// Resolve a parameter for one record
    ///
    /// Dotted names (`publications.publication`) address values nested in
    /// collection parameters.
    fn parameter(&self, name: &str, item_index: usize) -> Option<Value>;

    /// Binary attachment stored under `property` on one record
    fn binary(&self, item_index: usize, property: &str) -> Option<BinaryData>;

    /// The PostPulse credential selected for this execution
    fn credential(&self) -> Result<Credential>;

    /// Whether failing records are reported as results instead of aborting
    fn continue_on_fail(&self) -> bool;
}

/// A binary attachment of an input record
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryData {
    pub data: Vec<u8>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl BinaryData {
    pub fn new(data: Vec<u8>, file_name: Option<&str>, mime_type: Option<&str>) -> Self {
        Self {
            data,
            file_name: file_name.map(str::to_string),
            mime_type: mime_type.map(str::to_string),
        }
    }

    /// Decode a host attachment stored as standard base64
    pub fn from_base64(
        encoded: &str,
        file_name: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<Self> {
        let data = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| PostPulseError::invalid_parameter("binary.data", e.to_string()))?;

        Ok(Self::new(data, file_name, mime_type))
    }

    pub fn file_name_or_default(&self) -> &str {
        self.file_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
    }

    pub fn mime_type_or_default(&self) -> &str {
        self.mime_type
            .as_deref()
            .filter(|mime| !mime.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Typed parameter access for one record
pub struct Parameters<'a> {
    ctx: &'a dyn ExecutionContext,
    item_index: usize,
}

impl<'a> Parameters<'a> {
    pub fn new(ctx: &'a dyn ExecutionContext, item_index: usize) -> Self {
        Self { ctx, item_index }
    }

    /// Raw value; JSON `null` counts as absent
    pub fn value(&self, name: &str) -> Option<Value> {
        self.ctx
            .parameter(name, self.item_index)
            .filter(|value| !value.is_null())
    }

    pub fn string(&self, name: &str) -> Result<String> {
        match self.value(name) {
            Some(value) => as_string(name, value),
            None => Err(PostPulseError::MissingParameter(name.to_string())),
        }
    }

    pub fn string_or(&self, name: &str, default: &str) -> Result<String> {
        match self.value(name) {
            Some(value) => as_string(name, value),
            None => Ok(default.to_string()),
        }
    }

    pub fn number(&self, name: &str) -> Result<i64> {
        match self.value(name) {
            Some(value) => as_number(name, &value),
            None => Err(PostPulseError::MissingParameter(name.to_string())),
        }
    }

    pub fn number_or(&self, name: &str, default: i64) -> Result<i64> {
        match self.value(name) {
            Some(value) => as_number(name, &value),
            None => Ok(default),
        }
    }

    pub fn boolean_or(&self, name: &str, default: bool) -> Result<bool> {
        match self.value(name) {
            Some(Value::Bool(b)) => Ok(b),
            Some(Value::String(s)) if s == "true" || s == "false" => Ok(s == "true"),
            Some(other) => Err(PostPulseError::invalid_parameter(
                name,
                format!("expected a boolean, got {}", other),
            )),
            None => Ok(default),
        }
    }

    /// Deserialize a multi-value collection; absent means empty
    pub fn collection<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        match self.value(name) {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| PostPulseError::invalid_parameter(name, e.to_string())),
            None => Ok(Vec::new()),
        }
    }
}

fn as_string(name: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(PostPulseError::invalid_parameter(
            name,
            format!("expected a string, got {}", other),
        )),
    }
}

fn as_number(name: &str, value: &Value) -> Result<i64> {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        PostPulseError::invalid_parameter(name, format!("expected an integer, got {}", value))
    })
}
