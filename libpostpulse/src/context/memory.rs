//! In-memory execution context
//!
//! Holds node parameters, input records, binary attachments and a credential
//! in plain memory. Hosts that assemble a batch themselves can use it
//! directly; tests use it in place of a workflow engine.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::config::Config;
use crate::context::{BinaryData, ExecutionContext};
use crate::credentials::Credential;
use crate::error::{PostPulseError, Result};

/// One input record
#[derive(Debug, Clone, Default)]
pub struct MemoryItem {
    /// Per-record parameter values, taking precedence over node parameters
    pub parameters: Map<String, Value>,
    pub binary: HashMap<String, BinaryData>,
}

impl MemoryItem {
    pub fn with_parameter(mut self, name: &str, value: Value) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }

    pub fn with_binary(mut self, property: &str, binary: BinaryData) -> Self {
        self.binary.insert(property.to_string(), binary);
        self
    }

    /// Attach binary data the way workflow hosts store it: base64 text plus
    /// optional file name and MIME type
    pub fn with_base64_binary(
        self,
        property: &str,
        encoded: &str,
        file_name: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<Self> {
        let binary = BinaryData::from_base64(encoded, file_name, mime_type)?;
        Ok(self.with_binary(property, binary))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryContext {
    parameters: Map<String, Value>,
    items: Vec<MemoryItem>,
    credential: Option<Credential>,
    continue_on_fail: bool,
}

impl MemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credential and failure policy taken from a host configuration file
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new()
            .with_credential(config.credential()?)
            .with_continue_on_fail(config.node.continue_on_fail))
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Node-level parameter shared by every record
    pub fn with_parameter(mut self, name: &str, value: Value) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }

    pub fn with_item(mut self, item: MemoryItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }
}

/// Walk a dotted path through nested objects and arrays
fn lookup(root: &Map<String, Value>, name: &str) -> Option<Value> {
    let mut segments = name.split('.');
    let mut current = root.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(list) => list.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current.clone())
}

impl ExecutionContext for MemoryContext {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn parameter(&self, name: &str, item_index: usize) -> Option<Value> {
        self.items
            .get(item_index)
            .and_then(|item| lookup(&item.parameters, name))
            .or_else(|| lookup(&self.parameters, name))
    }

    fn binary(&self, item_index: usize, property: &str) -> Option<BinaryData> {
        self.items.get(item_index)?.binary.get(property).cloned()
    }

    fn credential(&self) -> Result<Credential> {
        self.credential.clone().ok_or_else(|| {
            PostPulseError::Credential("no PostPulse credential configured".to_string())
        })
    }

    fn continue_on_fail(&self) -> bool {
        self.continue_on_fail
    }
}
