//! Execution dispatcher
//!
//! This module runs one batch of input records through the PostPulse API. For
//! each record it resolves the selected resource and operation, invokes the
//! matching handler and shapes the result into output items.
//!
//! Records are processed one at a time in input order. A failing record either
//! aborts the batch or, when the host enables continue-on-fail, is reported as
//! an `{"error": message}` output item and processing moves on.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::{Config, UploadProtocol};
use crate::context::{ExecutionContext, Parameters};
use crate::credentials::{self, Credential};
use crate::error::{ItemError, Result};
use crate::loaders::{self, OptionEntry};
use crate::resources::{
    account, media, post, AccountOperation, MediaOperation, NodeOperation, PostOperation, Resource,
};
use crate::schema::{default_operation, LoaderKind, DEFAULT_RESOURCE};
use crate::transport::http::HttpTransport;
use crate::transport::Transport;

/// One output record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    pub json: Value,
    /// Index of the input record this item was produced from
    pub paired_item: usize,
}

impl OutputItem {
    pub fn new(json: Value, paired_item: usize) -> Self {
        Self { json, paired_item }
    }

    pub fn is_error(&self) -> bool {
        self.json.get("error").is_some()
    }
}

/// The PostPulse node bound to a transport
pub struct PostPulseNode<T: Transport> {
    transport: T,
    upload_protocol: UploadProtocol,
}

impl PostPulseNode<HttpTransport> {
    /// Create a node talking HTTP with the settings from `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(&config.http)?;
        Ok(PostPulseNode::new(transport).with_upload_protocol(config.node.upload_protocol))
    }
}

impl<T: Transport> PostPulseNode<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            upload_protocol: UploadProtocol::default(),
        }
    }

    pub fn with_upload_protocol(mut self, protocol: UploadProtocol) -> Self {
        self.upload_protocol = protocol;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run every input record of `ctx` and collect the output items
    ///
    /// # Errors
    ///
    /// Returns the first failing record's error, tagged with its index, unless
    /// the context has continue-on-fail enabled.
    pub async fn execute(
        &self,
        ctx: &dyn ExecutionContext,
    ) -> std::result::Result<Vec<OutputItem>, ItemError> {
        let item_count = ctx.item_count();
        let mut output = Vec::with_capacity(item_count);
        let mut failed = 0;

        for item_index in 0..item_count {
            match self.execute_item(ctx, item_index).await {
                Ok(value) => output.extend(shape_output(value, item_index)),
                Err(e) if ctx.continue_on_fail() => {
                    warn!(code = e.code(), "Item {} failed, continuing: {}", item_index, e);
                    failed += 1;
                    output.push(OutputItem::new(json!({ "error": e.to_string() }), item_index));
                }
                Err(e) => return Err(e.at_item(item_index)),
            }
        }

        info!(
            "Processed {} items ({} failed), produced {} output items",
            item_count,
            failed,
            output.len()
        );
        Ok(output)
    }

    /// Run the selected operation for a single record
    pub async fn execute_item(
        &self,
        ctx: &dyn ExecutionContext,
        item_index: usize,
    ) -> Result<Value> {
        let operation = resolve_operation(ctx, item_index)?;
        let transport: &dyn Transport = &self.transport;

        match operation {
            NodeOperation::Account(AccountOperation::GetAll) => {
                account::get_all(ctx, transport).await
            }
            NodeOperation::Account(AccountOperation::GetConnectedChats) => {
                account::get_connected_chats(ctx, transport, item_index).await
            }
            NodeOperation::Media(MediaOperation::Upload) => {
                media::upload(ctx, transport, self.upload_protocol, item_index).await
            }
            NodeOperation::Media(MediaOperation::UploadFromUrl) => {
                media::upload_from_url(ctx, transport, item_index).await
            }
            NodeOperation::Media(MediaOperation::GetUploadStatus) => {
                media::get_upload_status(ctx, transport, item_index).await
            }
            NodeOperation::Post(PostOperation::Schedule) => {
                post::schedule(ctx, transport, item_index).await
            }
            NodeOperation::Post(PostOperation::ScheduleLight) => {
                post::schedule_light(ctx, transport, item_index).await
            }
        }
    }

    /// Fill a dropdown of the parameter form
    pub async fn load_options(
        &self,
        kind: LoaderKind,
        ctx: &dyn ExecutionContext,
    ) -> Vec<OptionEntry> {
        loaders::load_options(kind, ctx, &self.transport).await
    }

    /// Check that a credential is accepted by the API
    pub async fn test_credential(&self, credential: &Credential) -> Result<()> {
        credentials::test_credential(&self.transport, credential).await
    }
}

/// Resource and operation selected for one record, with form defaults applied
pub fn resolve_operation(ctx: &dyn ExecutionContext, item_index: usize) -> Result<NodeOperation> {
    let params = Parameters::new(ctx, item_index);
    let resource = params.string_or("resource", DEFAULT_RESOURCE.as_str())?;
    let default = Resource::from_name(&resource)
        .map(|r| default_operation(r).as_str())
        .unwrap_or_default();
    let operation = params.string_or("operation", default)?;

    NodeOperation::parse(&resource, &operation)
}

/// Arrays become one item per element, anything else a single item
fn shape_output(value: Value, item_index: usize) -> Vec<OutputItem> {
    match value {
        Value::Array(elements) => elements
            .into_iter()
            .map(|element| OutputItem::new(element, item_index))
            .collect(),
        other => vec![OutputItem::new(other, item_index)],
    }
}
