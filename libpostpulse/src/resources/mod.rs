//! Resources and their operations
//!
//! Each (resource, operation) pair the host can select maps to exactly one
//! [`NodeOperation`] variant, and each variant to one handler function in the
//! `account`, `media` or `post` module.

use reqwest::Method;
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::error::{PostPulseError, Result};
use crate::request::{build_request, RequestBody};
use crate::transport::Transport;

pub mod account;
pub mod media;
pub mod post;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Account,
    Media,
    Post,
}

impl Resource {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "account" => Some(Resource::Account),
            "media" => Some(Resource::Media),
            "post" => Some(Resource::Post),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Account => "account",
            Resource::Media => "media",
            Resource::Post => "post",
        }
    }

    pub fn all() -> [Resource; 3] {
        [Resource::Account, Resource::Media, Resource::Post]
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountOperation {
    GetAll,
    GetConnectedChats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaOperation {
    Upload,
    UploadFromUrl,
    GetUploadStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostOperation {
    Schedule,
    ScheduleLight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeOperation {
    Account(AccountOperation),
    Media(MediaOperation),
    Post(PostOperation),
}

impl NodeOperation {
    pub const ALL: [NodeOperation; 7] = [
        NodeOperation::Account(AccountOperation::GetAll),
        NodeOperation::Account(AccountOperation::GetConnectedChats),
        NodeOperation::Media(MediaOperation::Upload),
        NodeOperation::Media(MediaOperation::UploadFromUrl),
        NodeOperation::Media(MediaOperation::GetUploadStatus),
        NodeOperation::Post(PostOperation::Schedule),
        NodeOperation::Post(PostOperation::ScheduleLight),
    ];

    /// Resolve the host's resource and operation identifiers
    ///
    /// # Errors
    ///
    /// Returns `PostPulseError::UnknownOperation` when the pair does not name
    /// a supported operation.
    pub fn parse(resource: &str, operation: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.resource().as_str() == resource && op.as_str() == operation)
            .ok_or_else(|| PostPulseError::UnknownOperation {
                resource: resource.to_string(),
                operation: operation.to_string(),
            })
    }

    pub fn resource(&self) -> Resource {
        match self {
            NodeOperation::Account(_) => Resource::Account,
            NodeOperation::Media(_) => Resource::Media,
            NodeOperation::Post(_) => Resource::Post,
        }
    }

    /// Operation identifier within its resource
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeOperation::Account(AccountOperation::GetAll) => "getAll",
            NodeOperation::Account(AccountOperation::GetConnectedChats) => "getConnectedChats",
            NodeOperation::Media(MediaOperation::Upload) => "upload",
            NodeOperation::Media(MediaOperation::UploadFromUrl) => "uploadFromUrl",
            NodeOperation::Media(MediaOperation::GetUploadStatus) => "getUploadStatus",
            NodeOperation::Post(PostOperation::Schedule) => "schedule",
            NodeOperation::Post(PostOperation::ScheduleLight) => "scheduleLight",
        }
    }

    /// Operations belonging to one resource
    pub fn for_resource(resource: Resource) -> impl Iterator<Item = NodeOperation> {
        Self::ALL
            .into_iter()
            .filter(move |op| op.resource() == resource)
    }
}

impl std::fmt::Display for NodeOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource(), self.as_str())
    }
}

/// Build, authenticate and send one API request
pub(crate) async fn call_api(
    ctx: &dyn ExecutionContext,
    transport: &dyn Transport,
    method: Method,
    path: &str,
    body: RequestBody,
    query: Vec<(String, String)>,
) -> Result<Value> {
    let credential = ctx.credential()?;
    let request = build_request(&credential, method, path, body, query);
    transport.request(&credential, request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_operation() {
        for op in NodeOperation::ALL {
            assert_eq!(NodeOperation::parse(op.resource().as_str(), op.as_str()).unwrap(), op);
        }
    }

    #[test]
    fn test_parse_rejects_operation_of_other_resource() {
        let result = NodeOperation::parse("account", "upload");
        assert!(matches!(
            result,
            Err(PostPulseError::UnknownOperation { ref resource, ref operation })
                if resource == "account" && operation == "upload"
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_resource() {
        assert!(NodeOperation::parse("webhook", "getAll").is_err());
    }

    #[test]
    fn test_operations_per_resource() {
        assert_eq!(NodeOperation::for_resource(Resource::Account).count(), 2);
        assert_eq!(NodeOperation::for_resource(Resource::Media).count(), 3);
        assert_eq!(NodeOperation::for_resource(Resource::Post).count(), 2);
    }

    #[test]
    fn test_resource_names() {
        for resource in Resource::all() {
            assert_eq!(Resource::from_name(resource.as_str()), Some(resource));
        }
        assert_eq!(Resource::from_name("Account"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            NodeOperation::Post(PostOperation::ScheduleLight).to_string(),
            "post:scheduleLight"
        );
    }
}
