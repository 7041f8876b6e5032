//! PostPulse - social media scheduling for workflow automation hosts
//!
//! This library implements the PostPulse node: listing connected accounts
//! and chats, uploading media and scheduling posts through the PostPulse
//! REST API. The host supplies parameters, binary data and credentials
//! through [`ExecutionContext`]; requests go out through a [`Transport`].

pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod loaders;
pub mod logging;
pub mod node;
pub mod request;
pub mod resources;
pub mod schema;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use config::{Config, UploadProtocol};
pub use context::memory::{MemoryContext, MemoryItem};
pub use context::{BinaryData, ExecutionContext};
pub use credentials::Credential;
pub use error::{ItemError, PostPulseError, Result};
pub use node::{OutputItem, PostPulseNode};
pub use resources::{NodeOperation, Resource};
pub use transport::http::HttpTransport;
pub use transport::mock::MockTransport;
pub use transport::Transport;
pub use types::{Account, AccountSelector, Chat, Platform, ScheduleRequest};
