//! Declarative parameter schema
//!
//! Describes every field the host renders for the node: its type, default,
//! whether it is required and when it is visible. Visibility depends on the
//! selected resource and operation and, for the light schedule form, on the
//! platform of the selected account.
//!
//! # Examples
//!
//! ```
//! use libpostpulse::resources::{NodeOperation, PostOperation};
//! use libpostpulse::schema::visible_fields;
//! use libpostpulse::types::Platform;
//!
//! let fields = visible_fields(
//!     NodeOperation::Post(PostOperation::ScheduleLight),
//!     Some(&Platform::Youtube),
//! );
//! assert!(fields.iter().any(|f| f.name == "youtubeTitle"));
//! assert!(!fields.iter().any(|f| f.name == "tiktokTitle"));
//! ```

use serde::Serialize;
use serde_json::{json, Value};

use crate::resources::media::{DEFAULT_BINARY_PROPERTY, MAX_FILENAME_HINT_CHARS};
use crate::resources::post::DEFAULT_PUBLICATION_TYPE;
use crate::resources::{
    AccountOperation, MediaOperation, NodeOperation, PostOperation, Resource,
};
use crate::types::Platform;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSpec {
    pub name: &'static str,
    pub value: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

/// Source of a dropdown filled in while the form is being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoaderKind {
    Accounts,
    FacebookPages,
    TelegramChannels,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    DateTime,
    Json,
    Options { options: Vec<OptionSpec> },
    DynamicOptions { loader: LoaderKind },
    /// Repeatable group of nested fields, stored under `group`
    Collection {
        group: &'static str,
        fields: Vec<FieldSpec>,
    },
}

/// When a field is shown; empty lists place no restriction
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayCondition {
    pub resources: Vec<&'static str>,
    pub operations: Vec<&'static str>,
    pub platforms: Vec<&'static str>,
}

impl DisplayCondition {
    fn is_unrestricted(&self) -> bool {
        self.resources.is_empty() && self.operations.is_empty() && self.platforms.is_empty()
    }

    /// Whether the field is visible for an operation and selected platform
    ///
    /// Platform-restricted fields stay hidden until a platform is known.
    pub fn matches(&self, operation: NodeOperation, platform: Option<&Platform>) -> bool {
        let resource_ok =
            self.resources.is_empty() || self.resources.contains(&operation.resource().as_str());
        let operation_ok =
            self.operations.is_empty() || self.operations.contains(&operation.as_str());
        let platform_ok = self.platforms.is_empty()
            || platform.is_some_and(|p| self.platforms.iter().any(|name| *name == p.as_str()));

        resource_ok && operation_ok && platform_ok
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: &'static str,
    pub display_name: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
    pub default: Value,
    #[serde(skip_serializing_if = "is_blank")]
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "DisplayCondition::is_unrestricted")]
    pub display: DisplayCondition,
}

impl FieldSpec {
    fn new(name: &'static str, display_name: &'static str, kind: FieldKind) -> Self {
        let default = match &kind {
            FieldKind::Number => json!(0),
            FieldKind::Boolean => json!(false),
            FieldKind::Collection { .. } => json!({}),
            _ => json!(""),
        };

        Self {
            name,
            display_name,
            kind,
            required: false,
            default,
            description: "",
            max_length: None,
            display: DisplayCondition::default(),
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn default_value(mut self, value: Value) -> Self {
        self.default = value;
        self
    }

    fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    fn show(mut self, resource: Resource, operations: &[&'static str]) -> Self {
        self.display.resources = vec![resource.as_str()];
        self.display.operations = operations.to_vec();
        self
    }

    fn for_platforms(mut self, platforms: &[&'static str]) -> Self {
        self.display.platforms = platforms.to_vec();
        self
    }
}

fn is_blank(text: &&str) -> bool {
    text.is_empty()
}

fn option(name: &'static str, value: &'static str, description: &'static str) -> OptionSpec {
    OptionSpec {
        name,
        value,
        description: Some(description),
    }
}

fn publication_types() -> FieldKind {
    FieldKind::Options {
        options: vec![
            option("Feed", "FEED", "Regular feed post"),
            option("Reels", "REELS", "Short vertical video"),
            option("Story", "STORY", "Disappears after 24 hours"),
        ],
    }
}

/// Operation the form selects when a resource is first chosen
pub fn default_operation(resource: Resource) -> NodeOperation {
    match resource {
        Resource::Account => NodeOperation::Account(AccountOperation::GetAll),
        Resource::Media => NodeOperation::Media(MediaOperation::Upload),
        Resource::Post => NodeOperation::Post(PostOperation::Schedule),
    }
}

pub const DEFAULT_RESOURCE: Resource = Resource::Post;

fn operation_field(resource: Resource) -> FieldSpec {
    let options = NodeOperation::for_resource(resource)
        .map(|op| {
            let (name, description) = match op {
                NodeOperation::Account(AccountOperation::GetAll) => {
                    ("Get Many", "Get connected social media accounts")
                }
                NodeOperation::Account(AccountOperation::GetConnectedChats) => (
                    "Get Connected Chats",
                    "Get connected chats for an account by platform",
                ),
                NodeOperation::Media(MediaOperation::Upload) => ("Upload", "Upload a media file"),
                NodeOperation::Media(MediaOperation::UploadFromUrl) => {
                    ("Upload From URL", "Import media from a public URL")
                }
                NodeOperation::Media(MediaOperation::GetUploadStatus) => {
                    ("Get Upload Status", "Check the state of a media import")
                }
                NodeOperation::Post(PostOperation::Schedule) => {
                    ("Schedule", "Schedule a post to several accounts")
                }
                NodeOperation::Post(PostOperation::ScheduleLight) => {
                    ("Schedule (Light)", "Schedule a single post to one account")
                }
            };
            option(name, op.as_str(), description)
        })
        .collect();

    let mut field = FieldSpec::new("operation", "Operation", FieldKind::Options { options })
        .default_value(json!(default_operation(resource).as_str()));
    field.display.resources = vec![resource.as_str()];
    field
}

fn publications_field() -> FieldSpec {
    let path =
        FieldSpec::new("value", "Path", FieldKind::String).describe("Path to a media attachment");

    let post_fields = vec![
        FieldSpec::new(
            "attachmentPaths",
            "Attachment Paths",
            FieldKind::Collection {
                group: "path",
                fields: vec![path],
            },
        )
        .describe("Paths to media attachments"),
        FieldSpec::new("chatId", "Chat ID", FieldKind::String)
            .describe("Chat ID for Telegram posts"),
        FieldSpec::new("content", "Content", FieldKind::String).describe("Post text"),
        FieldSpec::new("thumbnailPath", "Thumbnail Path", FieldKind::String)
            .describe("Path to a thumbnail image"),
    ];

    let publication_fields = vec![
        FieldSpec::new("socialMediaAccountId", "Social Media Account ID", FieldKind::Number)
            .required()
            .describe("ID of the social media account to post to"),
        FieldSpec::new("platformSettings", "Platform Settings", FieldKind::Json)
            .required()
            .default_value(json!("{}"))
            .describe("Platform-specific settings as a JSON object"),
        FieldSpec::new(
            "posts",
            "Posts",
            FieldKind::Collection {
                group: "post",
                fields: post_fields,
            },
        ),
    ];

    FieldSpec::new(
        "publications",
        "Publications",
        FieldKind::Collection {
            group: "publication",
            fields: publication_fields,
        },
    )
    .show(Resource::Post, &["schedule"])
}

/// Every field of the node, in display order
pub fn node_properties() -> Vec<FieldSpec> {
    let mut fields = vec![FieldSpec::new(
        "resource",
        "Resource",
        FieldKind::Options {
            options: vec![
                option("Account", "account", "Connected social media accounts"),
                option("Media", "media", "Media files for attachments"),
                option("Post", "post", "Scheduled posts"),
            ],
        },
    )
    .default_value(json!(DEFAULT_RESOURCE.as_str()))];

    fields.extend(Resource::all().into_iter().map(operation_field));

    fields.extend([
        // Account
        FieldSpec::new("accountId", "Account ID", FieldKind::Number)
            .required()
            .show(Resource::Account, &["getConnectedChats"])
            .describe("ID of the account to get connected chats for"),
        FieldSpec::new("platform", "Platform", FieldKind::String)
            .required()
            .show(Resource::Account, &["getConnectedChats"])
            .describe("Platform value of the account, as returned by Get Many"),
        // Media
        FieldSpec::new("binaryPropertyName", "Input Binary Field", FieldKind::String)
            .required()
            .default_value(json!(DEFAULT_BINARY_PROPERTY))
            .show(Resource::Media, &["upload"])
            .describe("Name of the binary property which contains the file to upload"),
        FieldSpec::new("url", "URL", FieldKind::String)
            .required()
            .show(Resource::Media, &["uploadFromUrl"])
            .describe("Publicly reachable URL of the file"),
        FieldSpec::new("filenameHint", "Filename Hint", FieldKind::String)
            .max_length(MAX_FILENAME_HINT_CHARS)
            .show(Resource::Media, &["uploadFromUrl"])
            .describe("File name to store the imported media under"),
        FieldSpec::new("importId", "Import ID", FieldKind::Number)
            .required()
            .show(Resource::Media, &["getUploadStatus"])
            .describe("ID returned by Upload From URL"),
        // Post, both forms
        FieldSpec::new("scheduledTime", "Scheduled Time", FieldKind::DateTime)
            .required()
            .show(Resource::Post, &["schedule", "scheduleLight"])
            .describe("When to publish, in the workflow's timezone"),
        // Post, full form
        FieldSpec::new("isDraft", "Is Draft", FieldKind::Boolean)
            .show(Resource::Post, &["schedule"])
            .describe("Whether this is a draft post"),
        publications_field(),
        // Post, light form
        FieldSpec::new(
            "socialMediaAccount",
            "Social Media Account",
            FieldKind::DynamicOptions {
                loader: LoaderKind::Accounts,
            },
        )
        .required()
        .show(Resource::Post, &["scheduleLight"]),
        FieldSpec::new("content", "Content", FieldKind::String)
            .show(Resource::Post, &["scheduleLight"])
            .describe("Post text"),
        FieldSpec::new("attachmentPaths", "Attachment Paths", FieldKind::String)
            .show(Resource::Post, &["scheduleLight"])
            .describe("Comma-separated media paths"),
        FieldSpec::new("publicationType", "Publication Type", publication_types())
            .default_value(json!(DEFAULT_PUBLICATION_TYPE))
            .show(Resource::Post, &["scheduleLight"])
            .for_platforms(&["INSTAGRAM"]),
        FieldSpec::new("facebookPublicationType", "Publication Type", publication_types())
            .default_value(json!(DEFAULT_PUBLICATION_TYPE))
            .show(Resource::Post, &["scheduleLight"])
            .for_platforms(&["FACEBOOK"]),
        FieldSpec::new(
            "facebookPage",
            "Facebook Page",
            FieldKind::DynamicOptions {
                loader: LoaderKind::FacebookPages,
            },
        )
        .show(Resource::Post, &["scheduleLight"])
        .for_platforms(&["FACEBOOK"]),
        FieldSpec::new("youtubeTitle", "Video Title", FieldKind::String)
            .required()
            .show(Resource::Post, &["scheduleLight"])
            .for_platforms(&["YOUTUBE"]),
        FieldSpec::new("tiktokTitle", "Video Title", FieldKind::String)
            .required()
            .show(Resource::Post, &["scheduleLight"])
            .for_platforms(&["TIKTOK"]),
        FieldSpec::new("threadsTopicTag", "Topic Tag", FieldKind::String)
            .show(Resource::Post, &["scheduleLight"])
            .for_platforms(&["THREADS"]),
        FieldSpec::new(
            "telegramChannel",
            "Telegram Channel",
            FieldKind::DynamicOptions {
                loader: LoaderKind::TelegramChannels,
            },
        )
        .show(Resource::Post, &["scheduleLight"])
        .for_platforms(&["TELEGRAM"]),
    ]);

    fields
}

/// Operation-specific fields visible for an operation
///
/// The `resource` and `operation` selectors themselves are not included.
pub fn visible_fields(operation: NodeOperation, platform: Option<&Platform>) -> Vec<FieldSpec> {
    node_properties()
        .into_iter()
        .filter(|field| field.name != "resource" && field.name != "operation")
        .filter(|field| field.display.matches(operation, platform))
        .collect()
}
