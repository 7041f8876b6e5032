//! Post scheduling operations
//!
//! Both forms build a [`ScheduleRequest`], send it to `POST /v1/posts` and
//! return the request body they built rather than the server's response, so
//! later workflow steps can see exactly what was scheduled.

use reqwest::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::context::{ExecutionContext, Parameters};
use crate::error::{PostPulseError, Result};
use crate::request::RequestBody;
use crate::resources::call_api;
use crate::transport::Transport;
use crate::types::{
    non_empty, optional_string_or_number, split_attachment_list, AccountSelector, Platform,
    PostBody, Publication, ScheduleRequest,
};

pub const POSTS_PATH: &str = "/v1/posts";

pub const DEFAULT_PUBLICATION_TYPE: &str = "FEED";

/// One entry of the `publications.publication` collection
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicationInput {
    pub social_media_account_id: Option<i64>,
    /// JSON text as typed by the user, or an already parsed object
    pub platform_settings: Value,
    pub posts: PostsInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostsInput {
    pub post: Vec<PostInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostInput {
    #[serde(deserialize_with = "optional_string_or_number")]
    pub content: Option<String>,
    /// Telegram chat ids often arrive as numbers
    #[serde(deserialize_with = "optional_string_or_number")]
    pub chat_id: Option<String>,
    #[serde(deserialize_with = "optional_string_or_number")]
    pub thumbnail_path: Option<String>,
    pub attachment_paths: AttachmentPathsInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttachmentPathsInput {
    pub path: Vec<PathInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathInput {
    pub value: Option<String>,
}

impl PostInput {
    fn to_post_body(&self) -> PostBody {
        PostBody::sparse(
            self.content.as_deref().unwrap_or_default(),
            self.chat_id.as_deref().unwrap_or_default(),
            self.thumbnail_path.as_deref().unwrap_or_default(),
            self.attachment_paths
                .path
                .iter()
                .filter_map(|path| path.value.clone()),
        )
    }
}

/// Interpret a publication's platform settings
///
/// Blank text, `{}` and objects without keys all mean "no settings". Text
/// that is not valid JSON fails the whole request.
pub fn parse_platform_settings(
    raw: &Value,
    publication: usize,
) -> Result<Option<Map<String, Value>>> {
    let parsed = match raw {
        Value::Null => return Ok(None),
        Value::String(text) => {
            if text.trim().is_empty() || text == "{}" {
                return Ok(None);
            }
            serde_json::from_str::<Value>(text).map_err(|source| {
                PostPulseError::MalformedPlatformSettingsJson {
                    publication,
                    source,
                }
            })?
        }
        other => other.clone(),
    };

    match parsed {
        Value::Object(map) if map.is_empty() => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        other => Err(PostPulseError::invalid_parameter(
            "platformSettings",
            format!("publication {} settings must be a JSON object, got {}", publication, other),
        )),
    }
}

/// Assemble the body of the full schedule form
///
/// Every publication must name its target account.
pub fn build_schedule_request(
    scheduled_time: &str,
    is_draft: bool,
    publications: &[PublicationInput],
) -> Result<ScheduleRequest> {
    let publications = publications
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let social_media_account_id = input.social_media_account_id.ok_or_else(|| {
                PostPulseError::MissingParameter("socialMediaAccountId".to_string())
            })?;
            Ok(Publication {
                social_media_account_id,
                posts: input.posts.post.iter().map(PostInput::to_post_body).collect(),
                platform_settings: parse_platform_settings(&input.platform_settings, index)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ScheduleRequest {
        scheduled_time: scheduled_time.to_string(),
        is_draft,
        publications,
    })
}

/// Schedule a post to any number of accounts
pub async fn schedule(
    ctx: &dyn ExecutionContext,
    transport: &dyn Transport,
    item_index: usize,
) -> Result<Value> {
    let params = Parameters::new(ctx, item_index);
    let scheduled_time = required_scheduled_time(&params)?;
    let is_draft = params.boolean_or("isDraft", false)?;
    let publications: Vec<PublicationInput> = params.collection("publications.publication")?;

    let request = build_schedule_request(&scheduled_time, is_draft, &publications)?;
    submit(ctx, transport, request).await
}

/// Platform settings of the light form: `type` plus per-platform extras
pub fn light_platform_settings(
    platform: &Platform,
    params: &Parameters<'_>,
) -> Result<Map<String, Value>> {
    let mut settings = Map::new();
    settings.insert("type".to_string(), Value::String(platform.api_type().to_string()));

    match platform {
        Platform::Instagram => {
            let publication_type = params.string_or("publicationType", DEFAULT_PUBLICATION_TYPE)?;
            settings.insert("publicationType".to_string(), Value::String(publication_type));
        }
        Platform::Facebook => {
            let publication_type =
                params.string_or("facebookPublicationType", DEFAULT_PUBLICATION_TYPE)?;
            settings.insert("publicationType".to_string(), Value::String(publication_type));
        }
        Platform::Youtube => {
            settings.insert("title".to_string(), Value::String(params.string("youtubeTitle")?));
        }
        Platform::Tiktok => {
            settings.insert("title".to_string(), Value::String(params.string("tiktokTitle")?));
            settings.insert("hasUsageConfirmation".to_string(), Value::Bool(true));
        }
        Platform::Threads => {
            let topic_tag = params.string_or("threadsTopicTag", "")?;
            if !topic_tag.trim().is_empty() {
                settings.insert("topicTag".to_string(), Value::String(topic_tag));
            }
        }
        _ => {}
    }

    Ok(settings)
}

/// Chat the light form posts into: a Facebook page or a Telegram channel
fn light_chat_id(platform: &Platform, params: &Parameters<'_>) -> Result<String> {
    match platform {
        Platform::Facebook => params.string_or("facebookPage", ""),
        Platform::Telegram => params.string_or("telegramChannel", ""),
        _ => Ok(String::new()),
    }
}

/// Assemble the body of the light schedule form from one record's parameters
pub fn build_light_request(params: &Parameters<'_>) -> Result<ScheduleRequest> {
    let scheduled_time = required_scheduled_time(params)?;
    let selector: AccountSelector = params.string("socialMediaAccount")?.parse()?;
    let content = params.string_or("content", "")?;
    let attachments = split_attachment_list(&params.string_or("attachmentPaths", "")?);

    let post = PostBody {
        content: non_empty(&content),
        chat_id: non_empty(&light_chat_id(&selector.platform, params)?),
        thumbnail_path: None,
        attachment_paths: attachments,
    };

    let publication = Publication {
        social_media_account_id: selector.account_id,
        posts: vec![post],
        platform_settings: Some(light_platform_settings(&selector.platform, params)?),
    };

    Ok(ScheduleRequest {
        scheduled_time,
        is_draft: false,
        publications: vec![publication],
    })
}

/// Schedule a single post to one account
pub async fn schedule_light(
    ctx: &dyn ExecutionContext,
    transport: &dyn Transport,
    item_index: usize,
) -> Result<Value> {
    let params = Parameters::new(ctx, item_index);
    let request = build_light_request(&params)?;
    submit(ctx, transport, request).await
}

fn required_scheduled_time(params: &Parameters<'_>) -> Result<String> {
    let scheduled_time = params.string("scheduledTime")?;
    if scheduled_time.trim().is_empty() {
        return Err(PostPulseError::MissingParameter("scheduledTime".to_string()));
    }
    Ok(scheduled_time)
}

async fn submit(
    ctx: &dyn ExecutionContext,
    transport: &dyn Transport,
    request: ScheduleRequest,
) -> Result<Value> {
    let body = serde_json::to_value(&request)
        .map_err(|e| PostPulseError::invalid_parameter("publications", e.to_string()))?;

    debug!(
        "Scheduling {} publication(s) for {}",
        request.publications.len(),
        request.scheduled_time
    );
    call_api(
        ctx,
        transport,
        Method::POST,
        POSTS_PATH,
        RequestBody::Json(body.clone()),
        Vec::new(),
    )
    .await?;

    info!("Scheduled post for {}", request.scheduled_time);
    Ok(body)
}
