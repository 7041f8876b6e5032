//! Wire types for the PostPulse API

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::error::PostPulseError;

/// A connected social media account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub platform: String,
    #[serde(default)]
    pub account_username: String,
}

/// A chat, channel or page connected to an account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chat {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Accept an id sent either as a JSON string or a JSON number
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_text(Value::deserialize(deserializer)?)
}

/// Like [`string_or_number`], with `null` meaning absent
pub(crate) fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        other => scalar_text(other).map(Some),
    }
}

fn scalar_text<E: serde::de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(E::custom(format!("expected string or number, got {}", other))),
    }
}

/// Metadata sent when requesting a presigned upload URL
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaUploadRequest {
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
}

/// Body of a media import request
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaImportRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename_hint: Option<String>,
}

/// One post inside a publication
///
/// Optional fields are omitted from the JSON entirely when they carry no
/// value; the API treats empty strings and empty arrays as real input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachment_paths: Vec<String>,
}

impl PostBody {
    /// Build a post keeping only non-empty fields
    ///
    /// Text fields are kept when non-empty. Attachment paths are kept when
    /// they contain something other than whitespace.
    pub fn sparse<I, S>(
        content: &str,
        chat_id: &str,
        thumbnail_path: &str,
        attachment_paths: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            content: non_empty(content),
            chat_id: non_empty(chat_id),
            thumbnail_path: non_empty(thumbnail_path),
            attachment_paths: attachment_paths
                .into_iter()
                .map(Into::into)
                .filter(|path: &String| !path.trim().is_empty())
                .collect(),
        }
    }
}

/// Posting instructions for one target account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub social_media_account_id: i64,
    pub posts: Vec<PostBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_settings: Option<Map<String, Value>>,
}

/// Body of `POST /v1/posts`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub scheduled_time: String,
    pub is_draft: bool,
    pub publications: Vec<Publication>,
}

/// Social platforms known to PostPulse
///
/// Unknown platform names are carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Instagram,
    Facebook,
    Youtube,
    Tiktok,
    Threads,
    XTwitter,
    BlueSky,
    Telegram,
    Linkedin,
    Other(String),
}

impl Platform {
    pub fn from_name(name: &str) -> Self {
        match name {
            "INSTAGRAM" => Platform::Instagram,
            "FACEBOOK" => Platform::Facebook,
            "YOUTUBE" => Platform::Youtube,
            "TIKTOK" => Platform::Tiktok,
            "THREADS" => Platform::Threads,
            "X_TWITTER" => Platform::XTwitter,
            "BLUE_SKY" => Platform::BlueSky,
            "TELEGRAM" => Platform::Telegram,
            "LINKEDIN" => Platform::Linkedin,
            other => Platform::Other(other.to_string()),
        }
    }

    /// Name as reported by the accounts endpoint
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Instagram => "INSTAGRAM",
            Platform::Facebook => "FACEBOOK",
            Platform::Youtube => "YOUTUBE",
            Platform::Tiktok => "TIKTOK",
            Platform::Threads => "THREADS",
            Platform::XTwitter => "X_TWITTER",
            Platform::BlueSky => "BLUE_SKY",
            Platform::Telegram => "TELEGRAM",
            Platform::Linkedin => "LINKEDIN",
            Platform::Other(name) => name,
        }
    }

    /// Value of `platformSettings.type` expected by the posts endpoint
    pub fn api_type(&self) -> &str {
        match self {
            Platform::Tiktok => "TIK_TOK",
            Platform::XTwitter => "TWITTER",
            other => other.as_str(),
        }
    }

    /// Known platforms, in the order they are presented to users
    pub fn all() -> [Platform; 9] {
        [
            Platform::Instagram,
            Platform::Facebook,
            Platform::Youtube,
            Platform::Tiktok,
            Platform::Threads,
            Platform::XTwitter,
            Platform::BlueSky,
            Platform::Telegram,
            Platform::Linkedin,
        ]
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account choice of the light schedule form, encoded as `PLATFORM|id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSelector {
    pub platform: Platform,
    pub account_id: i64,
}

impl AccountSelector {
    pub fn for_account(account: &Account) -> Self {
        Self {
            platform: Platform::from_name(&account.platform),
            account_id: account.id,
        }
    }
}

impl FromStr for AccountSelector {
    type Err = PostPulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (platform, id) = s.split_once('|').ok_or_else(|| {
            PostPulseError::invalid_parameter(
                "socialMediaAccount",
                format!("expected PLATFORM|id, got '{}'", s),
            )
        })?;
        let id = id.split('|').next().unwrap_or_default().trim();
        let account_id = id.parse::<i64>().map_err(|_| {
            PostPulseError::invalid_parameter(
                "socialMediaAccount",
                format!("'{}' is not a numeric account id", id),
            )
        })?;

        Ok(Self {
            platform: Platform::from_name(platform),
            account_id,
        })
    }
}

impl std::fmt::Display for AccountSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.platform, self.account_id)
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones
pub fn split_attachment_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sparse_post_drops_empty_fields() {
        let post = PostBody::sparse("hi", "", "", Vec::<String>::new());
        assert_eq!(serde_json::to_value(&post).unwrap(), json!({"content": "hi"}));
    }

    #[test]
    fn test_sparse_post_filters_blank_attachments() {
        let post = PostBody::sparse("", "", "", vec!["  ", "media/a.png", "", "\t"]);
        assert_eq!(post.attachment_paths, vec!["media/a.png".to_string()]);
        assert_eq!(
            serde_json::to_value(&post).unwrap(),
            json!({"attachmentPaths": ["media/a.png"]})
        );
    }

    #[test]
    fn test_sparse_post_all_blank_attachments_omitted() {
        let post = PostBody::sparse("text", "", "", vec![" ", "   "]);
        let value = serde_json::to_value(&post).unwrap();
        assert!(value.get("attachmentPaths").is_none());
    }

    #[test]
    fn test_sparse_post_keeps_whitespace_content() {
        // Only attachment paths are trimmed
        let post = PostBody::sparse(" ", "-100123", "thumb.jpg", Vec::<String>::new());
        assert_eq!(
            serde_json::to_value(&post).unwrap(),
            json!({"content": " ", "chatId": "-100123", "thumbnailPath": "thumb.jpg"})
        );
    }

    #[test]
    fn test_publication_without_settings_omits_key() {
        let publication = Publication {
            social_media_account_id: 5,
            posts: vec![PostBody::default()],
            platform_settings: None,
        };
        assert_eq!(
            serde_json::to_value(&publication).unwrap(),
            json!({"socialMediaAccountId": 5, "posts": [{}]})
        );
    }

    #[test]
    fn test_platform_api_type_remap() {
        assert_eq!(Platform::from_name("TIKTOK").api_type(), "TIK_TOK");
        assert_eq!(Platform::from_name("X_TWITTER").api_type(), "TWITTER");
        assert_eq!(Platform::from_name("INSTAGRAM").api_type(), "INSTAGRAM");
        assert_eq!(Platform::from_name("MASTODON").api_type(), "MASTODON");
    }

    #[test]
    fn test_platform_names_round_trip() {
        for platform in Platform::all() {
            assert_eq!(Platform::from_name(platform.as_str()), platform);
        }
    }

    #[test]
    fn test_account_selector_parse() {
        let selector: AccountSelector = "FACEBOOK|42".parse().unwrap();
        assert_eq!(selector.platform, Platform::Facebook);
        assert_eq!(selector.account_id, 42);
        assert_eq!(selector.to_string(), "FACEBOOK|42");
    }

    #[test]
    fn test_account_selector_rejects_malformed() {
        assert!("FACEBOOK".parse::<AccountSelector>().is_err());
        assert!("FACEBOOK|abc".parse::<AccountSelector>().is_err());
        assert!("FACEBOOK|".parse::<AccountSelector>().is_err());
    }

    #[test]
    fn test_split_attachment_list() {
        assert_eq!(
            split_attachment_list(" a.jpg, , b.png "),
            vec!["a.jpg".to_string(), "b.png".to_string()]
        );
        assert!(split_attachment_list("  ").is_empty());
    }

    #[test]
    fn test_account_deserializes_from_api() {
        let account: Account = serde_json::from_value(json!({
            "id": 12,
            "platform": "TELEGRAM",
            "accountUsername": "news_bot",
            "avatarUrl": "https://cdn.test/a.png"
        }))
        .unwrap();
        assert_eq!(account.id, 12);
        assert_eq!(account.account_username, "news_bot");
        assert_eq!(AccountSelector::for_account(&account).to_string(), "TELEGRAM|12");
    }

    #[test]
    fn test_chat_id_accepts_number_or_string() {
        let chat: Chat = serde_json::from_value(json!({"id": -100200, "title": "Main"})).unwrap();
        assert_eq!(chat.id, "-100200");
        let chat: Chat = serde_json::from_value(json!({"id": "page_1", "title": "Page"})).unwrap();
        assert_eq!(chat.id, "page_1");
    }

    #[test]
    fn test_import_request_omits_missing_hint() {
        let request = MediaImportRequest {
            url: "https://cdn.test/v.mp4".into(),
            filename_hint: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"url": "https://cdn.test/v.mp4"})
        );
    }
}
