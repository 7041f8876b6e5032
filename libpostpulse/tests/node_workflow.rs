//! End-to-end dispatcher tests
//!
//! These tests run whole batches through `PostPulseNode::execute` against a
//! scripted transport:
//! - Full and light schedule forms
//! - Continue-on-fail and abort modes
//! - Output shaping of array results

use anyhow::Result;
use libpostpulse::schema::LoaderKind;
use libpostpulse::{
    Credential, MemoryContext, MemoryItem, MockTransport, PostPulseError, PostPulseNode,
};
use reqwest::Method;
use serde_json::{json, Value};

fn context() -> MemoryContext {
    MemoryContext::new().with_credential(Credential::new("access-token", "client-123"))
}

fn schedule_item(settings: &str) -> MemoryItem {
    MemoryItem::default()
        .with_parameter("scheduledTime", json!("2026-11-02T09:30:00"))
        .with_parameter(
            "publications",
            json!({
                "publication": [{
                    "socialMediaAccountId": 11,
                    "platformSettings": settings,
                    "posts": {"post": [{"content": "Weekly update"}]}
                }]
            }),
        )
}

#[tokio::test]
async fn test_full_schedule_with_two_publications() -> Result<()> {
    let transport = MockTransport::new().respond(Method::POST, "/v1/posts", json!({"id": 900}));
    let node = PostPulseNode::new(transport);

    let ctx = context()
        .with_parameter("resource", json!("post"))
        .with_parameter("operation", json!("schedule"))
        .with_item(
            MemoryItem::default()
                .with_parameter("scheduledTime", json!("2026-11-02T09:30:00"))
                .with_parameter("isDraft", json!(false))
                .with_parameter(
                    "publications",
                    json!({
                        "publication": [
                            {
                                "socialMediaAccountId": 1,
                                "platformSettings": "",
                                "posts": {"post": [{
                                    "content": "hi",
                                    "chatId": "",
                                    "thumbnailPath": "",
                                    "attachmentPaths": {"path": [{"value": "  "}]}
                                }]}
                            },
                            {
                                "socialMediaAccountId": 2,
                                "platformSettings": "{\"customKey\":\"v\"}",
                                "posts": {"post": [{
                                    "content": "hello",
                                    "attachmentPaths": {"path": [{"value": "media/a.jpg"}]}
                                }]}
                            }
                        ]
                    }),
                ),
        );

    let output = node.execute(&ctx).await?;

    assert_eq!(output.len(), 1);
    let body = &output[0].json;
    let publications = body["publications"].as_array().unwrap();
    assert_eq!(publications.len(), 2);
    assert!(publications[0].get("platformSettings").is_none());
    assert_eq!(publications[0]["posts"][0], json!({"content": "hi"}));
    assert_eq!(publications[1]["platformSettings"], json!({"customKey": "v"}));
    assert_eq!(
        publications[1]["posts"][0]["attachmentPaths"],
        json!(["media/a.jpg"])
    );

    // The result is the request body, not the server response
    let sent = node.transport().requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body.as_json(), Some(body));
    assert!(body.get("id").is_none());
    Ok(())
}

#[tokio::test]
async fn test_full_schedule_accepts_numeric_chat_id() -> Result<()> {
    let transport = MockTransport::new().respond(Method::POST, "/v1/posts", json!({"id": 901}));
    let node = PostPulseNode::new(transport);

    let ctx = context().with_item(
        MemoryItem::default()
            .with_parameter("scheduledTime", json!("2026-11-02T09:30:00"))
            .with_parameter(
                "publications",
                json!({
                    "publication": [{
                        "socialMediaAccountId": 5,
                        "posts": {"post": [{"content": "hi", "chatId": -1001234}]}
                    }]
                }),
            ),
    );

    let output = node.execute(&ctx).await?;

    assert_eq!(
        output[0].json["publications"][0]["posts"][0],
        json!({"content": "hi", "chatId": "-1001234"})
    );
    Ok(())
}

#[tokio::test]
async fn test_full_schedule_without_account_id_sends_nothing() -> Result<()> {
    let node = PostPulseNode::new(MockTransport::new());

    let ctx = context().with_item(
        MemoryItem::default()
            .with_parameter("scheduledTime", json!("2026-11-02T09:30:00"))
            .with_parameter(
                "publications",
                json!({"publication": [{"posts": {"post": [{"content": "orphan"}]}}]}),
            ),
    );

    let error = node.execute(&ctx).await.unwrap_err();

    assert!(matches!(
        error.source,
        PostPulseError::MissingParameter(ref name) if name == "socialMediaAccountId"
    ));
    assert!(node.transport().requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_light_schedule_remaps_tiktok() -> Result<()> {
    let transport = MockTransport::new().respond(Method::POST, "/v1/posts", Value::Null);
    let node = PostPulseNode::new(transport);

    let ctx = context().with_item(
        MemoryItem::default()
            .with_parameter("resource", json!("post"))
            .with_parameter("operation", json!("scheduleLight"))
            .with_parameter("scheduledTime", json!("2026-11-02T18:00:00"))
            .with_parameter("socialMediaAccount", json!("TIKTOK|77"))
            .with_parameter("content", json!("New clip"))
            .with_parameter("attachmentPaths", json!(" a.mp4, , b.mp4 "))
            .with_parameter("tiktokTitle", json!("Behind the scenes")),
    );

    let output = node.execute(&ctx).await?;

    let body = &output[0].json;
    assert_eq!(body["isDraft"], json!(false));
    let publication = &body["publications"][0];
    assert_eq!(publication["socialMediaAccountId"], json!(77));
    assert_eq!(publication["platformSettings"]["type"], "TIK_TOK");
    assert_eq!(publication["platformSettings"]["title"], "Behind the scenes");
    assert_eq!(
        publication["posts"][0]["attachmentPaths"],
        json!(["a.mp4", "b.mp4"])
    );
    Ok(())
}

#[tokio::test]
async fn test_continue_on_fail_reports_failing_record() -> Result<()> {
    let transport = MockTransport::new().respond(Method::POST, "/v1/posts", json!({"ok": true}));
    let node = PostPulseNode::new(transport);

    let ctx = context()
        .with_continue_on_fail(true)
        .with_item(schedule_item(""))
        .with_item(schedule_item("{not json"))
        .with_item(schedule_item("{\"disableComments\":true}"));

    let output = node.execute(&ctx).await?;

    assert_eq!(output.len(), 3);
    assert!(!output[0].is_error());
    assert!(output[1].is_error());
    assert!(!output[2].is_error());
    assert_eq!(
        output.iter().map(|item| item.paired_item).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );

    let message = output[1].json["error"].as_str().unwrap();
    assert!(message.contains("Platform settings of publication 0"));

    // The malformed record never reaches the API
    assert_eq!(node.transport().requests().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_failure_aborts_batch_without_continue_on_fail() -> Result<()> {
    let transport = MockTransport::new().respond(Method::POST, "/v1/posts", json!({"ok": true}));
    let node = PostPulseNode::new(transport);

    let ctx = context()
        .with_item(schedule_item(""))
        .with_item(schedule_item("{not json"))
        .with_item(schedule_item(""));

    let error = node.execute(&ctx).await.unwrap_err();

    assert_eq!(error.item_index, 1);
    assert!(matches!(
        error.source,
        PostPulseError::MalformedPlatformSettingsJson { publication: 0, .. }
    ));
    // Record 3 is never processed
    assert_eq!(node.transport().requests().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_account_list_becomes_one_item_per_account() -> Result<()> {
    let transport = MockTransport::new().respond(
        Method::GET,
        "/v1/accounts",
        json!([
            {"id": 1, "platform": "INSTAGRAM", "accountUsername": "shop"},
            {"id": 2, "platform": "THREADS", "accountUsername": "shop"},
            {"id": 3, "platform": "LINKEDIN", "accountUsername": "Shop Inc"}
        ]),
    );
    let node = PostPulseNode::new(transport);

    let ctx = context()
        .with_parameter("resource", json!("account"))
        .with_item(MemoryItem::default())
        .with_item(MemoryItem::default());

    let output = node.execute(&ctx).await?;

    assert_eq!(output.len(), 6);
    assert_eq!(output[0].json["platform"], "INSTAGRAM");
    assert_eq!(output[3].json["platform"], "INSTAGRAM");
    assert_eq!(output[2].paired_item, 0);
    assert_eq!(output[3].paired_item, 1);

    let sent = node.transport().requests();
    assert_eq!(sent[0].header("x-api-key"), Some("client-123"));
    Ok(())
}

#[tokio::test]
async fn test_unknown_operation_is_reported() -> Result<()> {
    let node = PostPulseNode::new(MockTransport::new());

    let ctx = context().with_continue_on_fail(true).with_item(
        MemoryItem::default()
            .with_parameter("resource", json!("media"))
            .with_parameter("operation", json!("delete")),
    );

    let output = node.execute(&ctx).await?;

    assert_eq!(output[0].json, json!({"error": "Unknown media operation: delete"}));
    Ok(())
}

#[tokio::test]
async fn test_server_error_message_is_surfaced() -> Result<()> {
    let transport = MockTransport::new().fail(
        Method::GET,
        "/v1/media/upload/import/5",
        404,
        "Import not found",
    );
    let node = PostPulseNode::new(transport);

    let ctx = context()
        .with_parameter("resource", json!("media"))
        .with_parameter("operation", json!("getUploadStatus"))
        .with_item(MemoryItem::default().with_parameter("importId", json!(5)));

    let error = node.execute(&ctx).await.unwrap_err();

    assert!(matches!(
        error.source,
        PostPulseError::ApiRequestFailed { status: Some(404), .. }
    ));
    assert_eq!(
        error.to_string(),
        "Item 0: PostPulse API request failed: Import not found"
    );
    Ok(())
}

#[tokio::test]
async fn test_dropdowns_follow_selected_account() -> Result<()> {
    let transport = MockTransport::new()
        .respond(
            Method::GET,
            "/v1/accounts",
            json!([{"id": 8, "platform": "TELEGRAM", "accountUsername": "newsroom"}]),
        )
        .respond(
            Method::GET,
            "/v1/accounts/8/chats",
            json!([{"id": "-1009", "title": "Breaking"}]),
        );
    let node = PostPulseNode::new(transport);

    let accounts = node.load_options(LoaderKind::Accounts, &context()).await;
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, "TELEGRAM - @newsroom");

    let ctx = context().with_parameter("socialMediaAccount", json!(accounts[0].value));
    let channels = node.load_options(LoaderKind::TelegramChannels, &ctx).await;
    assert_eq!(channels[0].name, "Breaking");
    assert_eq!(channels[0].value, "-1009");

    let pages = node.load_options(LoaderKind::FacebookPages, &ctx).await;
    assert!(pages.is_empty());
    Ok(())
}
