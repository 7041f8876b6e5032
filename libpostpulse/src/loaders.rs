//! Dynamic option loaders
//!
//! These fill dropdowns while a workflow is being edited. A failed lookup
//! yields an empty list and a warning instead of an error, so the form can
//! still render.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::context::{ExecutionContext, Parameters};
use crate::error::{PostPulseError, Result};
use crate::request::RequestBody;
use crate::resources::account::{chats_path, ACCOUNTS_PATH};
use crate::resources::call_api;
use crate::schema::LoaderKind;
use crate::transport::Transport;
use crate::types::{Account, AccountSelector, Chat, Platform};

/// One entry of a selection list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionEntry {
    pub name: String,
    pub value: String,
}

impl OptionEntry {
    fn account(account: &Account) -> Self {
        Self {
            name: format!("{} - @{}", account.platform, account.account_username),
            value: AccountSelector::for_account(account).to_string(),
        }
    }

    fn chat(chat: Chat) -> Self {
        let name = if chat.title.is_empty() {
            chat.id.clone()
        } else {
            chat.title
        };
        Self {
            name,
            value: chat.id,
        }
    }
}

/// Fill the list backing `kind`
pub async fn load_options(
    kind: LoaderKind,
    ctx: &dyn ExecutionContext,
    transport: &dyn Transport,
) -> Vec<OptionEntry> {
    match kind {
        LoaderKind::Accounts => load_accounts(ctx, transport).await,
        LoaderKind::FacebookPages => {
            load_connected_chats(ctx, transport, &Platform::Facebook).await
        }
        LoaderKind::TelegramChannels => {
            load_connected_chats(ctx, transport, &Platform::Telegram).await
        }
    }
}

/// Connected accounts as `PLATFORM - @username` / `PLATFORM|id`
pub async fn load_accounts(
    ctx: &dyn ExecutionContext,
    transport: &dyn Transport,
) -> Vec<OptionEntry> {
    match fetch_accounts(ctx, transport).await {
        Ok(accounts) => accounts.iter().map(OptionEntry::account).collect(),
        Err(e) => {
            warn!("Failed to load accounts: {}", e);
            Vec::new()
        }
    }
}

/// Chats of the account picked in `socialMediaAccount`
///
/// Empty unless that account belongs to `platform`.
pub async fn load_connected_chats(
    ctx: &dyn ExecutionContext,
    transport: &dyn Transport,
    platform: &Platform,
) -> Vec<OptionEntry> {
    let selected = Parameters::new(ctx, 0)
        .string("socialMediaAccount")
        .and_then(|raw| raw.parse::<AccountSelector>());

    let selector = match selected {
        Ok(selector) => selector,
        Err(e) => {
            debug!("No account selected for {} chats: {}", platform, e);
            return Vec::new();
        }
    };

    if &selector.platform != platform {
        debug!(
            "Selected account is on {}, not loading {} chats",
            selector.platform, platform
        );
        return Vec::new();
    }

    match fetch_chats(ctx, transport, &selector).await {
        Ok(chats) => chats.into_iter().map(OptionEntry::chat).collect(),
        Err(e) => {
            warn!(
                "Failed to load {} chats for account {}: {}",
                platform, selector.account_id, e
            );
            Vec::new()
        }
    }
}

async fn fetch_accounts(
    ctx: &dyn ExecutionContext,
    transport: &dyn Transport,
) -> Result<Vec<Account>> {
    let response = call_api(
        ctx,
        transport,
        Method::GET,
        ACCOUNTS_PATH,
        RequestBody::Empty,
        Vec::new(),
    )
    .await?;
    decode(response)
}

async fn fetch_chats(
    ctx: &dyn ExecutionContext,
    transport: &dyn Transport,
    selector: &AccountSelector,
) -> Result<Vec<Chat>> {
    let response = call_api(
        ctx,
        transport,
        Method::GET,
        &chats_path(selector.account_id),
        RequestBody::Empty,
        vec![("platform".to_string(), selector.platform.as_str().to_string())],
    )
    .await?;

    match response {
        Value::Null => Ok(Vec::new()),
        other => decode(other),
    }
}

fn decode<T: DeserializeOwned>(response: Value) -> Result<T> {
    serde_json::from_value(response).map_err(|e| PostPulseError::ApiRequestFailed {
        status: None,
        message: format!("unexpected response shape: {}", e),
    })
}
