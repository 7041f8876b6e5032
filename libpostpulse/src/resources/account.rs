//! Account operations

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use crate::context::{ExecutionContext, Parameters};
use crate::error::{PostPulseError, Result};
use crate::request::RequestBody;
use crate::resources::call_api;
use crate::transport::Transport;

pub const ACCOUNTS_PATH: &str = "/v1/accounts";

pub fn chats_path(account_id: i64) -> String {
    format!("{}/{}/chats", ACCOUNTS_PATH, account_id)
}

/// `GET /v1/accounts`
pub async fn get_all(ctx: &dyn ExecutionContext, transport: &dyn Transport) -> Result<Value> {
    let accounts = call_api(
        ctx,
        transport,
        Method::GET,
        ACCOUNTS_PATH,
        RequestBody::Empty,
        Vec::new(),
    )
    .await?;

    info!(
        "Fetched {} connected accounts",
        accounts.as_array().map(Vec::len).unwrap_or(0)
    );
    Ok(accounts)
}

/// `GET /v1/accounts/{accountId}/chats?platform={platform}`
///
/// The platform is not checked locally; the API rejects values that do not
/// belong to the account.
pub async fn get_connected_chats(
    ctx: &dyn ExecutionContext,
    transport: &dyn Transport,
    item_index: usize,
) -> Result<Value> {
    let params = Parameters::new(ctx, item_index);
    let account_id = params.number("accountId")?;
    if account_id < 0 {
        return Err(PostPulseError::invalid_parameter(
            "accountId",
            "must not be negative",
        ));
    }
    let platform = params.string("platform")?;

    debug!("Fetching {} chats for account {}", platform, account_id);

    call_api(
        ctx,
        transport,
        Method::GET,
        &chats_path(account_id),
        RequestBody::Empty,
        vec![("platform".to_string(), platform)],
    )
    .await
}
