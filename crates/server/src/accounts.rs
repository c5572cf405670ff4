//! Accounts API endpoints.

use api_types::account::{Account, AccountNew};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::MoneyCents;

use crate::{ServerError, server::ServerState};

fn account_view(account: engine::Account) -> Account {
    Account {
        account_id: account.id,
        balance: account.balance.to_major(),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<AccountNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Account>), ServerError> {
    let Json(payload) = payload.map_err(|err| ServerError::Generic(err.body_text()))?;
    let balance = MoneyCents::from_major(payload.balance)?;
    let account = state
        .engine
        .create_account(payload.account_id, balance)
        .await?;

    Ok((StatusCode::CREATED, Json(account_view(account))))
}

pub async fn get_balance(
    State(state): State<ServerState>,
    Path(account_id): Path<String>,
) -> Result<Json<Account>, ServerError> {
    let account_id: i64 = account_id.parse().map_err(|_| {
        tracing::debug!(%account_id, "invalid account_id format");
        ServerError::Generic("Invalid account ID format".to_string())
    })?;
    let account = state.engine.get_balance(account_id).await?;

    Ok(Json(account_view(account)))
}
