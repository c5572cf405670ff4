use api_types::transaction::TransactionNew;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{MoneyCents, TransferRequest};

use crate::{ServerError, server::ServerState};

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let Json(payload) = payload.map_err(|err| {
        tracing::debug!("invalid transaction body: {err}");
        ServerError::Generic("Invalid request body".to_string())
    })?;

    state
        .engine
        .make_transaction(TransferRequest {
            source_account_id: payload.source_account_id,
            destination_account_id: payload.destination_account_id,
            amount: MoneyCents::from_major(payload.amount)?,
        })
        .await?;

    Ok(StatusCode::CREATED)
}
