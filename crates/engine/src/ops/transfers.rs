use chrono::Utc;

use crate::{
    Account, AccountId, EngineError, MoneyCents, NewTransfer, ResultEngine, TransferRecord,
    TxContext,
};

use super::{Engine, ensure_account_id};

/// A request to move `amount` from one account to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: MoneyCents,
}

impl TransferRequest {
    /// Checks everything that can be decided without touching the store.
    fn validate(&self) -> ResultEngine<()> {
        ensure_account_id(self.source_account_id)?;
        ensure_account_id(self.destination_account_id)?;
        if !self.amount.is_positive() {
            return Err(EngineError::InvalidInput(
                "amount must be greater than zero".to_string(),
            ));
        }
        if self.source_account_id == self.destination_account_id {
            return Err(EngineError::InvalidInput(
                "source and destination account IDs cannot be the same".to_string(),
            ));
        }
        Ok(())
    }
}

impl Engine {
    /// Moves money between two accounts atomically.
    ///
    /// Either both balances change and one transfer record is appended, or
    /// nothing is persisted at all.
    pub async fn make_transaction(&self, request: TransferRequest) -> ResultEngine<()> {
        self.make_transaction_in(&TxContext::new(), request).await
    }

    /// Same as [`Engine::make_transaction`], joining the transaction carried
    /// by `ctx` when there is one.
    pub async fn make_transaction_in(
        &self,
        ctx: &TxContext,
        request: TransferRequest,
    ) -> ResultEngine<()> {
        if let Err(err) = request.validate() {
            tracing::warn!(?request, error = %err, "transfer rejected");
            return Err(err);
        }

        let result = self
            .tx_manager
            .run(ctx, |ctx| async move { self.apply_transfer(&ctx, request).await })
            .await;

        match result {
            Ok(record) => {
                tracing::debug!(
                    transfer_id = record.id,
                    source_account_id = record.source_account_id,
                    destination_account_id = record.destination_account_id,
                    amount = %record.amount,
                    "transfer applied"
                );
                Ok(())
            }
            Err(err) => {
                tracing::warn!(?request, error = %err, "transfer failed");
                Err(err)
            }
        }
    }

    /// Lock, check, mutate, record, persist. Runs inside the unit of work:
    /// any error here rolls back every write made before it.
    async fn apply_transfer(
        &self,
        ctx: &TxContext,
        request: TransferRequest,
    ) -> ResultEngine<TransferRecord> {
        let (mut source, mut destination) = self
            .lock_accounts(
                ctx,
                request.source_account_id,
                request.destination_account_id,
            )
            .await?;

        // Checked under lock, against the balance no other transfer can change.
        if source.balance < request.amount {
            tracing::warn!(
                account_id = source.id,
                balance = %source.balance,
                required = %request.amount,
                "insufficient balance"
            );
            return Err(EngineError::InsufficientFunds(
                "insufficient balance".to_string(),
            ));
        }

        source.debit(request.amount)?;
        destination.credit(request.amount)?;

        let record = self
            .transfers
            .create(
                ctx,
                &NewTransfer {
                    source_account_id: source.id,
                    destination_account_id: destination.id,
                    amount: request.amount,
                    transfer_time: Utc::now(),
                },
            )
            .await?;

        self.accounts.update(ctx, &source).await?;
        self.accounts.update(ctx, &destination).await?;

        Ok(record)
    }

    /// Locks both accounts with one statement and hands them back as
    /// `(source, destination)`.
    async fn lock_accounts(
        &self,
        ctx: &TxContext,
        source_id: AccountId,
        destination_id: AccountId,
    ) -> ResultEngine<(Account, Account)> {
        let accounts = self
            .accounts
            .find_for_update(ctx, &[source_id, destination_id])
            .await
            .inspect_err(|err| {
                tracing::error!(error = %err, "failed to query accounts for update");
            })?;

        if accounts.len() < 2 {
            let missing: Vec<AccountId> = [source_id, destination_id]
                .into_iter()
                .filter(|id| !accounts.iter().any(|account| account.id == *id))
                .collect();
            tracing::warn!(?missing, "accounts not found for update");
            return Err(not_found_for_update());
        }

        // The locking read returns rows in id order, not in request order.
        let mut source = None;
        let mut destination = None;
        for account in accounts {
            if account.id == source_id {
                source = Some(account);
            } else if account.id == destination_id {
                destination = Some(account);
            }
        }

        match (source, destination) {
            (Some(source), Some(destination)) => Ok((source, destination)),
            _ => Err(not_found_for_update()),
        }
    }
}

fn not_found_for_update() -> EngineError {
    EngineError::Internal("accounts not found for update".to_string())
}
