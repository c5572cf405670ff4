use crate::{Account, AccountId, EngineError, MoneyCents, ResultEngine, TxContext};

use super::{Engine, ensure_account_id};

impl Engine {
    /// Opens a new account with a positive initial balance.
    ///
    /// The existence probe gives a clear error in the common case; two
    /// concurrent creations of the same id are settled by the primary key and
    /// the loser also gets [`EngineError::ExistingKey`].
    pub async fn create_account(
        &self,
        account_id: AccountId,
        initial_balance: MoneyCents,
    ) -> ResultEngine<Account> {
        ensure_account_id(account_id)?;
        if !initial_balance.is_positive() {
            return Err(EngineError::InvalidInput(
                "balance must be greater than zero".to_string(),
            ));
        }

        let ctx = TxContext::new();
        let existing = self
            .accounts
            .find_one(&ctx, account_id)
            .await
            .inspect_err(|err| tracing::error!(account_id, error = %err, "account lookup failed"))?;
        if existing.is_some() {
            tracing::warn!(account_id, "account ID already exists");
            return Err(EngineError::ExistingKey(
                "account ID already exists".to_string(),
            ));
        }

        let account = Account::new(account_id, initial_balance);
        let created = self.accounts.create(&ctx, &account).await?;
        tracing::info!(account_id, balance = %created.balance, "account created");
        Ok(created)
    }

    /// Returns a snapshot of the account.
    ///
    /// The read takes no lock: the balance can be stale by the time the caller
    /// looks at it and must not drive a transfer decision.
    pub async fn get_balance(&self, account_id: AccountId) -> ResultEngine<Account> {
        ensure_account_id(account_id)?;
        self.accounts
            .find_one(&TxContext::new(), account_id)
            .await
            .inspect_err(|err| tracing::error!(account_id, error = %err, "account lookup failed"))?
            .ok_or_else(|| EngineError::KeyNotFound("account not found".to_string()))
    }
}
