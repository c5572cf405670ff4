use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::{AccountId, AccountRepository, EngineError, ResultEngine, TransferRepository, TxManager};

mod accounts;
mod transfers;

pub use transfers::TransferRequest;

/// The account and transfer use cases.
///
/// `Engine` holds no mutable state of its own: every balance lives in the
/// database and every mutation goes through a [`TxManager`] unit of work, so
/// one instance can be shared between tasks.
#[derive(Debug)]
pub struct Engine {
    tx_manager: TxManager,
    accounts: AccountRepository,
    transfers: TransferRepository,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The transaction manager the engine runs its units of work with.
    ///
    /// Callers can open an outer unit of work with it and pass its context to
    /// [`Engine::make_transaction_in`] to group several transfers atomically.
    pub fn tx_manager(&self) -> &TxManager {
        &self.tx_manager
    }
}

fn ensure_account_id(id: AccountId) -> ResultEngine<()> {
    if id <= 0 {
        return Err(EngineError::InvalidInput(
            "account ID must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    unit_timeout: Option<Duration>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Abandon and roll back units of work running longer than `timeout`.
    pub fn unit_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.unit_timeout = Some(timeout);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            tx_manager: TxManager::new(self.database.clone())
                .with_default_timeout(self.unit_timeout),
            accounts: AccountRepository::new(self.database.clone()),
            transfers: TransferRepository::new(self.database),
        })
    }
}
