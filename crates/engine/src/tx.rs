//! Transaction boundaries for units of work.
//!
//! A [`TxContext`] is the per-call value that carries the open transaction
//! (if any) and an optional deadline. Repositories take the context and run on
//! its transaction, or on the plain connection when there is none.
//!
//! [`TxManager::run`] owns the transaction it begins: it commits when the unit
//! of work returns `Ok` and rolls back when it returns `Err`. When the context
//! already carries a transaction the unit of work joins it and the outermost
//! call decides the outcome.

use std::{fmt, future::Future, sync::Arc, time::Duration};

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tokio::time::Instant;

use crate::{EngineError, ResultEngine};

/// Run `$body` with `$conn` bound to the context transaction, or to the
/// default connection when the context has none.
macro_rules! with_conn {
    ($ctx:expr, $database:expr, |$conn:ident| $body:expr) => {{
        match $ctx.transaction() {
            Some($conn) => $body,
            None => {
                let $conn = $database;
                $body
            }
        }
    }};
}

pub(crate) use with_conn;

/// Per-call execution context.
#[derive(Clone, Default)]
pub struct TxContext {
    transaction: Option<Arc<DatabaseTransaction>>,
    deadline: Option<Instant>,
}

impl TxContext {
    /// A context with no open transaction and no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Units of work started from this context are abandoned and rolled
    /// back once `deadline` has passed.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn transaction(&self) -> Option<&DatabaseTransaction> {
        self.transaction.as_deref()
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }
}

impl fmt::Debug for TxContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxContext")
            .field("in_transaction", &self.in_transaction())
            .field("deadline", &self.deadline)
            .finish()
    }
}

/// Runs units of work inside database transactions.
#[derive(Clone, Debug)]
pub struct TxManager {
    database: DatabaseConnection,
    default_timeout: Option<Duration>,
}

impl TxManager {
    pub fn new(database: DatabaseConnection) -> Self {
        Self {
            database,
            default_timeout: None,
        }
    }

    /// Deadline applied to units of work whose context carries none.
    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Executes `work` inside a transaction bound to `ctx`.
    ///
    /// The unit of work receives the context it must pass to repositories.
    /// It must not keep that context past its own completion: the handle is
    /// reclaimed to commit or roll back.
    pub async fn run<T, F, Fut>(&self, ctx: &TxContext, work: F) -> ResultEngine<T>
    where
        F: FnOnce(TxContext) -> Fut,
        Fut: Future<Output = ResultEngine<T>>,
    {
        if ctx.in_transaction() {
            // Nested: the owner of the transaction commits or rolls back.
            return within_deadline(ctx.deadline, work(ctx.clone())).await;
        }

        let deadline = ctx
            .deadline
            .or_else(|| self.default_timeout.map(|timeout| Instant::now() + timeout));
        let db_tx = Arc::new(self.database.begin().await.inspect_err(|err| {
            tracing::error!(error = %err, "failed to begin transaction");
        })?);
        let inner = TxContext {
            transaction: Some(Arc::clone(&db_tx)),
            deadline,
        };

        let result = within_deadline(deadline, work(inner)).await;

        let db_tx = match Arc::try_unwrap(db_tx) {
            Ok(db_tx) => db_tx,
            Err(_) => {
                // The last clone rolls the transaction back when it is dropped.
                tracing::error!("transaction context escaped its unit of work");
                return Err(result.err().unwrap_or_else(|| {
                    EngineError::Internal("transaction context escaped its unit of work".to_string())
                }));
            }
        };

        match result {
            Ok(value) => {
                db_tx.commit().await.inspect_err(|err| {
                    tracing::error!(error = %err, "failed to commit transaction");
                })?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = db_tx.rollback().await {
                    tracing::error!(error = %rollback_err, "failed to roll back transaction");
                }
                tracing::debug!(error = %err, "unit of work failed, transaction rolled back");
                Err(err)
            }
        }
    }
}

async fn within_deadline<T, Fut>(deadline: Option<Instant>, work: Fut) -> ResultEngine<T>
where
    Fut: Future<Output = ResultEngine<T>>,
{
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, work)
            .await
            .map_err(|_| EngineError::Internal("unit of work timed out".to_string()))?,
        None => work.await,
    }
}
