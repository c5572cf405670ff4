//! The module contains `Account` struct, its table and its repository.

use chrono::{DateTime, Utc};

use sea_orm::{
    ActiveValue, DatabaseConnection, QueryFilter, QueryOrder, QuerySelect, Select, SqlErr,
    entity::prelude::*,
};

use crate::{EngineError, MoneyCents, ResultEngine, TxContext, tx::with_conn};

/// Caller-assigned, strictly positive account identifier.
pub type AccountId = i64;

/// A ledger account.
///
/// The balance never goes below zero in any committed state: it only moves
/// through [`Account::debit`] and [`Account::credit`] inside a transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub balance: MoneyCents,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(id: AccountId, balance: MoneyCents) -> Self {
        Self {
            id,
            balance,
            created_at: Utc::now(),
        }
    }

    pub fn debit(&mut self, amount: MoneyCents) -> ResultEngine<()> {
        if self.balance < amount {
            return Err(EngineError::InsufficientFunds(
                "insufficient balance".to_string(),
            ));
        }
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| EngineError::Internal("balance overflow".to_string()))?;
        Ok(())
    }

    pub fn credit(&mut self, amount: MoneyCents) -> ResultEngine<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| EngineError::Internal("balance overflow".to_string()))?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub balance: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let balance = MoneyCents::new(model.balance);
        if balance.is_negative() {
            return Err(EngineError::Internal(format!(
                "account {} has a negative balance",
                model.id
            )));
        }
        Ok(Self {
            id: model.id,
            balance,
            created_at: model.created_at,
        })
    }
}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id),
            balance: ActiveValue::Set(account.balance.cents()),
            created_at: ActiveValue::Set(account.created_at),
        }
    }
}

/// `SELECT ... WHERE id IN (..) ORDER BY id FOR UPDATE` over `ids`.
fn locking_select(ids: &[AccountId]) -> Select<Entity> {
    Entity::find()
        .filter(Column::Id.is_in(ids.iter().copied()))
        .order_by_asc(Column::Id)
        .lock_exclusive()
}

/// Typed access to the `accounts` table.
#[derive(Clone, Debug)]
pub struct AccountRepository {
    database: DatabaseConnection,
}

impl AccountRepository {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    /// Unlocked point read. A missing account is `Ok(None)`.
    pub async fn find_one(&self, ctx: &TxContext, id: AccountId) -> ResultEngine<Option<Account>> {
        let model = with_conn!(ctx, &self.database, |conn| {
            Entity::find_by_id(id).one(conn).await?
        });
        model.map(Account::try_from).transpose()
    }

    /// Locks every existing row among `ids` with a single `SELECT ... FOR
    /// UPDATE`, in id order.
    ///
    /// Two transfers naming the same accounts in opposite order issue the same
    /// statement, so they queue on the row locks instead of each holding one
    /// row while waiting for the other. Rows that do not exist are simply
    /// missing from the result.
    pub async fn find_for_update(
        &self,
        ctx: &TxContext,
        ids: &[AccountId],
    ) -> ResultEngine<Vec<Account>> {
        if ids.len() < 2 {
            return Err(EngineError::Internal(
                "locking read needs at least two account ids".to_string(),
            ));
        }
        let models = with_conn!(ctx, &self.database, |conn| {
            locking_select(ids).all(conn).await?
        });
        models.into_iter().map(Account::try_from).collect()
    }

    /// Inserts a new account. The store's primary key is the final guard
    /// against duplicates.
    pub async fn create(&self, ctx: &TxContext, account: &Account) -> ResultEngine<Account> {
        let result = with_conn!(ctx, &self.database, |conn| {
            ActiveModel::from(account).insert(conn).await
        });
        match result {
            Ok(model) => Account::try_from(model),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(EngineError::ExistingKey(
                    "account ID already exists".to_string(),
                )),
                _ => Err(EngineError::Database(err)),
            },
        }
    }

    /// Persists the current balance of `account`.
    pub async fn update(&self, ctx: &TxContext, account: &Account) -> ResultEngine<()> {
        let model = ActiveModel {
            id: ActiveValue::Unchanged(account.id),
            balance: ActiveValue::Set(account.balance.cents()),
            created_at: ActiveValue::Unchanged(account.created_at),
        };
        with_conn!(ctx, &self.database, |conn| model.update(conn).await?);
        Ok(())
    }
}
