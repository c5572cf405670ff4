//! Append-only audit trail of applied transfers.

use chrono::{DateTime, Utc};

use sea_orm::{ActiveValue, DatabaseConnection, entity::prelude::*};

use crate::{AccountId, MoneyCents, ResultEngine, TxContext, tx::with_conn};

/// A transfer about to be recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NewTransfer {
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: MoneyCents,
    pub transfer_time: DateTime<Utc>,
}

/// A recorded transfer. Accounts are referenced by id only: the record is a
/// historical fact and does not follow later balance changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRecord {
    pub id: i64,
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: MoneyCents,
    pub transfer_time: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub source_account_id: i64,
    pub destination_account_id: i64,
    pub amount: i64,
    pub transfer_time: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for TransferRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            source_account_id: model.source_account_id,
            destination_account_id: model.destination_account_id,
            amount: MoneyCents::new(model.amount),
            transfer_time: model.transfer_time,
        }
    }
}

impl From<&NewTransfer> for ActiveModel {
    fn from(transfer: &NewTransfer) -> Self {
        Self {
            id: ActiveValue::NotSet,
            source_account_id: ActiveValue::Set(transfer.source_account_id),
            destination_account_id: ActiveValue::Set(transfer.destination_account_id),
            amount: ActiveValue::Set(transfer.amount.cents()),
            transfer_time: ActiveValue::Set(transfer.transfer_time),
        }
    }
}

/// Writer for the `transfers` table. Records are only ever inserted.
#[derive(Clone, Debug)]
pub struct TransferRepository {
    database: DatabaseConnection,
}

impl TransferRepository {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    pub async fn create(
        &self,
        ctx: &TxContext,
        transfer: &NewTransfer,
    ) -> ResultEngine<TransferRecord> {
        let model = with_conn!(ctx, &self.database, |conn| {
            ActiveModel::from(transfer).insert(conn).await?
        });
        Ok(TransferRecord::from(model))
    }
}
