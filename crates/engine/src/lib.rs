//! Atomic transfers between ledger accounts.
//!
//! The engine moves money between two accounts inside a single database
//! transaction: both accounts are locked with one statement, the source
//! balance is checked under lock, both balances are updated and a transfer
//! record is appended. Any failure rolls the whole unit of work back.

pub use accounts::{Account, AccountId, AccountRepository};
pub use error::{EngineError, ErrorKind};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, TransferRequest};
pub use transfers::{NewTransfer, TransferRecord, TransferRepository};
pub use tx::{TxContext, TxManager};

mod accounts;
mod error;
mod money;
mod ops;
mod transfers;
mod tx;

type ResultEngine<T> = Result<T, EngineError>;
