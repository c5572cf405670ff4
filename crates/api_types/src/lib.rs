//! Request and response bodies of the HTTP API.
//!
//! Amounts travel as JSON numbers in whole currency units (`100.5` is one
//! hundred and fifty cents); the server converts them to exact cents.

use serde::{Deserialize, Serialize};

pub mod account {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct AccountNew {
        pub account_id: i64,
        pub balance: f64,
    }

    /// Current state of an account.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Account {
        pub account_id: i64,
        pub balance: f64,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub source_account_id: i64,
        pub destination_account_id: i64,
        pub amount: f64,
    }
}

pub mod error {
    use super::*;

    /// Body of every failed request.
    ///
    /// `code` is stable and machine-readable; `message` is meant for humans.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub status: u16,
        pub code: String,
        pub message: String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_new_uses_snake_case_fields() {
        let body: transaction::TransactionNew = serde_json::from_str(
            r#"{"source_account_id": 111, "destination_account_id": 222, "amount": 100.5}"#,
        )
        .unwrap();
        assert_eq!(body.source_account_id, 111);
        assert_eq!(body.destination_account_id, 222);
        assert_eq!(body.amount, 100.5);
    }

    #[test]
    fn missing_field_is_rejected() {
        let body = serde_json::from_str::<account::AccountNew>(r#"{"account_id": 1}"#);
        assert!(body.is_err());
    }
}
