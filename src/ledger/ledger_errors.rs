use rust_decimal::Decimal;
use thiserror::Error;

use crate::errors::DatabaseError;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Insufficient funds in {currency} wallet: balance {balance}, requested {requested}")]
    InsufficientFunds {
        currency: String,
        balance: Decimal,
        requested: Decimal,
    },

    #[error("Wallet not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<diesel::result::Error> for LedgerError {
    fn from(err: diesel::result::Error) -> Self {
        LedgerError::Database(err.to_string())
    }
}

impl From<DatabaseError> for LedgerError {
    fn from(err: DatabaseError) -> Self {
        LedgerError::Database(err.to_string())
    }
}
