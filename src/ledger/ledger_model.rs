use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of ledger operation behind a transaction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Exchange,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Exchange => "EXCHANGE",
        }
    }
}

impl From<&str> for TransactionType {
    fn from(value: &str) -> Self {
        match value {
            "EXCHANGE" => TransactionType::Exchange,
            _ => TransactionType::Deposit,
        }
    }
}

/// Domain model for one currency holding of one owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    pub owner_id: String,
    pub currency: String,
    pub balance: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Domain model for one committed ledger operation. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    pub owner_id: String,
    pub transaction_type: TransactionType,
    pub currency_from: String,
    pub currency_to: String,
    pub amount_from: Decimal,
    pub amount_to: Decimal,
    pub exchange_rate: Decimal,
    pub created_at: NaiveDateTime,
}

/// Database model for wallets
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::wallets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WalletDB {
    pub id: String,
    pub owner_id: String,
    pub currency: String,
    pub balance: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl WalletDB {
    /// Fresh zero-balance wallet for lazy creation on first use.
    pub fn empty(owner_id: &str, currency: &str) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            currency: currency.to_string(),
            balance: Decimal::ZERO.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn balance_decimal(&self) -> Decimal {
        Decimal::from_str(&self.balance).unwrap_or_default()
    }
}

impl From<WalletDB> for Wallet {
    fn from(db: WalletDB) -> Self {
        let balance = db.balance_decimal();
        Self {
            id: db.id,
            owner_id: db.owner_id,
            currency: db.currency,
            balance,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Database model for transaction records
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub owner_id: String,
    pub transaction_type: String,
    pub currency_from: String,
    pub currency_to: String,
    pub amount_from: String,
    pub amount_to: String,
    pub exchange_rate: String,
    pub created_at: NaiveDateTime,
}

impl TransactionDB {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner_id: &str,
        transaction_type: TransactionType,
        currency_from: &str,
        currency_to: &str,
        amount_from: Decimal,
        amount_to: Decimal,
        exchange_rate: Decimal,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            transaction_type: transaction_type.as_str().to_string(),
            currency_from: currency_from.to_string(),
            currency_to: currency_to.to_string(),
            amount_from: amount_from.to_string(),
            amount_to: amount_to.to_string(),
            exchange_rate: exchange_rate.to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

impl From<TransactionDB> for TransactionRecord {
    fn from(db: TransactionDB) -> Self {
        Self {
            id: db.id,
            owner_id: db.owner_id,
            transaction_type: TransactionType::from(db.transaction_type.as_str()),
            currency_from: db.currency_from,
            currency_to: db.currency_to,
            amount_from: Decimal::from_str(&db.amount_from).unwrap_or_default(),
            amount_to: Decimal::from_str(&db.amount_to).unwrap_or_default(),
            exchange_rate: Decimal::from_str(&db.exchange_rate).unwrap_or_default(),
            created_at: db.created_at,
        }
    }
}
