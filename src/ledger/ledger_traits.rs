use rust_decimal::Decimal;

use super::ledger_model::{TransactionRecord, Wallet};
use crate::errors::Result;

/// Trait defining the contract for ledger persistence. The mutating
/// operations commit balance updates and the transaction record as one
/// atomic unit.
pub trait LedgerRepositoryTrait: Send + Sync {
    fn get_wallet(&self, owner_id: &str, currency: &str) -> Result<Option<Wallet>>;
    fn list_wallets(&self, owner_id: &str) -> Result<Vec<Wallet>>;
    /// Most recent first.
    fn list_transactions(&self, owner_id: &str) -> Result<Vec<TransactionRecord>>;
    fn deposit(&self, owner_id: &str, currency: &str, amount: Decimal)
        -> Result<TransactionRecord>;
    #[allow(clippy::too_many_arguments)]
    fn exchange(
        &self,
        owner_id: &str,
        currency_from: &str,
        currency_to: &str,
        amount: Decimal,
        target_amount: Decimal,
        rate: Decimal,
    ) -> Result<TransactionRecord>;
}

/// Trait defining the contract for wallet ledger operations.
pub trait LedgerServiceTrait: Send + Sync {
    fn deposit(&self, owner_id: &str, amount: Decimal) -> Result<TransactionRecord>;
    fn exchange(
        &self,
        owner_id: &str,
        currency_from: &str,
        currency_to: &str,
        amount: Decimal,
        rate: Decimal,
    ) -> Result<TransactionRecord>;
    fn list_transactions(&self, owner_id: &str) -> Result<Vec<TransactionRecord>>;
    fn list_wallets(&self, owner_id: &str) -> Result<Vec<Wallet>>;
}
