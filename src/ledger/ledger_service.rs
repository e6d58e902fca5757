use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::ledger_errors::LedgerError;
use super::ledger_model::{TransactionRecord, Wallet};
use super::ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
use crate::errors::Result;

/// Service for wallet deposits, exchanges and history.
///
/// The exchange rate is supplied by the caller (resolved against the rate
/// service just before the call); this service only validates and converts.
pub struct LedgerService {
    repository: Arc<dyn LedgerRepositoryTrait>,
    home_currency: String,
}

impl LedgerService {
    pub fn new(repository: Arc<dyn LedgerRepositoryTrait>, home_currency: String) -> Self {
        Self {
            repository,
            home_currency,
        }
    }

    pub fn home_currency(&self) -> &str {
        &self.home_currency
    }

    fn validate_amount(amount: Decimal, what: &str) -> std::result::Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput(format!(
                "{} must be positive, got {}",
                what, amount
            )));
        }
        Ok(())
    }

    fn validate_currency(code: &str) -> std::result::Result<(), LedgerError> {
        if code.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "currency code cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl LedgerServiceTrait for LedgerService {
    fn deposit(&self, owner_id: &str, amount: Decimal) -> Result<TransactionRecord> {
        if owner_id.trim().is_empty() {
            return Err(LedgerError::InvalidInput("owner id cannot be empty".to_string()).into());
        }
        Self::validate_amount(amount, "deposit amount")?;

        debug!(
            "Depositing {} {} for owner {}",
            amount, self.home_currency, owner_id
        );
        self.repository.deposit(owner_id, &self.home_currency, amount)
    }

    fn exchange(
        &self,
        owner_id: &str,
        currency_from: &str,
        currency_to: &str,
        amount: Decimal,
        rate: Decimal,
    ) -> Result<TransactionRecord> {
        if owner_id.trim().is_empty() {
            return Err(LedgerError::InvalidInput("owner id cannot be empty".to_string()).into());
        }
        Self::validate_currency(currency_from)?;
        Self::validate_currency(currency_to)?;
        Self::validate_amount(amount, "exchange amount")?;
        Self::validate_amount(rate, "exchange rate")?;
        if currency_from == currency_to {
            return Err(LedgerError::InvalidInput(format!(
                "cannot exchange {} into itself",
                currency_from
            ))
            .into());
        }

        // Fixings are quoted in the home currency per unit of foreign
        // currency: buying foreign divides, selling back multiplies.
        let target_amount = if currency_from == self.home_currency {
            amount / rate
        } else {
            amount * rate
        };

        debug!(
            "Exchanging {} {} -> {} {} at {} for owner {}",
            amount, currency_from, target_amount, currency_to, rate, owner_id
        );
        self.repository.exchange(
            owner_id,
            currency_from,
            currency_to,
            amount,
            target_amount,
            rate,
        )
    }

    fn list_transactions(&self, owner_id: &str) -> Result<Vec<TransactionRecord>> {
        self.repository.list_transactions(owner_id)
    }

    fn list_wallets(&self, owner_id: &str) -> Result<Vec<Wallet>> {
        self.repository.list_wallets(owner_id)
    }
}
