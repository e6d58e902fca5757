use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::valuation_model::{CurrencyPerformance, HoldingValuation, PortfolioSummary};
use crate::errors::Result;
use crate::ledger::ledger_model::TransactionType;
use crate::ledger::LedgerRepositoryTrait;
use crate::rates::RateServiceTrait;

/// Values an owner's holdings and exchange history in the home currency
/// using the resolver's current fixing table.
pub struct ValuationService {
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    rate_service: Arc<dyn RateServiceTrait>,
    home_currency: String,
}

impl ValuationService {
    pub fn new(
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        rate_service: Arc<dyn RateServiceTrait>,
        home_currency: String,
    ) -> Self {
        Self {
            ledger_repository,
            rate_service,
            home_currency,
        }
    }

    async fn current_mids(&self) -> Result<HashMap<String, Decimal>> {
        let snapshots = self.rate_service.get_current_rates(false).await?;
        Ok(snapshots
            .into_iter()
            .map(|s| (s.currency, s.mid))
            .collect())
    }

    /// Per-currency profit/loss of home-to-foreign exchanges. Currencies
    /// without a current fixing are skipped.
    pub async fn currency_performance(&self, owner_id: &str) -> Result<Vec<CurrencyPerformance>> {
        let records = self.ledger_repository.list_transactions(owner_id)?;
        let mids = self.current_mids().await?;

        // (invested home amount, received foreign amount) per target currency
        let mut positions: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
        for record in records {
            if record.transaction_type != TransactionType::Exchange
                || record.currency_from != self.home_currency
            {
                continue;
            }
            let entry = positions
                .entry(record.currency_to.clone())
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            entry.0 += record.amount_from;
            entry.1 += record.amount_to;
        }

        let mut performance = Vec::with_capacity(positions.len());
        for (currency, (invested, received)) in positions {
            if invested.is_zero() || received.is_zero() {
                continue;
            }
            let current_rate = match mids.get(&currency) {
                Some(mid) => *mid,
                None => continue,
            };

            let current_value = received * current_rate;
            let profit_loss = current_value - invested;
            performance.push(CurrencyPerformance {
                currency,
                invested,
                received,
                average_rate: invested / received,
                current_rate,
                current_value,
                profit_loss,
                profit_loss_percent: profit_loss / invested * Decimal::ONE_HUNDRED,
            });
        }

        Ok(performance)
    }

    /// All wallets valued at the current fixing; the home wallet at face
    /// value. Wallets without a fixing stay unvalued.
    pub async fn portfolio_summary(&self, owner_id: &str) -> Result<PortfolioSummary> {
        let wallets = self.ledger_repository.list_wallets(owner_id)?;
        let mids = self.current_mids().await?;

        let mut holdings = Vec::with_capacity(wallets.len());
        let mut total_value = Decimal::ZERO;
        for wallet in wallets {
            let rate = if wallet.currency == self.home_currency {
                Some(Decimal::ONE)
            } else {
                mids.get(&wallet.currency).copied()
            };
            let value = rate.map(|r| wallet.balance * r);
            if let Some(v) = value {
                total_value += v;
            }
            holdings.push(HoldingValuation {
                currency: wallet.currency,
                balance: wallet.balance,
                rate,
                value,
            });
        }

        Ok(PortfolioSummary {
            home_currency: self.home_currency.clone(),
            holdings,
            total_value,
        })
    }
}
