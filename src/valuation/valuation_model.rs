use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Profit/loss of one foreign currency position, derived from the owner's
/// exchange history and the current fixing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyPerformance {
    pub currency: String,
    /// Home-currency amount spent buying this currency.
    pub invested: Decimal,
    /// Foreign-currency amount received for it.
    pub received: Decimal,
    pub average_rate: Decimal,
    pub current_rate: Decimal,
    /// `received` valued at the current fixing.
    pub current_value: Decimal,
    pub profit_loss: Decimal,
    pub profit_loss_percent: Decimal,
}

/// One wallet valued in the home currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingValuation {
    pub currency: String,
    pub balance: Decimal,
    /// None when no fixing is cached for this currency.
    pub rate: Option<Decimal>,
    pub value: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub home_currency: String,
    pub holdings: Vec<HoldingValuation>,
    /// Sum over holdings with a known fixing.
    pub total_value: Decimal,
}
