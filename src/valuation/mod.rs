pub mod valuation_model;
pub mod valuation_service;

pub use valuation_model::{CurrencyPerformance, HoldingValuation, PortfolioSummary};
pub use valuation_service::ValuationService;
