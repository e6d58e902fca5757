pub mod ledger_errors;
pub mod ledger_model;
pub mod ledger_repository;
pub mod ledger_service;
pub mod ledger_traits;

pub use ledger_errors::LedgerError;
pub use ledger_model::{TransactionRecord, TransactionType, Wallet};
pub use ledger_repository::LedgerRepository;
pub use ledger_service::LedgerService;
pub use ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
