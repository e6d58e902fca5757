pub mod rates_errors;
pub mod rates_model;
pub mod rates_provider;
pub mod rates_repository;
pub mod rates_service;
pub mod rates_traits;

pub use rates_errors::RateError;
pub use rates_model::{NewRateSnapshot, RateCacheStatus, RateSnapshot};
pub use rates_provider::{FixingProvider, NbpProvider};
pub use rates_repository::RateRepository;
pub use rates_service::RateService;
pub use rates_traits::{RateRepositoryTrait, RateServiceTrait};
