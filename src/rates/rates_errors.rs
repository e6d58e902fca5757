use thiserror::Error;

use crate::errors::DatabaseError;

#[derive(Error, Debug)]
pub enum RateError {
    /// Provider could not be reached (or answered with a server error) and
    /// the cache held nothing usable either.
    #[error("Upstream rate provider unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Provider answered but has no fixing for the requested currency/date,
    /// typically a non-business day.
    #[error("Rate not found: {0}")]
    RateNotFound(String),

    #[error("Invalid rate data: {0}")]
    InvalidData(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<diesel::result::Error> for RateError {
    fn from(err: diesel::result::Error) -> Self {
        RateError::Database(err.to_string())
    }
}

impl From<DatabaseError> for RateError {
    fn from(err: DatabaseError) -> Self {
        RateError::Database(err.to_string())
    }
}
