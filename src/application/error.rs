use thiserror::Error;

use crate::storage::FetchError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Booking already fulfilled: {0}")]
    BookingAlreadyFulfilled(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Backend error: {0}")]
    Api(#[from] FetchError),
}
