//! Error types for FinaTech models

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid field value: {0}")]
    InvalidFieldValue(String),

    #[error("Unknown charges bearer code: {0}")]
    UnknownChargesBearer(i16),

    #[error("{0}")]
    InvalidPaging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
