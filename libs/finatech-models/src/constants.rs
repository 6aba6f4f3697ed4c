//! Field limits shared by validation rules and the database schema.
//!
//! Maximum lengths are `u64` because `#[validate(length(max = ...))]` compares
//! against `u64`; exact letter-code lengths are `usize` for `str::len`.

pub mod account {
    pub const MAX_LENGTH_OF_NAME: u64 = 50;
    pub const MAX_LENGTH_OF_ACCOUNT_NUMBER: u64 = 11;
    pub const MAX_LENGTH_OF_IBAN: u64 = 34;
    pub const MAX_LENGTH_OF_BIC: u64 = 11;
}

pub mod address {
    pub const MAX_LENGTH_OF_ADDRESS_LINE: u64 = 100;
    pub const MAX_LENGTH_OF_CITY: u64 = 50;
    pub const MAX_LENGTH_OF_POST_CODE: u64 = 10;
    /// ISO 3166-1 alpha-2
    pub const LENGTH_OF_COUNTRY_CODE: usize = 2;
}

pub mod bank {
    pub const MAX_LENGTH_OF_NAME: u64 = 100;
    pub const MAX_LENGTH_OF_BIC: u64 = 11;
}

pub mod payment {
    pub const MAX_LENGTH_OF_REFERENCE_NUMBER: u64 = 50;
    pub const MAX_LENGTH_OF_DETAILS: u64 = 100;
    /// ISO 4217 alphabetic code
    pub const LENGTH_OF_CURRENCY: usize = 3;
}
