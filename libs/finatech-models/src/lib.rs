//! FinaTech domain models
//!
//! Strongly-typed structures shared by the payments service:
//!
//! - **Entities**: `Address`, `Account`, `Bank`, `Payment` (with `Money` and `ChargesBearer`)
//! - **Requests**: `CreateAddress`, `CreateAccount`, `CreatePayment`, `CreateBank`
//! - **Listing**: `Filter`, `PaymentFilter`, `PageRequest`, `PagedResult`
//! - **Validation**: field rules declared with `validator` and flattened into readable messages
//!
//! # Example
//!
//! ```rust
//! use finatech_models::{validate_request, CreateAddress};
//!
//! let address = CreateAddress {
//!     address_line1: "1 Market Street".to_string(),
//!     country_code: "GB".to_string(),
//!     ..Default::default()
//! };
//! assert!(validate_request(&address).is_ok());
//! ```

pub mod account;
pub mod address;
pub mod bank;
pub mod constants;
pub mod error;
pub mod paging;
pub mod payment;
pub mod validation;

// Re-export commonly used types
pub use account::*;
pub use address::*;
pub use bank::*;
pub use error::{Error, Result};
pub use paging::*;
pub use payment::*;
pub use validation::{validate_request, ValidationFailure};
