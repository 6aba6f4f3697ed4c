//! Application services
//!
//! Services validate requests, run storage calls inside transactions where
//! writes are involved, and log each operation's outcome.

pub mod account;
pub mod bank;
pub mod payment;

pub use account::AccountService;
pub use bank::BankService;
pub use payment::PaymentService;
