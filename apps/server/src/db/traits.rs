//! Core traits for payment storage backends

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finatech_models::{
    Account, AccountIdentity, Address, Bank, ChargesBearer, CreateAccount, CreateAddress,
    CreateBank, Money, PageRequest, PagedResult, Payment,
};

use crate::Result;

/// Criteria for payment listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentSearch<'a> {
    /// Substring of the reference number or details.
    pub keyword: Option<&'a str>,
    pub originator_account_id: Option<i32>,
    pub beneficiary_account_id: Option<i32>,
}

/// A payment row ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub originator_account_id: i32,
    pub beneficiary_account_id: i32,
    pub amount: Money,
    pub date: DateTime<Utc>,
    pub charges_bearer: ChargesBearer,
    pub details: Option<String>,
    pub reference_number: Option<String>,
}

/// Read access to stored banking data plus a way to open a write transaction.
///
/// Lookups return `Ok(None)` for missing rows. Searches match keywords as
/// case-sensitive substrings, order by id ascending, and report the total
/// number of matches before paging.
#[async_trait]
pub trait BankingStore: Send + Sync {
    /// Begin a transaction. Dropping it without `commit` discards its writes.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>>;

    /// Payment with both accounts and their addresses loaded.
    async fn get_payment(&self, id: i32) -> Result<Option<Payment>>;

    /// Payments with both accounts loaded.
    async fn search_payments(
        &self,
        search: PaymentSearch<'_>,
        page: PageRequest,
    ) -> Result<PagedResult<Payment>>;

    /// Account with its address loaded.
    async fn get_account(&self, id: i32) -> Result<Option<Account>>;

    /// Keyword matches name, IBAN, account number or any address field.
    async fn search_accounts(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
    ) -> Result<PagedResult<Account>>;

    /// Bank with the accounts registered under its BIC.
    async fn get_bank(&self, id: i32) -> Result<Option<Bank>>;

    /// Keyword matches name or BIC.
    async fn search_banks(&self, keyword: Option<&str>, page: PageRequest)
        -> Result<PagedResult<Bank>>;
}

/// Writes executed atomically.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn find_account_by_identity(
        &mut self,
        identity: &AccountIdentity,
    ) -> Result<Option<Account>>;

    async fn insert_address(&mut self, address: &CreateAddress) -> Result<Address>;

    /// Insert an account pointing at an existing address.
    ///
    /// # Errors
    /// * `Conflict` - an account with the same identity exists
    async fn insert_account(&mut self, address_id: i32, account: &CreateAccount)
        -> Result<Account>;

    /// Insert an account and its address unless an account with the same
    /// identity is already stored. Returns `None`, having written nothing,
    /// when the identity is taken. A concurrent transaction inserting the
    /// same identity is waited for rather than reported as a conflict.
    async fn insert_account_if_absent(
        &mut self,
        address: &CreateAddress,
        account: &CreateAccount,
    ) -> Result<Option<Account>>;

    async fn find_bank_by_bic(&mut self, bic: &str) -> Result<Option<Bank>>;

    /// # Errors
    /// * `Conflict` - a bank with the same BIC exists
    async fn insert_bank(&mut self, bank: &CreateBank) -> Result<Bank>;

    /// Returns the new payment id.
    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<i32>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

pub(crate) const ACCOUNT_CONFLICT: &str =
    "An account with this IBAN, BIC and account number already exists.";
pub(crate) const BANK_CONFLICT: &str = "A bank with this BIC already exists.";
