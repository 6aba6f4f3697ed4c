//! In-process storage backend
//!
//! Keeps every table in memory behind a single async mutex. A transaction
//! holds the lock and works on a copy of the tables; `commit` swaps the copy
//! in, dropping the transaction throws it away.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use finatech_models::{
    Account, AccountIdentity, Address, Bank, CreateAccount, CreateAddress, CreateBank,
    PageRequest, PagedResult, Payment,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::traits::{
    BankingStore, NewPayment, PaymentSearch, StoreTransaction, ACCOUNT_CONFLICT, BANK_CONFLICT,
};
use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
struct Tables {
    addresses: BTreeMap<i32, Address>,
    accounts: BTreeMap<i32, Account>,
    banks: BTreeMap<i32, Bank>,
    payments: BTreeMap<i32, Payment>,
    last_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn account_with_address(&self, account: &Account) -> Account {
        Account {
            address: self.addresses.get(&account.address_id).cloned(),
            ..account.clone()
        }
    }

    fn load_account(&self, id: i32) -> Option<Account> {
        self.accounts
            .get(&id)
            .map(|account| self.account_with_address(account))
    }

    fn load_payment(&self, payment: &Payment) -> Payment {
        Payment {
            originator_account: self.load_account(payment.originator_account_id),
            beneficiary_account: self.load_account(payment.beneficiary_account_id),
            ..payment.clone()
        }
    }

    fn load_bank(&self, bank: &Bank) -> Bank {
        Bank {
            accounts: self
                .accounts
                .values()
                .filter(|account| account.bic == bank.bic)
                .map(|account| self.account_with_address(account))
                .collect(),
            ..bank.clone()
        }
    }

    fn find_account(&self, identity: &AccountIdentity) -> Option<Account> {
        self.accounts
            .values()
            .find(|account| account.identity() == *identity)
            .map(|account| self.account_with_address(account))
    }
}

/// Storage that lives for the lifetime of the process.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains(field: &str, keyword: &str) -> bool {
    field.contains(keyword)
}

fn contains_opt(field: &Option<String>, keyword: &str) -> bool {
    field.as_deref().is_some_and(|f| f.contains(keyword))
}

fn page_of<T: Clone>(matches: Vec<T>, page: PageRequest) -> PagedResult<T> {
    let total_count = matches.len() as i64;
    PagedResult::new(page.slice(&matches), total_count)
}

fn account_matches(account: &Account, keyword: &str) -> bool {
    let address_matches = account.address.as_ref().is_some_and(|address| {
        contains(&address.address_line1, keyword)
            || contains_opt(&address.address_line2, keyword)
            || contains_opt(&address.address_line3, keyword)
            || contains_opt(&address.city, keyword)
            || contains_opt(&address.post_code, keyword)
            || contains(&address.country_code, keyword)
    });

    contains(&account.name, keyword)
        || contains(&account.iban, keyword)
        || contains(&account.account_number, keyword)
        || address_matches
}

#[async_trait]
impl BankingStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }

    async fn get_payment(&self, id: i32) -> Result<Option<Payment>> {
        let tables = self.tables.lock().await;
        Ok(tables.payments.get(&id).map(|p| tables.load_payment(p)))
    }

    async fn search_payments(
        &self,
        search: PaymentSearch<'_>,
        page: PageRequest,
    ) -> Result<PagedResult<Payment>> {
        let tables = self.tables.lock().await;
        let matches = tables
            .payments
            .values()
            .filter(|p| {
                search.keyword.map_or(true, |k| {
                    contains_opt(&p.reference_number, k) || contains_opt(&p.details, k)
                })
            })
            .filter(|p| {
                search
                    .originator_account_id
                    .map_or(true, |id| p.originator_account_id == id)
            })
            .filter(|p| {
                search
                    .beneficiary_account_id
                    .map_or(true, |id| p.beneficiary_account_id == id)
            })
            .map(|p| tables.load_payment(p))
            .collect();
        Ok(page_of(matches, page))
    }

    async fn get_account(&self, id: i32) -> Result<Option<Account>> {
        Ok(self.tables.lock().await.load_account(id))
    }

    async fn search_accounts(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
    ) -> Result<PagedResult<Account>> {
        let tables = self.tables.lock().await;
        let matches = tables
            .accounts
            .values()
            .map(|a| tables.account_with_address(a))
            .filter(|a| keyword.map_or(true, |k| account_matches(a, k)))
            .collect();
        Ok(page_of(matches, page))
    }

    async fn get_bank(&self, id: i32) -> Result<Option<Bank>> {
        let tables = self.tables.lock().await;
        Ok(tables.banks.get(&id).map(|b| tables.load_bank(b)))
    }

    async fn search_banks(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
    ) -> Result<PagedResult<Bank>> {
        let tables = self.tables.lock().await;
        let matches = tables
            .banks
            .values()
            .filter(|b| keyword.map_or(true, |k| contains(&b.name, k) || contains(&b.bic, k)))
            .map(|b| tables.load_bank(b))
            .collect();
        Ok(page_of(matches, page))
    }
}

/// Holds the store lock until committed or dropped.
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn find_account_by_identity(
        &mut self,
        identity: &AccountIdentity,
    ) -> Result<Option<Account>> {
        Ok(self.working.find_account(identity))
    }

    async fn insert_address(&mut self, address: &CreateAddress) -> Result<Address> {
        let id = self.working.next_id();
        let address = Address {
            id,
            address_line1: address.address_line1.clone(),
            address_line2: address.address_line2.clone(),
            address_line3: address.address_line3.clone(),
            city: address.city.clone(),
            post_code: address.post_code.clone(),
            country_code: address.country_code.clone(),
        };
        self.working.addresses.insert(id, address.clone());
        Ok(address)
    }

    async fn insert_account(
        &mut self,
        address_id: i32,
        account: &CreateAccount,
    ) -> Result<Account> {
        if !self.working.addresses.contains_key(&address_id) {
            return Err(Error::Internal(format!(
                "address {address_id} does not exist"
            )));
        }
        if self.working.find_account(&account.identity()).is_some() {
            return Err(Error::Conflict(ACCOUNT_CONFLICT.to_string()));
        }

        let id = self.working.next_id();
        let row = Account {
            id,
            address_id,
            name: account.name.clone(),
            iban: account.iban.clone(),
            bic: account.bic.clone(),
            account_number: account.account_number.clone(),
            address: None,
        };
        self.working.accounts.insert(id, row.clone());
        Ok(self.working.account_with_address(&row))
    }

    async fn insert_account_if_absent(
        &mut self,
        address: &CreateAddress,
        account: &CreateAccount,
    ) -> Result<Option<Account>> {
        // Writers hold the table lock, so no other insert can be in flight.
        if self.working.find_account(&account.identity()).is_some() {
            return Ok(None);
        }
        let address = self.insert_address(address).await?;
        self.insert_account(address.id, account).await.map(Some)
    }

    async fn find_bank_by_bic(&mut self, bic: &str) -> Result<Option<Bank>> {
        Ok(self
            .working
            .banks
            .values()
            .find(|b| b.bic == bic)
            .map(|b| self.working.load_bank(b)))
    }

    async fn insert_bank(&mut self, bank: &CreateBank) -> Result<Bank> {
        if self.working.banks.values().any(|b| b.bic == bank.bic) {
            return Err(Error::Conflict(BANK_CONFLICT.to_string()));
        }

        let id = self.working.next_id();
        let row = Bank {
            id,
            name: bank.name.clone(),
            bic: bank.bic.clone(),
            accounts: Vec::new(),
        };
        self.working.banks.insert(id, row.clone());
        Ok(self.working.load_bank(&row))
    }

    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<i32> {
        for account_id in [payment.originator_account_id, payment.beneficiary_account_id] {
            if !self.working.accounts.contains_key(&account_id) {
                return Err(Error::Internal(format!(
                    "account {account_id} does not exist"
                )));
            }
        }

        let id = self.working.next_id();
        self.working.payments.insert(
            id,
            Payment {
                id,
                originator_account_id: payment.originator_account_id,
                beneficiary_account_id: payment.beneficiary_account_id,
                amount: payment.amount.clone(),
                date: payment.date,
                charges_bearer: payment.charges_bearer,
                details: payment.details.clone(),
                reference_number: payment.reference_number.clone(),
                originator_account: None,
                beneficiary_account: None,
            },
        );
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
