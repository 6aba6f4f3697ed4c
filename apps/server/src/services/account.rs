//! Account lookups, listings and creation.

use std::sync::Arc;

use finatech_models::{validate_request, Account, CreateAccount, Filter, PagedResult, PagingDefaults};

use crate::{
    db::{traits::ACCOUNT_CONFLICT, BankingStore, StoreTransaction},
    metrics, Error, Result,
};

pub struct AccountService {
    store: Arc<dyn BankingStore>,
    paging: PagingDefaults,
}

impl AccountService {
    pub fn new(store: Arc<dyn BankingStore>, paging: PagingDefaults) -> Self {
        Self { store, paging }
    }

    /// The account with its address, or `None` when the id is unknown.
    pub async fn get_account(&self, id: i32) -> Result<Option<Account>> {
        tracing::info!(account_id = id, "Retrieving account");

        let account = self.store.get_account(id).await.inspect_err(|e| {
            tracing::error!(account_id = id, error = %e, "Failed to retrieve account");
        })?;

        if account.is_none() {
            tracing::warn!(account_id = id, "Account not found");
        }
        Ok(account)
    }

    pub async fn get_accounts(&self, filter: &Filter) -> Result<PagedResult<Account>> {
        tracing::info!(
            keywords = ?filter.keywords,
            skip = ?filter.skip_count,
            take = ?filter.max_result_count,
            "Retrieving accounts"
        );

        let page = filter.page_request(self.paging)?;
        let result = self
            .store
            .search_accounts(filter.keyword(), page)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to list accounts"))?;

        tracing::info!(
            returned = result.items.len(),
            total = result.total_count,
            "Retrieved accounts"
        );
        Ok(result)
    }

    /// Validate and insert a new account with its address.
    ///
    /// # Errors
    /// * `Validation` - the request breaks one or more field rules
    /// * `Conflict` - an account with the same IBAN, BIC and account number exists
    pub async fn create_account(&self, request: &CreateAccount) -> Result<Account> {
        let request = request.normalized();
        tracing::info!(name = %request.name, "Creating account");

        if let Err(failure) = validate_request(&request) {
            metrics::VALIDATION_FAILURES_TOTAL
                .with_label_values(&["account"])
                .inc();
            tracing::warn!(errors = ?failure.errors, "Account validation failed");
            return Err(failure.into());
        }

        let mut tx = self.store.begin().await?;
        let created = match insert_new_account(tx.as_mut(), &request).await {
            Ok(account) => {
                tx.commit().await?;
                account
            }
            Err(e) => {
                rollback_quietly(tx).await;
                return Err(e);
            }
        };
        metrics::ACCOUNTS_CREATED_TOTAL
            .with_label_values(&["account"])
            .inc();

        let account = self.store.get_account(created.id).await?.ok_or_else(|| {
            Error::Internal(format!("account {} missing after commit", created.id))
        })?;

        tracing::info!(account_id = account.id, "Account created");
        Ok(account)
    }
}

async fn insert_new_account(
    tx: &mut dyn StoreTransaction,
    request: &CreateAccount,
) -> Result<Account> {
    if tx
        .find_account_by_identity(&request.identity())
        .await?
        .is_some()
    {
        tracing::warn!(iban = %request.iban, bic = %request.bic, "Account already exists");
        return Err(Error::Conflict(ACCOUNT_CONFLICT.to_string()));
    }
    insert_account_with_address(tx, request).await
}

async fn insert_account_with_address(
    tx: &mut dyn StoreTransaction,
    request: &CreateAccount,
) -> Result<Account> {
    let address = request
        .address
        .as_ref()
        .ok_or_else(|| Error::InvalidArgument("Account address cannot be null.".to_string()))?;

    let address = tx.insert_address(address).await?;
    tx.insert_account(address.id, request).await
}

/// Return the account matching the request's identity, inserting it (and a
/// new address) when none exists. Runs inside the caller's transaction.
///
/// When another transaction creates the same account first, its row is
/// reused instead of failing the payment.
pub(crate) async fn find_or_create_account(
    tx: &mut dyn StoreTransaction,
    request: &CreateAccount,
) -> Result<Account> {
    let identity = request.identity();
    if let Some(existing) = tx.find_account_by_identity(&identity).await? {
        tracing::debug!(account_id = existing.id, "Reusing existing account");
        return Ok(existing);
    }

    let address = request
        .address
        .as_ref()
        .ok_or_else(|| Error::InvalidArgument("Account address cannot be null.".to_string()))?;

    match tx.insert_account_if_absent(address, request).await? {
        Some(account) => {
            metrics::ACCOUNTS_CREATED_TOTAL
                .with_label_values(&["payment"])
                .inc();
            tracing::debug!(account_id = account.id, "Created account for payment");
            Ok(account)
        }
        None => {
            let existing = tx.find_account_by_identity(&identity).await?.ok_or_else(|| {
                Error::Internal(format!(
                    "account {}/{}/{} vanished after a concurrent insert",
                    identity.iban, identity.bic, identity.account_number
                ))
            })?;
            tracing::debug!(
                account_id = existing.id,
                "Reusing account created by a concurrent payment"
            );
            Ok(existing)
        }
    }
}

pub(crate) async fn rollback_quietly(tx: Box<dyn StoreTransaction>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "Transaction rollback failed");
    }
}
