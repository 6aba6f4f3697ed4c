//! Bank lookups, listings and creation.

use std::sync::Arc;

use finatech_models::{validate_request, Bank, CreateBank, Filter, PagedResult, PagingDefaults};

use super::account::rollback_quietly;
use crate::{
    db::{traits::BANK_CONFLICT, BankingStore, StoreTransaction},
    metrics, Error, Result,
};

pub struct BankService {
    store: Arc<dyn BankingStore>,
    paging: PagingDefaults,
}

impl BankService {
    pub fn new(store: Arc<dyn BankingStore>, paging: PagingDefaults) -> Self {
        Self { store, paging }
    }

    pub async fn get_bank(&self, id: i32) -> Result<Option<Bank>> {
        tracing::info!(bank_id = id, "Retrieving bank");

        let bank = self.store.get_bank(id).await.inspect_err(|e| {
            tracing::error!(bank_id = id, error = %e, "Failed to retrieve bank");
        })?;

        if bank.is_none() {
            tracing::warn!(bank_id = id, "Bank not found");
        }
        Ok(bank)
    }

    pub async fn get_banks(&self, filter: &Filter) -> Result<PagedResult<Bank>> {
        tracing::info!(
            keywords = ?filter.keywords,
            skip = ?filter.skip_count,
            take = ?filter.max_result_count,
            "Retrieving banks"
        );

        let page = filter.page_request(self.paging)?;
        let result = self
            .store
            .search_banks(filter.keyword(), page)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to list banks"))?;

        tracing::info!(
            returned = result.items.len(),
            total = result.total_count,
            "Retrieved banks"
        );
        Ok(result)
    }

    /// # Errors
    /// * `Validation` - name or BIC missing or too long
    /// * `Conflict` - a bank with the same BIC exists
    pub async fn create_bank(&self, request: &CreateBank) -> Result<Bank> {
        let request = request.normalized();
        tracing::info!(bic = %request.bic, "Creating bank");

        if let Err(failure) = validate_request(&request) {
            metrics::VALIDATION_FAILURES_TOTAL
                .with_label_values(&["bank"])
                .inc();
            tracing::warn!(errors = ?failure.errors, "Bank validation failed");
            return Err(failure.into());
        }

        let mut tx = self.store.begin().await?;
        let created = match insert_new_bank(tx.as_mut(), &request).await {
            Ok(bank) => {
                tx.commit().await?;
                bank
            }
            Err(e) => {
                rollback_quietly(tx).await;
                return Err(e);
            }
        };

        let bank = self
            .store
            .get_bank(created.id)
            .await?
            .ok_or_else(|| Error::Internal(format!("bank {} missing after commit", created.id)))?;

        tracing::info!(bank_id = bank.id, "Bank created");
        Ok(bank)
    }
}

async fn insert_new_bank(tx: &mut dyn StoreTransaction, request: &CreateBank) -> Result<Bank> {
    if tx.find_bank_by_bic(&request.bic).await?.is_some() {
        tracing::warn!(bic = %request.bic, "Bank already exists");
        return Err(Error::Conflict(BANK_CONFLICT.to_string()));
    }
    tx.insert_bank(request).await
}
