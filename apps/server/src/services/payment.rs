//! Payment lookups, listings and the creation workflow.

use std::sync::Arc;

use chrono::Utc;
use finatech_models::{
    validate_request, CreatePayment, ListPayment, PagedResult, PagingDefaults, Payment,
    PaymentFilter,
};

use super::account::{find_or_create_account, rollback_quietly};
use crate::{
    db::{BankingStore, NewPayment, PaymentSearch, StoreTransaction},
    metrics, Error, Result,
};

pub struct PaymentService {
    store: Arc<dyn BankingStore>,
    paging: PagingDefaults,
}

impl PaymentService {
    pub fn new(store: Arc<dyn BankingStore>, paging: PagingDefaults) -> Self {
        Self { store, paging }
    }

    /// The payment with both accounts and their addresses, or `None`.
    pub async fn get_payment(&self, id: i32) -> Result<Option<Payment>> {
        tracing::info!(payment_id = id, "Retrieving payment");

        let payment = self.store.get_payment(id).await.inspect_err(|e| {
            tracing::error!(payment_id = id, error = %e, "Failed to retrieve payment");
        })?;

        if payment.is_none() {
            tracing::warn!(payment_id = id, "Payment not found");
        }
        Ok(payment)
    }

    pub async fn get_payments(&self, filter: &PaymentFilter) -> Result<PagedResult<ListPayment>> {
        tracing::info!(
            keywords = ?filter.keywords,
            skip = ?filter.skip_count,
            take = ?filter.max_result_count,
            originator_account_id = ?filter.originator_account_id,
            beneficiary_account_id = ?filter.beneficiary_account_id,
            "Retrieving payments"
        );

        let page = filter.page_request(self.paging)?;
        let search = PaymentSearch {
            keyword: filter.keyword(),
            originator_account_id: filter.originator_account_id,
            beneficiary_account_id: filter.beneficiary_account_id,
        };
        let result = self
            .store
            .search_payments(search, page)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to list payments"))?;

        tracing::info!(
            returned = result.items.len(),
            total = result.total_count,
            "Retrieved payments"
        );
        Ok(result.map(|payment| ListPayment::from(&payment)))
    }

    /// Create a payment.
    ///
    /// The request is validated first. Originator and beneficiary accounts
    /// are then matched by IBAN, BIC and account number and created when
    /// unknown; the payment row is inserted in the same transaction. The
    /// committed payment is reloaded with its accounts and returned.
    ///
    /// # Errors
    /// * `Validation` - the request breaks one or more field rules; nothing is written
    pub async fn create_payment(&self, request: &CreatePayment) -> Result<Payment> {
        let request = request.normalized();
        tracing::info!(
            reference_number = ?request.reference_number,
            "Creating payment"
        );

        if let Err(failure) = validate_request(&request) {
            metrics::VALIDATION_FAILURES_TOTAL
                .with_label_values(&["payment"])
                .inc();
            tracing::warn!(errors = ?failure.errors, "Payment validation failed");
            return Err(failure.into());
        }

        let mut tx = self.store.begin().await?;
        let payment_id = match write_payment(tx.as_mut(), &request).await {
            Ok(id) => {
                tx.commit().await?;
                id
            }
            Err(e) => {
                tracing::warn!(error = %e, "Payment creation failed, rolling back");
                rollback_quietly(tx).await;
                return Err(e);
            }
        };
        metrics::PAYMENTS_CREATED_TOTAL.inc();

        let payment = self.store.get_payment(payment_id).await?.ok_or_else(|| {
            Error::Internal(format!("payment {payment_id} missing after commit"))
        })?;

        tracing::info!(
            payment_id = payment.id,
            originator_account_id = payment.originator_account_id,
            beneficiary_account_id = payment.beneficiary_account_id,
            "Payment created"
        );
        Ok(payment)
    }
}

async fn write_payment(tx: &mut dyn StoreTransaction, request: &CreatePayment) -> Result<i32> {
    let (Some(originator), Some(beneficiary), Some(amount)) = (
        request.originator_account.as_ref(),
        request.beneficiary_account.as_ref(),
        request.amount.as_ref(),
    ) else {
        return Err(Error::InvalidArgument(
            "Payment accounts and amount are required.".to_string(),
        ));
    };

    let originator = find_or_create_account(tx, originator).await?;
    let beneficiary = find_or_create_account(tx, beneficiary).await?;

    let payment = NewPayment {
        originator_account_id: originator.id,
        beneficiary_account_id: beneficiary.id,
        amount: amount.clone(),
        date: request.date.unwrap_or_else(Utc::now),
        charges_bearer: request.charges_bearer.unwrap_or_default(),
        details: request.details_value(),
        reference_number: request.reference_number_value(),
    };
    tx.insert_payment(&payment).await
}
