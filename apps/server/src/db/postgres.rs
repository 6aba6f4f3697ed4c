//! PostgreSQL storage backend

use std::collections::HashMap;

use async_trait::async_trait;
use finatech_models::{
    Account, AccountIdentity, Address, Bank, ChargesBearer, CreateAccount, CreateAddress,
    CreateBank, Money, PageRequest, PagedResult, Payment,
};
use sqlx::{postgres::PgRow, PgConnection, PgPool, Postgres, Row, Transaction};

use super::traits::{
    BankingStore, NewPayment, PaymentSearch, StoreTransaction, ACCOUNT_CONFLICT, BANK_CONFLICT,
};
use crate::{metrics::DB_QUERY_ERRORS_TOTAL, Error, Result};

const ACCOUNT_COLUMNS: &str = r#"
    a.id, a.address_id, a.name, a.iban, a.bic, a.account_number,
    ad.address_line1, ad.address_line2, ad.address_line3, ad.city, ad.post_code, ad.country_code
"#;

const PAYMENT_COLUMNS: &str = r#"
    p.id, p.originator_account_id, p.beneficiary_account_id, p.amount_value, p.amount_currency,
    p.payment_date, p.charges_bearer, p.details, p.reference_number
"#;

/// Matches `accounts a JOIN addresses ad`; `$1` is the keyword or NULL.
const ACCOUNT_KEYWORD_FILTER: &str = r#"
    ($1::text IS NULL
        OR strpos(a.name, $1) > 0
        OR strpos(a.iban, $1) > 0
        OR strpos(a.account_number, $1) > 0
        OR strpos(ad.address_line1, $1) > 0
        OR strpos(ad.address_line2, $1) > 0
        OR strpos(ad.address_line3, $1) > 0
        OR strpos(ad.city, $1) > 0
        OR strpos(ad.post_code, $1) > 0
        OR strpos(ad.country_code, $1) > 0)
"#;

const PAYMENT_FILTER: &str = r#"
    ($1::text IS NULL OR strpos(p.reference_number, $1) > 0 OR strpos(p.details, $1) > 0)
    AND ($2::int IS NULL OR p.originator_account_id = $2)
    AND ($3::int IS NULL OR p.beneficiary_account_id = $3)
"#;

const BANK_FILTER: &str = "($1::text IS NULL OR strpos(b.name, $1) > 0 OR strpos(b.bic, $1) > 0)";

/// Storage backed by a PostgreSQL pool. Schema comes from `migrations/`.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_accounts(&self, ids: &[i32]) -> Result<HashMap<i32, Account>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS}
             FROM accounts a JOIN addresses ad ON ad.id = a.address_id
             WHERE a.id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("load_accounts", e))?;

        Ok(rows
            .iter()
            .map(account_from_row)
            .map(|account| (account.id, account))
            .collect())
    }

    async fn attach_accounts(&self, payments: Vec<Payment>) -> Result<Vec<Payment>> {
        let mut ids: Vec<i32> = payments
            .iter()
            .flat_map(|p| [p.originator_account_id, p.beneficiary_account_id])
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let accounts = self.load_accounts(&ids).await?;
        Ok(payments
            .into_iter()
            .map(|p| Payment {
                originator_account: accounts.get(&p.originator_account_id).cloned(),
                beneficiary_account: accounts.get(&p.beneficiary_account_id).cloned(),
                ..p
            })
            .collect())
    }

    async fn attach_bank_accounts(&self, banks: Vec<Bank>) -> Result<Vec<Bank>> {
        if banks.is_empty() {
            return Ok(banks);
        }

        let bics: Vec<String> = banks.iter().map(|b| b.bic.clone()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS}
             FROM accounts a JOIN addresses ad ON ad.id = a.address_id
             WHERE a.bic = ANY($1)
             ORDER BY a.id"
        ))
        .bind(&bics)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("load_bank_accounts", e))?;

        let mut by_bic: HashMap<String, Vec<Account>> = HashMap::new();
        for account in rows.iter().map(account_from_row) {
            by_bic.entry(account.bic.clone()).or_default().push(account);
        }

        Ok(banks
            .into_iter()
            .map(|bank| Bank {
                accounts: by_bic.get(&bank.bic).cloned().unwrap_or_default(),
                ..bank
            })
            .collect())
    }
}

#[async_trait]
impl BankingStore for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin", e))?;
        Ok(Box::new(PostgresTransaction { tx }))
    }

    async fn get_payment(&self, id: i32) -> Result<Option<Payment>> {
        let row = sqlx::query(&format!("SELECT {PAYMENT_COLUMNS} FROM payments p WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("get_payment", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payment = payment_from_row(&row)?;
        Ok(self.attach_accounts(vec![payment]).await?.into_iter().next())
    }

    async fn search_payments(
        &self,
        search: PaymentSearch<'_>,
        page: PageRequest,
    ) -> Result<PagedResult<Payment>> {
        let total_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM payments p WHERE {PAYMENT_FILTER}"
        ))
        .bind(search.keyword)
        .bind(search.originator_account_id)
        .bind(search.beneficiary_account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("count_payments", e))?;

        let rows = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments p
             WHERE {PAYMENT_FILTER}
             ORDER BY p.id
             LIMIT $4 OFFSET $5"
        ))
        .bind(search.keyword)
        .bind(search.originator_account_id)
        .bind(search.beneficiary_account_id)
        .bind(page.take)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("search_payments", e))?;

        let payments = rows
            .iter()
            .map(payment_from_row)
            .collect::<Result<Vec<_>>>()?;
        let items = self.attach_accounts(payments).await?;
        Ok(PagedResult::new(items, total_count))
    }

    async fn get_account(&self, id: i32) -> Result<Option<Account>> {
        Ok(self.load_accounts(&[id]).await?.remove(&id))
    }

    async fn search_accounts(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
    ) -> Result<PagedResult<Account>> {
        let total_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM accounts a JOIN addresses ad ON ad.id = a.address_id
             WHERE {ACCOUNT_KEYWORD_FILTER}"
        ))
        .bind(keyword)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("count_accounts", e))?;

        let rows = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS}
             FROM accounts a JOIN addresses ad ON ad.id = a.address_id
             WHERE {ACCOUNT_KEYWORD_FILTER}
             ORDER BY a.id
             LIMIT $2 OFFSET $3"
        ))
        .bind(keyword)
        .bind(page.take)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("search_accounts", e))?;

        Ok(PagedResult::new(
            rows.iter().map(account_from_row).collect(),
            total_count,
        ))
    }

    async fn get_bank(&self, id: i32) -> Result<Option<Bank>> {
        let row = sqlx::query("SELECT b.id, b.name, b.bic FROM banks b WHERE b.id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("get_bank", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self
            .attach_bank_accounts(vec![bank_from_row(&row)])
            .await?
            .into_iter()
            .next())
    }

    async fn search_banks(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
    ) -> Result<PagedResult<Bank>> {
        let total_count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM banks b WHERE {BANK_FILTER}"))
                .bind(keyword)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("count_banks", e))?;

        let rows = sqlx::query(&format!(
            "SELECT b.id, b.name, b.bic FROM banks b
             WHERE {BANK_FILTER}
             ORDER BY b.id
             LIMIT $2 OFFSET $3"
        ))
        .bind(keyword)
        .bind(page.take)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("search_banks", e))?;

        let banks = rows.iter().map(bank_from_row).collect();
        Ok(PagedResult::new(
            self.attach_bank_accounts(banks).await?,
            total_count,
        ))
    }
}

/// A write transaction; rolled back by sqlx if dropped uncommitted.
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PostgresTransaction {
    fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }
}

#[async_trait]
impl StoreTransaction for PostgresTransaction {
    async fn find_account_by_identity(
        &mut self,
        identity: &AccountIdentity,
    ) -> Result<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS}
             FROM accounts a JOIN addresses ad ON ad.id = a.address_id
             WHERE a.iban = $1 AND a.bic = $2 AND a.account_number = $3"
        ))
        .bind(&identity.iban)
        .bind(&identity.bic)
        .bind(&identity.account_number)
        .fetch_optional(self.conn())
        .await
        .map_err(|e| db_error("find_account_by_identity", e))?;

        Ok(row.as_ref().map(account_from_row))
    }

    async fn insert_address(&mut self, address: &CreateAddress) -> Result<Address> {
        let row = sqlx::query(
            r#"
            INSERT INTO addresses
                (address_line1, address_line2, address_line3, city, post_code, country_code)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&address.address_line1)
        .bind(&address.address_line2)
        .bind(&address.address_line3)
        .bind(&address.city)
        .bind(&address.post_code)
        .bind(&address.country_code)
        .fetch_one(self.conn())
        .await
        .map_err(|e| db_error("insert_address", e))?;

        Ok(Address {
            id: row.get("id"),
            address_line1: address.address_line1.clone(),
            address_line2: address.address_line2.clone(),
            address_line3: address.address_line3.clone(),
            city: address.city.clone(),
            post_code: address.post_code.clone(),
            country_code: address.country_code.clone(),
        })
    }

    async fn insert_account(
        &mut self,
        address_id: i32,
        account: &CreateAccount,
    ) -> Result<Account> {
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (address_id, name, iban, bic, account_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(address_id)
        .bind(&account.name)
        .bind(&account.iban)
        .bind(&account.bic)
        .bind(&account.account_number)
        .fetch_one(self.conn())
        .await
        .map_err(|e| conflict_or_db_error("insert_account", e, ACCOUNT_CONFLICT))?;

        Ok(Account {
            id: row.get("id"),
            address_id,
            name: account.name.clone(),
            iban: account.iban.clone(),
            bic: account.bic.clone(),
            account_number: account.account_number.clone(),
            address: None,
        })
    }

    async fn insert_account_if_absent(
        &mut self,
        address: &CreateAddress,
        account: &CreateAccount,
    ) -> Result<Option<Account>> {
        let address = self.insert_address(address).await?;

        // ON CONFLICT blocks on an uncommitted row with the same identity and
        // skips the insert once that row commits.
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (address_id, name, iban, bic, account_number)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (iban, bic, account_number) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(address.id)
        .bind(&account.name)
        .bind(&account.iban)
        .bind(&account.bic)
        .bind(&account.account_number)
        .fetch_optional(self.conn())
        .await
        .map_err(|e| db_error("insert_account_if_absent", e))?;

        let Some(row) = row else {
            sqlx::query("DELETE FROM addresses WHERE id = $1")
                .bind(address.id)
                .execute(self.conn())
                .await
                .map_err(|e| db_error("insert_account_if_absent", e))?;
            return Ok(None);
        };

        Ok(Some(Account {
            id: row.get("id"),
            address_id: address.id,
            name: account.name.clone(),
            iban: account.iban.clone(),
            bic: account.bic.clone(),
            account_number: account.account_number.clone(),
            address: Some(address),
        }))
    }

    async fn find_bank_by_bic(&mut self, bic: &str) -> Result<Option<Bank>> {
        let row = sqlx::query("SELECT b.id, b.name, b.bic FROM banks b WHERE b.bic = $1")
            .bind(bic)
            .fetch_optional(self.conn())
            .await
            .map_err(|e| db_error("find_bank_by_bic", e))?;

        Ok(row.as_ref().map(bank_from_row))
    }

    async fn insert_bank(&mut self, bank: &CreateBank) -> Result<Bank> {
        let row = sqlx::query("INSERT INTO banks (name, bic) VALUES ($1, $2) RETURNING id")
            .bind(&bank.name)
            .bind(&bank.bic)
            .fetch_one(self.conn())
            .await
            .map_err(|e| conflict_or_db_error("insert_bank", e, BANK_CONFLICT))?;

        Ok(Bank {
            id: row.get("id"),
            name: bank.name.clone(),
            bic: bank.bic.clone(),
            accounts: Vec::new(),
        })
    }

    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<i32> {
        let row = sqlx::query(
            r#"
            INSERT INTO payments (
                originator_account_id, beneficiary_account_id,
                amount_value, amount_currency, payment_date, charges_bearer,
                details, reference_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(payment.originator_account_id)
        .bind(payment.beneficiary_account_id)
        .bind(payment.amount.value)
        .bind(&payment.amount.currency)
        .bind(payment.date)
        .bind(payment.charges_bearer.as_i16())
        .bind(&payment.details)
        .bind(&payment.reference_number)
        .fetch_one(self.conn())
        .await
        .map_err(|e| db_error("insert_payment", e))?;

        Ok(row.get("id"))
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(|e| db_error("commit", e))
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(|e| db_error("rollback", e))
    }
}

fn account_from_row(row: &PgRow) -> Account {
    let address_id: i32 = row.get("address_id");
    Account {
        id: row.get("id"),
        address_id,
        name: row.get("name"),
        iban: row.get("iban"),
        bic: row.get("bic"),
        account_number: row.get("account_number"),
        address: Some(Address {
            id: address_id,
            address_line1: row.get("address_line1"),
            address_line2: row.get("address_line2"),
            address_line3: row.get("address_line3"),
            city: row.get("city"),
            post_code: row.get("post_code"),
            country_code: row.get("country_code"),
        }),
    }
}

fn payment_from_row(row: &PgRow) -> Result<Payment> {
    Ok(Payment {
        id: row.get("id"),
        originator_account_id: row.get("originator_account_id"),
        beneficiary_account_id: row.get("beneficiary_account_id"),
        amount: Money {
            value: row.get("amount_value"),
            currency: row.get("amount_currency"),
        },
        date: row.get("payment_date"),
        charges_bearer: ChargesBearer::try_from_i16(row.get("charges_bearer"))?,
        details: row.get("details"),
        reference_number: row.get("reference_number"),
        originator_account: None,
        beneficiary_account: None,
    })
}

fn bank_from_row(row: &PgRow) -> Bank {
    Bank {
        id: row.get("id"),
        name: row.get("name"),
        bic: row.get("bic"),
        accounts: Vec::new(),
    }
}

fn db_error(operation: &str, err: sqlx::Error) -> Error {
    DB_QUERY_ERRORS_TOTAL.with_label_values(&[operation]).inc();
    tracing::error!(operation, error = %err, "Database query failed");
    Error::Database(err)
}

/// SQLSTATE 23505 (unique_violation) becomes a conflict, anything else a database error.
fn conflict_or_db_error(operation: &str, err: sqlx::Error, conflict: &str) -> Error {
    if is_unique_violation(&err) {
        tracing::warn!(operation, "Unique constraint violated");
        return Error::Conflict(conflict.to_string());
    }
    db_error(operation, err)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}
