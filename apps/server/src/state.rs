//! Shared application state
//!
//! Built once at startup and cloned into every request handler.

use std::{sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    config::{Config, DatabaseConfig, StorageBackend},
    db::{BankingStore, MemoryStore, PostgresStore},
    services::{AccountService, BankService, PaymentService},
    Result,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn BankingStore>,
    pub payment_service: Arc<PaymentService>,
    pub account_service: Arc<AccountService>,
    pub bank_service: Arc<BankService>,
    /// Present only on the postgres backend.
    pub db_pool: Option<PgPool>,
}

/// Startup switches that override the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct AppStateOptions {
    pub run_migrations: Option<bool>,
    pub backend: Option<StorageBackend>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        Self::new_with_options(config, AppStateOptions::default()).await
    }

    pub async fn new_with_options(config: Config, options: AppStateOptions) -> Result<Self> {
        let backend = options.backend.unwrap_or(config.database.backend);

        let (store, db_pool): (Arc<dyn BankingStore>, Option<PgPool>) = match backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on shutdown");
                (Arc::new(MemoryStore::new()), None)
            }
            StorageBackend::Postgres => {
                let pool = connect_pool(&config.database).await?;

                let run_migrations = options
                    .run_migrations
                    .unwrap_or(config.database.run_migrations);
                if run_migrations {
                    tracing::info!("Running database migrations");
                    sqlx::migrate!("./migrations").run(&pool).await?;
                    tracing::info!("Database migrations complete");
                }

                (Arc::new(PostgresStore::new(pool.clone())), Some(pool))
            }
        };

        Ok(Self::from_store(config, store, db_pool))
    }

    /// Wire services over an existing store.
    pub fn from_store(config: Config, store: Arc<dyn BankingStore>, db_pool: Option<PgPool>) -> Self {
        let paging = config.paging.defaults();

        Self {
            payment_service: Arc::new(PaymentService::new(store.clone(), paging)),
            account_service: Arc::new(AccountService::new(store.clone(), paging)),
            bank_service: Arc::new(BankService::new(store.clone(), paging)),
            config: Arc::new(config),
            store,
            db_pool,
        }
    }
}

async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let statement_timeout = format!("{}s", config.statement_timeout_seconds);
    let lock_timeout = format!("{}s", config.lock_timeout_seconds);

    let pool = PgPoolOptions::new()
        .min_connections(config.pool_min_size)
        .max_connections(config.pool_max_size)
        .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds))
        .after_connect(move |conn, _meta| {
            let statement_timeout = statement_timeout.clone();
            let lock_timeout = lock_timeout.clone();
            Box::pin(async move {
                sqlx::query("SELECT set_config('statement_timeout', $1, false)")
                    .bind(statement_timeout)
                    .execute(&mut *conn)
                    .await?;
                sqlx::query("SELECT set_config('lock_timeout', $1, false)")
                    .bind(lock_timeout)
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await?;

    tracing::info!(
        min_connections = config.pool_min_size,
        max_connections = config.pool_max_size,
        "PostgreSQL connection pool initialized"
    );
    Ok(pool)
}
