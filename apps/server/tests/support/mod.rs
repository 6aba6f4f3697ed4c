pub mod assertions;
pub mod builders;

use anyhow::Context as _;
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use finatech::{
    api::create_router,
    config::StorageBackend,
    state::{AppState, AppStateOptions},
    Config,
};
use futures::FutureExt as _;
use sqlx::Connection as _;
use tower::ServiceExt as _;
use uuid::Uuid;

pub use assertions::*;
pub use builders::*;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    /// Per-test schema and the URL used to drop it; postgres backend only.
    schema: Option<(String, String)>,
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        Self::new_with_config(|_| {}).await
    }

    pub async fn new_with_config(configure: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        let shared = shared::shared().await?;
        let mut config = shared.base_config.clone();
        configure(&mut config);

        let mut schema = None;
        if config.database.backend == StorageBackend::Postgres {
            let admin_database_url = config.database.url.clone();
            let name = format!("test_{}", Uuid::new_v4().simple());

            let mut admin_conn = sqlx::PgConnection::connect(&admin_database_url)
                .await
                .context("connect admin db for schema create")?;
            sqlx::query(&format!(r#"CREATE SCHEMA "{name}""#))
                .execute(&mut admin_conn)
                .await
                .context("create test schema")?;

            config.database.url = with_search_path(&admin_database_url, &name);
            // Each test opens its own pool; keep them small.
            config.database.pool_min_size = 0;
            config.database.pool_max_size = 2;
            config.database.lock_timeout_seconds = 5;
            schema = Some((name, admin_database_url));
        }

        let state = AppState::new_with_options(
            config,
            AppStateOptions {
                run_migrations: Some(true),
                backend: None,
            },
        )
        .await
        .context("initialize AppState")?;

        let router = create_router(state.clone());

        Ok(Self {
            router,
            state,
            schema,
        })
    }

    pub async fn cleanup(self) -> anyhow::Result<()> {
        if let Some(pool) = &self.state.db_pool {
            pool.close().await;
        }

        if let Some((name, admin_database_url)) = &self.schema {
            let mut admin_conn = sqlx::PgConnection::connect(admin_database_url)
                .await
                .context("connect admin db for schema drop")?;
            sqlx::query(&format!(r#"DROP SCHEMA "{name}" CASCADE"#))
                .execute(&mut admin_conn)
                .await
                .context("drop test schema")?;
        }

        Ok(())
    }

    pub async fn request(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Bytes>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        self.request_with_extra_headers(method, path_and_query, body, &[])
            .await
    }

    pub async fn request_with_extra_headers(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Bytes>,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let mut request = Request::builder()
            .method(method)
            .uri(path_and_query)
            .header("host", "example.org")
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .body(match body {
                Some(bytes) => Body::from(bytes),
                None => Body::empty(),
            })
            .context("build request")?;

        for (name, value) in extra_headers {
            request.headers_mut().insert(
                name.parse::<HeaderName>().context("parse header name")?,
                value.parse::<HeaderValue>().context("parse header value")?,
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;

        Ok((status, headers, body))
    }

    /// POST a JSON body and parse the JSON response.
    pub async fn post_json(
        &self,
        path: &str,
        value: &serde_json::Value,
    ) -> anyhow::Result<(StatusCode, HeaderMap, serde_json::Value)> {
        let (status, headers, body) = self
            .request(Method::POST, path, Some(to_json_body(value)?))
            .await?;
        Ok((status, headers, parse_json(&body)?))
    }

    /// GET a path and parse the JSON response.
    pub async fn get_json(&self, path: &str) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let (status, _headers, body) = self.request(Method::GET, path, None).await?;
        Ok((status, parse_json(&body)?))
    }
}

pub async fn with_test_app<F>(f: F) -> anyhow::Result<()>
where
    F: for<'a> FnOnce(
        &'a TestApp,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = anyhow::Result<()>> + 'a>,
    >,
{
    with_test_app_with_config(|_| {}, f).await
}

pub async fn with_test_app_with_config<C, F>(configure: C, f: F) -> anyhow::Result<()>
where
    C: FnOnce(&mut Config),
    F: for<'a> FnOnce(
        &'a TestApp,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = anyhow::Result<()>> + 'a>,
    >,
{
    let app = TestApp::new_with_config(configure).await?;

    let result = std::panic::AssertUnwindSafe(f(&app)).catch_unwind().await;
    let cleanup_result = app.cleanup().await;

    if let Err(e) = cleanup_result {
        eprintln!("test schema cleanup failed: {e:?}");
    }

    match result {
        Ok(r) => r,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

fn with_search_path(database_url: &str, schema: &str) -> String {
    let separator = if database_url.contains('?') { '&' } else { '?' };
    format!(
        "{database_url}{separator}options={}",
        urlencoding::encode(&format!("-c search_path={schema}"))
    )
}
