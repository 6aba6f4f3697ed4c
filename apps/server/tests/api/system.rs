//! Health, service info, metrics and cross-cutting response headers.

use crate::support::{assert_status, with_test_app, with_test_app_with_config, PaymentBuilder};
use axum::http::{Method, StatusCode};

#[tokio::test]
async fn health_reports_service_name() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app.get_json("/health").await?;
            assert_status(status, StatusCode::OK, "health");
            assert_eq!(body["status"], "ok");
            assert_eq!(body["service"], "finatech-server");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn root_reports_version() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app.get_json("/").await?;
            assert_status(status, StatusCode::OK, "root");
            assert_eq!(body["status"], "running");
            assert!(body["version"].is_string());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn responses_carry_request_and_correlation_ids() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (_, headers, _) = app
                .request_with_extra_headers(
                    Method::GET,
                    "/health",
                    None,
                    &[("x-request-id", "client-123")],
                )
                .await?;

            let request_id = headers
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            assert!(!request_id.is_empty());
            assert_ne!(request_id, "client-123");
            assert_eq!(
                headers.get("x-correlation-id").and_then(|v| v.to_str().ok()),
                Some("client-123")
            );
            assert_eq!(
                headers
                    .get("x-content-type-options")
                    .and_then(|v| v.to_str().ok()),
                Some("nosniff")
            );
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn banking_responses_are_not_cacheable() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, headers, _) = app
                .request_with_extra_headers(
                    Method::GET,
                    "/accounts",
                    None,
                    &[("x-forwarded-proto", "https")],
                )
                .await?;
            assert_status(status, StatusCode::OK, "list accounts");
            assert_eq!(
                headers.get("cache-control").and_then(|v| v.to_str().ok()),
                Some("no-store")
            );
            assert_eq!(
                headers
                    .get("strict-transport-security")
                    .and_then(|v| v.to_str().ok()),
                Some("max-age=31536000; includeSubDomains")
            );

            let (_, headers, _) = app.request(Method::GET, "/accounts", None).await?;
            assert!(headers.get("strict-transport-security").is_none());

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn correlation_header_takes_precedence_and_bad_ids_are_dropped() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (_, headers, _) = app
                .request_with_extra_headers(
                    Method::GET,
                    "/payments",
                    None,
                    &[
                        ("x-request-id", "gateway-7"),
                        ("x-correlation-id", "order-42"),
                    ],
                )
                .await?;
            assert_eq!(
                headers.get("x-correlation-id").and_then(|v| v.to_str().ok()),
                Some("order-42")
            );

            let oversized = "c".repeat(200);
            let (_, headers, _) = app
                .request_with_extra_headers(
                    Method::GET,
                    "/payments",
                    None,
                    &[("x-correlation-id", oversized.as_str())],
                )
                .await?;
            assert!(headers.get("x-correlation-id").is_none());
            assert!(headers.get("x-request-id").is_some());

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn metrics_expose_payment_counters() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            app.post_json("/payments", &PaymentBuilder::new().build())
                .await?;

            let (status, _, body) = app.request(Method::GET, "/metrics", None).await?;
            assert_status(status, StatusCode::OK, "metrics");
            let text = String::from_utf8(body.to_vec())?;
            assert!(text.contains("finatech_payments_created_total"));
            assert!(text.contains("finatech_http_requests_total"));
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn oversized_bodies_are_rejected() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| config.server.max_request_body_size = 64,
        |app| {
            Box::pin(async move {
                let (status, _, _) = app
                    .post_json("/payments", &PaymentBuilder::new().build())
                    .await?;
                assert!(
                    status == StatusCode::PAYLOAD_TOO_LARGE || status == StatusCode::BAD_REQUEST,
                    "unexpected status {status}"
                );
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn unknown_route_is_not_found() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _, _) = app.request(Method::GET, "/transfers", None).await?;
            assert_status(status, StatusCode::NOT_FOUND, "unknown route");
            Ok(())
        })
    })
    .await
}
