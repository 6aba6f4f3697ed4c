//! Account endpoints (GET /accounts, GET /accounts/:id, POST /accounts)

use crate::support::{
    assert_page, assert_problem, assert_status, assert_validation_error, id_of, location,
    with_test_app, AccountBuilder,
};
use axum::http::StatusCode;

#[tokio::test]
async fn create_and_read_account() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let body = AccountBuilder::new("Alice")
                .iban("gb12 fina 1234 5678 91")
                .city("London")
                .build();
            let (status, headers, created) = app.post_json("/accounts", &body).await?;
            assert_status(status, StatusCode::CREATED, "create account");

            let id = id_of(&created)?;
            assert_eq!(location(&headers), Some(format!("/accounts/{id}").as_str()));
            assert_eq!(created["iban"], "GB12FINA1234567891");

            let (status, read) = app.get_json(&format!("/accounts/{id}")).await?;
            assert_status(status, StatusCode::OK, "read account");
            assert_eq!(read["name"], "Alice");
            assert_eq!(read["address"]["city"], "London");
            assert_eq!(read["addressId"], read["address"]["id"]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn duplicate_account_conflicts() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let body = AccountBuilder::new("Alice").build();
            let (status, _, _) = app.post_json("/accounts", &body).await?;
            assert_status(status, StatusCode::CREATED, "first account");

            let (status, _, conflict) = app.post_json("/accounts", &body).await?;
            assert_status(status, StatusCode::CONFLICT, "duplicate account");
            assert_problem(
                &conflict,
                "An account with this IBAN, BIC and account number already exists.",
            );

            // A different account number is a different account.
            let other = AccountBuilder::new("Alice").account_number("999").build();
            let (status, _, _) = app.post_json("/accounts", &other).await?;
            assert_status(status, StatusCode::CREATED, "second account number");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn account_without_address_fails_validation() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let body = AccountBuilder::new("Alice").without_address().build();
            let (status, _, errors) = app.post_json("/accounts", &body).await?;
            assert_status(status, StatusCode::BAD_REQUEST, "missing address");
            assert_validation_error(&errors, "address: Account address cannot be null.")?;
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn read_missing_account_returns_404() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app.get_json("/accounts/424242").await?;
            assert_status(status, StatusCode::NOT_FOUND, "missing account");
            assert_problem(&body, "Account with id 424242 was not found.");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn listing_matches_address_fields() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let london = AccountBuilder::new("Alice").city("London").build();
            let paris = AccountBuilder::new("Bob")
                .iban("FR7630006000011234567890189")
                .account_number("222")
                .city("Paris")
                .country_code("FR")
                .build();
            app.post_json("/accounts", &london).await?;
            app.post_json("/accounts", &paris).await?;

            let (_, all) = app.get_json("/accounts").await?;
            assert_page(&all, 2, 2)?;

            let (_, by_city) = app.get_json("/accounts?keywords=Paris").await?;
            let items = assert_page(&by_city, 1, 1)?;
            assert_eq!(items[0]["name"], "Bob");

            let (_, by_iban) = app.get_json("/accounts?keywords=GB12").await?;
            let items = assert_page(&by_iban, 1, 1)?;
            assert_eq!(items[0]["name"], "Alice");

            let (_, paged) = app.get_json("/accounts?SkipCount=1&MaxResultCount=5").await?;
            let items = assert_page(&paged, 2, 1)?;
            assert_eq!(items[0]["name"], "Bob");
            Ok(())
        })
    })
    .await
}
