//! Bank endpoints (GET /banks, GET /banks/:id, POST /banks)

use crate::support::{
    assert_page, assert_problem, assert_status, assert_validation_error, bank_body, id_of,
    location, with_test_app, AccountBuilder,
};
use axum::http::StatusCode;

#[tokio::test]
async fn bank_lists_accounts_under_its_bic() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            app.post_json("/accounts", &AccountBuilder::new("Alice").bic("FINAGB2L").build())
                .await?;
            app.post_json(
                "/accounts",
                &AccountBuilder::new("Bob")
                    .bic("OTHRDEFF")
                    .account_number("222")
                    .build(),
            )
            .await?;

            let (status, headers, created) =
                app.post_json("/banks", &bank_body("Fina Bank", "finagb2l")).await?;
            assert_status(status, StatusCode::CREATED, "create bank");
            let id = id_of(&created)?;
            assert_eq!(location(&headers), Some(format!("/banks/{id}").as_str()));
            assert_eq!(created["bic"], "FINAGB2L");

            let (status, read) = app.get_json(&format!("/banks/{id}")).await?;
            assert_status(status, StatusCode::OK, "read bank");
            let accounts = read["accounts"].as_array().cloned().unwrap_or_default();
            assert_eq!(accounts.len(), 1);
            assert_eq!(accounts[0]["name"], "Alice");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn duplicate_bic_conflicts() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            app.post_json("/banks", &bank_body("Fina Bank", "FINAGB2L")).await?;
            let (status, _, body) = app
                .post_json("/banks", &bank_body("Another Bank", "FINAGB2L"))
                .await?;
            assert_status(status, StatusCode::CONFLICT, "duplicate bic");
            assert_problem(&body, "A bank with this BIC already exists.");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn invalid_bank_fails_validation() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _, body) = app
                .post_json("/banks", &bank_body("", "TOOLONGBIC123"))
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "invalid bank");
            assert_validation_error(&body, "name: Bank name cannot be null or empty.")?;
            assert_validation_error(&body, "bic: Bank BIC cannot exceed 11 characters.")?;
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn listing_and_missing_bank() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            app.post_json("/banks", &bank_body("Fina Bank", "FINAGB2L")).await?;
            app.post_json("/banks", &bank_body("Other Bank", "OTHRDEFF")).await?;

            let (_, by_name) = app.get_json("/banks?keywords=Other").await?;
            let items = assert_page(&by_name, 1, 1)?;
            assert_eq!(items[0]["bic"], "OTHRDEFF");

            let (_, all) = app.get_json("/banks?maxResultCount=1").await?;
            assert_page(&all, 2, 1)?;

            let (status, body) = app.get_json("/banks/777777").await?;
            assert_status(status, StatusCode::NOT_FOUND, "missing bank");
            assert_problem(&body, "Bank with id 777777 was not found.");
            Ok(())
        })
    })
    .await
}
