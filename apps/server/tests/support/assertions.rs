use anyhow::Context as _;
use axum::http::{HeaderMap, StatusCode};
use serde_json::Value;

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "{context}: unexpected status");
}

/// Assert a paged listing and return its items.
pub fn assert_page<'a>(page: &'a Value, total_count: i64, item_count: usize) -> anyhow::Result<&'a Vec<Value>> {
    assert_eq!(
        page["totalCount"].as_i64(),
        Some(total_count),
        "unexpected totalCount in {page}"
    );
    let items = page["items"].as_array().context("items is array")?;
    assert_eq!(items.len(), item_count, "unexpected item count in {page}");
    Ok(items)
}

/// Assert an error body carrying `problemDetails`.
pub fn assert_problem(body: &Value, expected: &str) {
    assert_eq!(
        body["problemDetails"].as_str(),
        Some(expected),
        "unexpected problemDetails in {body}"
    );
}

/// Assert a validation error body lists the given message.
pub fn assert_validation_error(body: &Value, expected: &str) -> anyhow::Result<()> {
    assert_problem(body, "Validation failed.");
    let errors = body["errors"].as_array().context("errors is array")?;
    assert!(
        errors.iter().any(|e| e.as_str() == Some(expected)),
        "expected validation error {expected:?} in {errors:?}"
    );
    Ok(())
}

pub fn location(headers: &HeaderMap) -> Option<&str> {
    headers.get("location").and_then(|v| v.to_str().ok())
}

pub fn id_of(value: &Value) -> anyhow::Result<i64> {
    value["id"].as_i64().context("id is integer")
}
