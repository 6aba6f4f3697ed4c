//! Request validation
//!
//! Field rules are declared on the request types with `#[derive(Validate)]`.
//! This module holds the custom rule functions those derives reference and
//! flattens `validator`'s nested error tree into plain messages that can be
//! returned to API clients.

use std::borrow::Cow;

use heck::ToLowerCamelCase;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::constants;

/// A failed validation: a summary plus one message per broken rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub message: String,
    pub errors: Vec<String>,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.message, self.errors.join(" "))
    }
}

/// Validate a request and collect every broken rule.
///
/// Messages are prefixed with the lowerCamelCase path of the offending field
/// (`originatorAccount.address.countryCode: ...`) and sorted so the output is
/// stable across runs.
pub fn validate_request<T: Validate>(value: &T) -> Result<(), ValidationFailure> {
    match value.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let mut messages = Vec::new();
            collect_messages(&errors, "", &mut messages);
            messages.sort();
            messages.dedup();
            Err(ValidationFailure {
                message: "Validation failed.".to_string(),
                errors: messages,
            })
        }
    }
}

fn collect_messages(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = join_path(prefix, &field.to_string());
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    out.push(format!("{path}: {}", describe(error)));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(nested, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    let field = field.to_lower_camel_case();
    if prefix.is_empty() {
        field
    } else {
        format!("{prefix}.{field}")
    }
}

fn describe(error: &ValidationError) -> Cow<'static, str> {
    match &error.message {
        Some(message) => message.clone(),
        None => Cow::Owned(format!("failed rule '{}'", error.code)),
    }
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Rejects empty and whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule_error("not_blank", "Value cannot be null or empty."));
    }
    Ok(())
}

/// Exactly two ASCII letters (ISO 3166-1 alpha-2).
pub fn country_code(value: &str) -> Result<(), ValidationError> {
    if is_letter_code(value, constants::address::LENGTH_OF_COUNTRY_CODE) {
        Ok(())
    } else {
        Err(rule_error(
            "country_code",
            "Address country code must be 2 letters.",
        ))
    }
}

/// Exactly three ASCII letters (ISO 4217 alphabetic code).
pub fn currency_code(value: &str) -> Result<(), ValidationError> {
    if is_letter_code(value, constants::payment::LENGTH_OF_CURRENCY) {
        Ok(())
    } else {
        Err(rule_error("currency_code", "Money currency must be 3 letters."))
    }
}

/// Monetary amounts must be strictly positive.
pub fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        Ok(())
    } else {
        Err(rule_error(
            "positive_amount",
            "Money value must be greater than zero.",
        ))
    }
}

fn is_letter_code(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_alphabetic())
}
