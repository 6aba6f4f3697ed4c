//! Payments between two accounts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Serialize};
use validator::Validate;

use crate::{
    account::{Account, CreateAccount},
    address::non_empty,
    constants,
    error::{Error, Result},
};

/// An amount of money in a given currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    #[serde(default)]
    #[validate(custom(function = "crate::validation::positive_amount"))]
    pub value: Decimal,

    #[serde(default)]
    #[validate(custom(function = "crate::validation::currency_code"))]
    pub currency: String,
}

impl Money {
    pub fn new(value: Decimal, currency: impl Into<String>) -> Self {
        Self {
            value,
            currency: currency.into(),
        }
    }
}

/// Which party pays the transaction fees.
///
/// Serialised by variant name. Deserialisation takes either the name or the
/// numeric code (`0` Originator, `1` Beneficiary, `2` Shared) that older
/// clients send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ChargesBearer {
    /// OUR: the originator pays all charges.
    Originator,
    /// BEN: the beneficiary pays all charges.
    Beneficiary,
    /// SHA: charges are split.
    #[default]
    Shared,
}

impl ChargesBearer {
    /// Database representation.
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::Originator => 0,
            Self::Beneficiary => 1,
            Self::Shared => 2,
        }
    }

    pub fn try_from_i16(code: i16) -> Result<Self> {
        match code {
            0 => Ok(Self::Originator),
            1 => Ok(Self::Beneficiary),
            2 => Ok(Self::Shared),
            other => Err(Error::UnknownChargesBearer(other)),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Originator => "Originator",
            Self::Beneficiary => "Beneficiary",
            Self::Shared => "Shared",
        }
    }
}

impl std::fmt::Display for ChargesBearer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const CHARGES_BEARER_NAMES: &[&str] = &["Originator", "Beneficiary", "Shared"];

impl<'de> Deserialize<'de> for ChargesBearer {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(ChargesBearerVisitor)
    }
}

struct ChargesBearerVisitor;

impl ChargesBearerVisitor {
    fn from_code<E: de::Error>(code: i64) -> std::result::Result<ChargesBearer, E> {
        i16::try_from(code)
            .ok()
            .and_then(|code| ChargesBearer::try_from_i16(code).ok())
            .ok_or_else(|| E::invalid_value(de::Unexpected::Signed(code), &"0, 1 or 2"))
    }
}

impl<'de> de::Visitor<'de> for ChargesBearerVisitor {
    type Value = ChargesBearer;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a charges bearer name or its code 0, 1 or 2")
    }

    fn visit_i64<E: de::Error>(self, code: i64) -> std::result::Result<ChargesBearer, E> {
        Self::from_code(code)
    }

    fn visit_u64<E: de::Error>(self, code: u64) -> std::result::Result<ChargesBearer, E> {
        i64::try_from(code)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(code), &"0, 1 or 2"))
            .and_then(Self::from_code)
    }

    fn visit_str<E: de::Error>(self, name: &str) -> std::result::Result<ChargesBearer, E> {
        match name {
            "Originator" => Ok(ChargesBearer::Originator),
            "Beneficiary" => Ok(ChargesBearer::Beneficiary),
            "Shared" => Ok(ChargesBearer::Shared),
            other => Err(E::unknown_variant(other, CHARGES_BEARER_NAMES)),
        }
    }
}

/// A stored payment. The account fields are populated when the payment is
/// loaded with its parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i32,
    pub originator_account_id: i32,
    pub beneficiary_account_id: i32,
    pub amount: Money,
    pub date: DateTime<Utc>,
    pub charges_bearer: ChargesBearer,
    pub details: Option<String>,
    pub reference_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub originator_account: Option<Account>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_account: Option<Account>,
}

/// Row shape used by payment listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPayment {
    pub id: i32,
    pub originator: String,
    pub beneficiary: String,
    pub amount: Money,
    pub date: DateTime<Utc>,
    pub charges_bearer: ChargesBearer,
    pub details: Option<String>,
    pub reference_number: Option<String>,
}

impl From<&Payment> for ListPayment {
    fn from(payment: &Payment) -> Self {
        let name_of = |account: &Option<Account>| {
            account
                .as_ref()
                .map(|a| a.name.clone())
                .unwrap_or_default()
        };
        Self {
            id: payment.id,
            originator: name_of(&payment.originator_account),
            beneficiary: name_of(&payment.beneficiary_account),
            amount: payment.amount.clone(),
            date: payment.date,
            charges_bearer: payment.charges_bearer,
            details: payment.details.clone(),
            reference_number: payment.reference_number.clone(),
        }
    }
}

/// Request body for creating a payment. Originator and beneficiary accounts
/// are matched against existing accounts and created when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayment {
    #[serde(default)]
    #[validate(
        required(message = "Payment originator account cannot be null."),
        nested
    )]
    pub originator_account: Option<CreateAccount>,

    #[serde(default)]
    #[validate(
        required(message = "Payment beneficiary account cannot be null."),
        nested
    )]
    pub beneficiary_account: Option<CreateAccount>,

    #[serde(default)]
    #[validate(required(message = "Payment amount cannot be null."), nested)]
    pub amount: Option<Money>,

    /// Defaults to the time of creation.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,

    /// Defaults to [`ChargesBearer::Shared`].
    #[serde(default)]
    pub charges_bearer: Option<ChargesBearer>,

    #[serde(default)]
    #[validate(
        required(message = "Payment details cannot be null or empty."),
        custom(
            function = "crate::validation::not_blank",
            message = "Payment details cannot be null or empty."
        ),
        length(
            max = constants::payment::MAX_LENGTH_OF_DETAILS,
            message = "Payment details cannot exceed 100 characters."
        )
    )]
    pub details: Option<String>,

    #[serde(default)]
    #[validate(
        required(message = "Payment reference number cannot be null or empty."),
        custom(
            function = "crate::validation::not_blank",
            message = "Payment reference number cannot be null or empty."
        ),
        length(
            max = constants::payment::MAX_LENGTH_OF_REFERENCE_NUMBER,
            message = "Payment reference number cannot exceed 50 characters."
        )
    )]
    pub reference_number: Option<String>,
}

impl CreatePayment {
    pub fn normalized(&self) -> Self {
        Self {
            originator_account: self
                .originator_account
                .as_ref()
                .map(CreateAccount::normalized),
            beneficiary_account: self
                .beneficiary_account
                .as_ref()
                .map(CreateAccount::normalized),
            amount: self.amount.as_ref().map(|m| Money {
                value: m.value,
                currency: m.currency.trim().to_ascii_uppercase(),
            }),
            date: self.date,
            charges_bearer: self.charges_bearer,
            details: self.details.as_ref().map(|d| d.trim().to_string()),
            reference_number: self.reference_number.as_ref().map(|r| r.trim().to_string()),
        }
    }

    /// Trimmed details, `None` when blank.
    pub fn details_value(&self) -> Option<String> {
        non_empty(&self.details)
    }

    /// Trimmed reference number, `None` when blank.
    pub fn reference_number_value(&self) -> Option<String> {
        non_empty(&self.reference_number)
    }
}
