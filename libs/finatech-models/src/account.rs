//! Bank accounts taking part in payments.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    address::{Address, CreateAddress},
    constants,
};

/// A stored account with its address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i32,
    pub address_id: i32,
    pub name: String,
    pub iban: String,
    pub bic: String,
    pub account_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// The fields that identify an account for find-or-create.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountIdentity {
    pub iban: String,
    pub bic: String,
    pub account_number: String,
}

impl Account {
    pub fn identity(&self) -> AccountIdentity {
        AccountIdentity {
            iban: self.iban.clone(),
            bic: self.bic.clone(),
            account_number: self.account_number.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccount {
    #[serde(default)]
    #[validate(
        custom(
            function = "crate::validation::not_blank",
            message = "Account name cannot be null or empty."
        ),
        length(
            max = constants::account::MAX_LENGTH_OF_NAME,
            message = "Account name cannot exceed 50 characters."
        )
    )]
    pub name: String,

    #[serde(default)]
    #[validate(
        custom(
            function = "crate::validation::not_blank",
            message = "Account IBAN cannot be null or empty."
        ),
        length(
            max = constants::account::MAX_LENGTH_OF_IBAN,
            message = "Account IBAN cannot exceed 34 characters."
        )
    )]
    pub iban: String,

    #[serde(default)]
    #[validate(
        custom(
            function = "crate::validation::not_blank",
            message = "Account BIC cannot be null or empty."
        ),
        length(
            max = constants::account::MAX_LENGTH_OF_BIC,
            message = "Account BIC cannot exceed 11 characters."
        )
    )]
    pub bic: String,

    #[serde(default)]
    #[validate(
        custom(
            function = "crate::validation::not_blank",
            message = "Account number cannot be null or empty."
        ),
        length(
            max = constants::account::MAX_LENGTH_OF_ACCOUNT_NUMBER,
            message = "Account number cannot exceed 11 characters."
        )
    )]
    pub account_number: String,

    #[serde(default)]
    #[validate(required(message = "Account address cannot be null."), nested)]
    pub address: Option<CreateAddress>,
}

impl CreateAccount {
    /// Identity used to match an existing account. IBAN and BIC are compared
    /// without spaces and in upper case, the way they are stored.
    pub fn identity(&self) -> AccountIdentity {
        AccountIdentity {
            iban: normalize_code(&self.iban),
            bic: normalize_code(&self.bic),
            account_number: self.account_number.trim().to_string(),
        }
    }

    pub fn normalized(&self) -> Self {
        let identity = self.identity();
        Self {
            name: self.name.trim().to_string(),
            iban: identity.iban,
            bic: identity.bic,
            account_number: identity.account_number,
            address: self.address.as_ref().map(CreateAddress::normalized),
        }
    }
}

/// Strips whitespace and upper-cases IBAN/BIC style codes.
pub fn normalize_code(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}
