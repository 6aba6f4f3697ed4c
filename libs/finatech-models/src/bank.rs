//! Banks, identified by their BIC.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    account::{normalize_code, Account},
    constants,
};

/// A bank and the accounts held under its BIC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    pub id: i32,
    pub name: String,
    pub bic: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBank {
    #[serde(default)]
    #[validate(
        custom(
            function = "crate::validation::not_blank",
            message = "Bank name cannot be null or empty."
        ),
        length(
            max = constants::bank::MAX_LENGTH_OF_NAME,
            message = "Bank name cannot exceed 100 characters."
        )
    )]
    pub name: String,

    #[serde(default)]
    #[validate(
        custom(
            function = "crate::validation::not_blank",
            message = "Bank BIC cannot be null or empty."
        ),
        length(
            max = constants::bank::MAX_LENGTH_OF_BIC,
            message = "Bank BIC cannot exceed 11 characters."
        )
    )]
    pub bic: String,
}

impl CreateBank {
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            bic: normalize_code(&self.bic),
        }
    }
}
