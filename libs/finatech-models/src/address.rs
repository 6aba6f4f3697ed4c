//! Postal addresses attached to accounts.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants;

/// A stored postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: i32,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub address_line3: Option<String>,
    pub city: Option<String>,
    pub post_code: Option<String>,
    /// ISO 3166-1 alpha-2
    pub country_code: String,
}

/// Address data supplied when an account is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddress {
    #[serde(default)]
    #[validate(
        custom(
            function = "crate::validation::not_blank",
            message = "Address Line1 cannot be null or empty."
        ),
        length(
            max = constants::address::MAX_LENGTH_OF_ADDRESS_LINE,
            message = "Address Line1 cannot exceed 100 characters."
        )
    )]
    pub address_line1: String,

    #[serde(default)]
    #[validate(length(
        max = constants::address::MAX_LENGTH_OF_ADDRESS_LINE,
        message = "Address Line2 cannot exceed 100 characters."
    ))]
    pub address_line2: Option<String>,

    #[serde(default)]
    #[validate(length(
        max = constants::address::MAX_LENGTH_OF_ADDRESS_LINE,
        message = "Address Line3 cannot exceed 100 characters."
    ))]
    pub address_line3: Option<String>,

    #[serde(default)]
    #[validate(length(
        max = constants::address::MAX_LENGTH_OF_CITY,
        message = "Address city cannot exceed 50 characters."
    ))]
    pub city: Option<String>,

    #[serde(default)]
    #[validate(length(
        max = constants::address::MAX_LENGTH_OF_POST_CODE,
        message = "Address post code cannot exceed 10 characters."
    ))]
    pub post_code: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "crate::validation::country_code"))]
    pub country_code: String,
}

impl CreateAddress {
    /// Blank optional lines are stored as NULL rather than empty strings.
    pub fn normalized(&self) -> Self {
        Self {
            address_line1: self.address_line1.trim().to_string(),
            address_line2: non_empty(&self.address_line2),
            address_line3: non_empty(&self.address_line3),
            city: non_empty(&self.city),
            post_code: non_empty(&self.post_code),
            country_code: self.country_code.trim().to_ascii_uppercase(),
        }
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
