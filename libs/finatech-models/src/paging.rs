//! Keyword filters and page resolution for list endpoints.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Page size limits applied when a filter does not specify one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingDefaults {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for PagingDefaults {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 1000,
        }
    }
}

/// A resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub skip: i64,
    pub take: i64,
}

impl PageRequest {
    /// Resolve optional skip/take values against the configured defaults.
    pub fn resolve(
        skip_count: Option<i64>,
        max_result_count: Option<i64>,
        defaults: PagingDefaults,
    ) -> Result<Self> {
        let skip = skip_count.unwrap_or(0);
        if skip < 0 {
            return Err(Error::InvalidPaging(
                "Skip count cannot be less than zero.".to_string(),
            ));
        }

        let take = match max_result_count {
            Some(take) if take <= 0 => {
                return Err(Error::InvalidPaging(
                    "Max result count must be greater than zero.".to_string(),
                ))
            }
            Some(take) => take,
            None => defaults.default_page_size,
        };

        Ok(Self {
            skip,
            take: take.min(defaults.max_page_size),
        })
    }

    /// Apply the window to an already filtered, ordered list.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let take = usize::try_from(self.take).unwrap_or(usize::MAX);
        items.iter().skip(skip).take(take).cloned().collect()
    }
}

/// Keyword search used by the account and bank listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(default, alias = "Keywords")]
    pub keywords: Option<String>,
    #[serde(default, alias = "SkipCount")]
    pub skip_count: Option<i64>,
    #[serde(default, alias = "MaxResultCount")]
    pub max_result_count: Option<i64>,
}

impl Filter {
    pub fn page_request(&self, defaults: PagingDefaults) -> Result<PageRequest> {
        PageRequest::resolve(self.skip_count, self.max_result_count, defaults)
    }

    /// Trimmed keyword, `None` when absent or blank.
    pub fn keyword(&self) -> Option<&str> {
        keyword_of(&self.keywords)
    }
}

/// Payment search: keywords plus optional account constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFilter {
    #[serde(default, alias = "Keywords")]
    pub keywords: Option<String>,
    #[serde(default, alias = "SkipCount")]
    pub skip_count: Option<i64>,
    #[serde(default, alias = "MaxResultCount")]
    pub max_result_count: Option<i64>,
    #[serde(default, alias = "OriginatorAccountId")]
    pub originator_account_id: Option<i32>,
    #[serde(default, alias = "BeneficiaryAccountId")]
    pub beneficiary_account_id: Option<i32>,
}

impl PaymentFilter {
    pub fn page_request(&self, defaults: PagingDefaults) -> Result<PageRequest> {
        PageRequest::resolve(self.skip_count, self.max_result_count, defaults)
    }

    pub fn keyword(&self) -> Option<&str> {
        keyword_of(&self.keywords)
    }
}

fn keyword_of(keywords: &Option<String>) -> Option<&str> {
    keywords.as_deref().map(str::trim).filter(|k| !k.is_empty())
}

/// One page of results and the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: i64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_count: i64) -> Self {
        Self { items, total_count }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
        }
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}
