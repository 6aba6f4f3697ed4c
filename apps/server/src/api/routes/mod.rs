//! Route tables
//!
//! Every collection and item path is registered with and without a trailing
//! slash; no redirects are issued.

pub mod accounts;
pub mod banks;
pub mod metrics;
pub mod payments;
