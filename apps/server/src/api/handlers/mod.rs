//! Request handlers
//!
//! Handlers extract the request, call the matching service and shape the
//! response. Missing entities become 404s here; everything else comes back
//! from the services as `Error`.

pub mod accounts;
pub mod banks;
pub mod metrics;
pub mod payments;
