//! HTTP-level tests driving the router in-process.

#[path = "../support/mod.rs"]
mod support;

mod accounts;
mod banks;
mod system;
