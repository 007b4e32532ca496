//! Faultline - error classification, retry, and panic recovery toolkit
//!
//! The crate is built around one shared error-chain representation:
//! category markers ([`classify::Fault`] and [`classify::Sentinel`]) are
//! recognized through any number of context layers, the retry executor
//! re-invokes operations whose failures classify as transient, and the
//! panic boundary converts unwinds into ordinary error values.

pub mod boundary;
pub mod classify;
pub mod logging;
pub mod retry;
