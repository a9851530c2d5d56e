//! Client for object stores that only expose a PUT write endpoint.
//!
//! The store signals success through its response body rather than
//! through status codes alone, so the client carries a pluggable
//! [`ResponseCheck`]; the default expects an OK status with a non-null
//! JSON body. Failed transfers are retried a bounded number of times.

mod client;

pub use client::{JsonNonNull, MAX_RETRIES, RemoteStore, ResponseCheck};

/// Errors produced by the store client.
///
/// Transport errors and rejected responses both count against the
/// retry budget, so exhaustion is the only fatal outcome.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("upload of {path} failed after {attempts} attempts")]
    RetriesExhausted { path: String, attempts: u32 },
}
