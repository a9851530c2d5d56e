//! PUT client with basic authentication and bounded retry.

use reqwest::StatusCode;
use tracing::{info, warn};

use crate::StoreError;

/// Retries allowed after the initial attempt (6 attempts total).
pub const MAX_RETRIES: u32 = 5;

/// Decides whether a PUT response counts as success.
///
/// Different stores signal success differently; the acceptance
/// criterion is injected into [`RemoteStore`] so it stays a single
/// swappable check.
pub trait ResponseCheck: Send + Sync {
    fn accept(&self, status: StatusCode, body: &[u8]) -> bool;
}

/// Default check: HTTP 200 with a body that parses as non-null JSON.
pub struct JsonNonNull;

impl ResponseCheck for JsonNonNull {
    fn accept(&self, status: StatusCode, body: &[u8]) -> bool {
        if status != StatusCode::OK {
            return false;
        }
        matches!(
            serde_json::from_slice::<serde_json::Value>(body),
            Ok(value) if !value.is_null()
        )
    }
}

/// One failed attempt. Transport errors and rejected responses are
/// treated the same way by the retry loop.
#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response rejected (status {status})")]
    Rejected { status: u16 },
}

/// Client for a PUT-only object store.
pub struct RemoteStore {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    check: Box<dyn ResponseCheck>,
}

impl RemoteStore {
    /// Creates a client with basic-auth credentials and the default
    /// [`JsonNonNull`] acceptance check.
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            check: Box::new(JsonNonNull),
        }
    }

    /// Replaces the response acceptance check.
    pub fn with_check(mut self, check: Box<dyn ResponseCheck>) -> Self {
        self.check = check;
        self
    }

    /// Uploads `body` to `path` on the store.
    ///
    /// A transfer that does not satisfy the acceptance check is retried
    /// up to [`MAX_RETRIES`] times; after that the error is fatal and
    /// names the destination path.
    pub async fn put(&self, path: &str, body: &[u8]) -> Result<(), StoreError> {
        for attempt in 0..=MAX_RETRIES {
            info!(path, attempt, "uploading");
            match self.try_put(path, body).await {
                Ok(()) => return Ok(()),
                Err(err) if attempt < MAX_RETRIES => {
                    warn!(path, error = %err, "upload failed, retrying");
                }
                Err(err) => {
                    warn!(path, error = %err, "upload failed, retries exhausted");
                    return Err(StoreError::RetriesExhausted {
                        path: path.to_string(),
                        attempts: attempt + 1,
                    });
                }
            }
        }
        unreachable!("retry loop always returns")
    }

    async fn try_put(&self, path: &str, body: &[u8]) -> Result<(), AttemptError> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self
            .http
            .put(&url)
            .basic_auth(&self.username, Some(&self.password))
            .body(body.to_vec())
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if self.check.accept(status, &bytes) {
            Ok(())
        } else {
            Err(AttemptError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}
