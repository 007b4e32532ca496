//! Panic-to-error boundary.
//!
//! Converts a panic raised by a wrapped operation into an ordinary error
//! value at the point of the call. The conversion is scoped to the calling
//! task or thread: a panic inside a task spawned by the operation unwinds
//! that task, not this boundary, so every spawned task installs its own
//! boundary.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use thiserror::Error;

/// A panic captured at a boundary and carried as an error.
///
/// The display message contains the panic payload, so callers matching on
/// message text see the original panic description.
#[derive(Clone, Debug, Error)]
#[error("operation panicked: {payload}")]
pub struct CaughtPanic {
    payload: String,
}

impl CaughtPanic {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        Self {
            payload: describe_payload(payload.as_ref()),
        }
    }

    /// Returns the textual form of the panic payload.
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

fn describe_payload(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Invokes `op`, converting a panic into [`CaughtPanic`].
///
/// A normal return passes through unchanged. The captured payload is
/// logged before the error is returned.
pub fn catch_panic<T, F>(op: F) -> Result<T, CaughtPanic>
where
    F: FnOnce() -> T,
{
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(value) => Ok(value),
        Err(payload) => {
            let caught = CaughtPanic::from_payload(payload);
            tracing::error!(payload = %caught.payload(), "panic intercepted at boundary");
            Err(caught)
        }
    }
}

/// Awaits `fut`, converting a panic raised while polling it into
/// [`CaughtPanic`].
///
/// Only panics raised on this task are intercepted; tasks spawned by the
/// future unwind independently.
pub async fn catch_panic_async<T, Fut>(fut: Fut) -> Result<T, CaughtPanic>
where
    Fut: Future<Output = T>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(value) => Ok(value),
        Err(payload) => {
            let caught = CaughtPanic::from_payload(payload);
            tracing::error!(payload = %caught.payload(), "panic intercepted at boundary");
            Err(caught)
        }
    }
}

/// Invokes a fallible operation behind a panic boundary, folding a panic
/// into the operation's own error type.
pub fn protect<T, E, F>(op: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: From<CaughtPanic>,
{
    match catch_panic(op) {
        Ok(result) => result,
        Err(caught) => Err(E::from(caught)),
    }
}

/// Awaits a fallible future behind a panic boundary, folding a panic into
/// the future's own error type.
pub async fn protect_async<T, E, Fut>(fut: Fut) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    E: From<CaughtPanic>,
{
    match catch_panic_async(fut).await {
        Ok(result) => result,
        Err(caught) => Err(E::from(caught)),
    }
}
