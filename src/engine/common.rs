// src/engine/common.rs
//
// Common utilities shared across engine modules.
// Codec calls go through `run_with_panic_policy` so a panic inside a decoder
// or encoder surfaces as `TrentError::InternalPanic` instead of unwinding
// into the caller's session.

use crate::error::TrentError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

/// Result type used by the codec layer.
pub type EngineResult<T> = std::result::Result<T, TrentError>;

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run `f`, converting a panic into `InternalPanic` tagged with `stage`.
pub fn run_with_panic_policy<T, F>(stage: &'static str, f: F) -> EngineResult<T>
where
    F: FnOnce() -> EngineResult<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(target: "trent::engine", stage, %message, "panic caught at codec boundary");
            Err(TrentError::internal_panic(format!("{stage}: {message}")))
        }
    }
}
