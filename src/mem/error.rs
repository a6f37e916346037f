//! The error/abort surface (component K).
//!
//! The engine offers no fallible return: by the time a `HostAllocator` call
//! could fail, the caller has already committed to handing out a pointer, so
//! there is no safe partial-success path to unwind to. [`fatal`] logs the
//! marker and aborts.

use crate::fzboot::errors::BaseError;

/// Logs `err` at error level and aborts the process.
///
/// # Panics
/// Always. This function never returns.
pub fn fatal<E: BaseError>(err: E) -> ! {
    log::error!("fiballoc: fatal allocator error: {err:?}");
    panic!("fiballoc: fatal allocator error: {err:?}");
}
