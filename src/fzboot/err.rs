use core::fmt::Debug;

/// `BaseError` is a common trait implemented by every error marker type defined in this crate.
///
/// It is dependent on the [`Debug`] trait, which makes sense as we are dealing with errors.
pub trait BaseError: Debug {}

/// `CanFail` is a return type for functions that are allowed to fail, and don't need to return
/// anything.
pub type CanFail<T> = Result<(), T>;

/// Marker passed to [`crate::mem::error::fatal`] when the host allocator could not satisfy a
/// request. There is no recovery path: the allocator has already begun committing partial state
/// (a ladder slot, a chunk-list link) by the time this is raised, so the only safe action left is
/// to abort.
#[derive(Debug, Clone, Copy)]
pub struct HostExhausted {
    pub requested_bytes: usize,
}

impl BaseError for HostExhausted {}
