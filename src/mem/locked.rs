//! The concurrency wrapper (component I).
//!
//! `Engine` is deliberately single-threaded. `LockedEngine` is the thin,
//! `spin`-locked adapter that gives it a `GlobalAlloc` impl, mirroring the
//! single-lock-per-call pattern already used for this codebase's binary
//! buddy allocator.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;

use crate::mem::chunk::{HostAllocator, SystemHost};
use crate::mem::engine::Engine;
use crate::mem::WORD_SIZE;

/// A `spin::Mutex`-guarded [`Engine`], suitable for installation as a
/// `#[global_allocator]`.
///
/// # Safety hazard
/// If `H` is [`SystemHost`] (the default), never install this as
/// `#[global_allocator]` for the same binary whose global allocator
/// `SystemHost` forwards to — `acquire`/`release` would recurse into the
/// very lock this wrapper holds. Back it with a distinct memory source
/// instead.
pub struct LockedEngine<H: HostAllocator = SystemHost> {
    inner: spin::Mutex<Engine<H>>,
}

impl<H: HostAllocator> LockedEngine<H> {
    pub fn new(host: H) -> Self {
        Self {
            inner: spin::Mutex::new(Engine::new(host)),
        }
    }
}

unsafe impl<H: HostAllocator> GlobalAlloc for LockedEngine<H> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        debug_assert!(
            layout.align() <= WORD_SIZE,
            "fiballoc: requested alignment exceeds pointer-size granularity"
        );
        self.inner.lock().alloc(layout.size()).as_ptr()
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        let Some(p) = NonNull::new(ptr) else { return };
        self.inner.lock().free(p);
    }
}
