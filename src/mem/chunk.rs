//! The chunk source and host collaborator (components F and H).
//!
//! A chunk is a single region drawn from the host, shaped so that the engine
//! can immediately carve a Fibonacci-sized block out of it: a link word (so
//! chunks thread onto a list for final release), a persisted block count (so
//! `release_all` knows the original span even after internal splits), the
//! block itself, and a one-word "fake right" sentinel that caps upward
//! coalescing at the chunk boundary.

use core::ptr::NonNull;

use crate::fzboot::errors::HostExhausted;
use crate::mem::error::fatal;
use crate::mem::header::{Header, Side};
use crate::mem::{BLOCK_SIZE, WORD_SIZE};

/// The engine's sole dependency on the outside world: a place to get and
/// give back raw memory. Implementors need not be thread-safe; the engine
/// itself is single-threaded (see [`crate::mem::locked`] for the adapter
/// that is).
pub trait HostAllocator {
    /// Requests `bytes` of fresh memory, or `None` if the host cannot
    /// satisfy it.
    ///
    /// # Safety
    /// The returned region, if any, must be valid for reads and writes of
    /// `bytes` bytes and live until a matching [`HostAllocator::release`].
    unsafe fn acquire(&self, bytes: usize) -> Option<NonNull<u8>>;

    /// Returns a region previously handed back by [`HostAllocator::acquire`]
    /// with the same `bytes`.
    ///
    /// # Safety
    /// `ptr` must have been returned by a prior `acquire(bytes)` call on this
    /// same host, not already released.
    unsafe fn release(&self, ptr: NonNull<u8>, bytes: usize);
}

/// The default [`HostAllocator`], forwarding to whatever `#[global_allocator]`
/// is registered for the binary.
///
/// Must never back an `Engine` that is itself installed as the
/// `#[global_allocator]` — that would recurse into itself on the very first
/// chunk acquisition. Consumers doing that need a `HostAllocator` backed by a
/// distinct memory source (a static arena, `mmap`, a boot-time physical
/// range, ...).
pub struct SystemHost;

impl HostAllocator for SystemHost {
    unsafe fn acquire(&self, bytes: usize) -> Option<NonNull<u8>> {
        let layout = alloc::alloc::Layout::from_size_align(bytes, WORD_SIZE).ok()?;
        NonNull::new(alloc::alloc::alloc(layout))
    }

    unsafe fn release(&self, ptr: NonNull<u8>, bytes: usize) {
        let layout = alloc::alloc::Layout::from_size_align(bytes, WORD_SIZE)
            .expect("release() called with a size that never came from acquire()");
        alloc::alloc::dealloc(ptr.as_ptr(), layout);
    }
}

#[inline]
fn chunk_total_bytes(n: usize) -> usize {
    n * BLOCK_SIZE + 3 * WORD_SIZE
}

#[inline]
unsafe fn read_word(region: NonNull<u8>, offset: usize) -> usize {
    core::ptr::read(region.as_ptr().add(offset).cast::<usize>())
}

#[inline]
unsafe fn write_word(region: NonNull<u8>, offset: usize, value: usize) {
    core::ptr::write(region.as_ptr().add(offset).cast::<usize>(), value);
}

/// Draws a fresh chunk sized for a block of `n` blocks, threads it onto the
/// chunk list rooted at `*chunk_head`, and returns the pointer to the usable
/// block (header included) inside it.
///
/// Aborts via [`fatal`] if the host cannot satisfy the request — there is no
/// partial state to unwind at this point, so there is nothing safer to do.
///
/// # Safety
/// `host` must be a valid `HostAllocator` and `chunk_head` must root a chunk
/// list previously built only by this function (or be `None`).
pub unsafe fn acquire_chunk<H: HostAllocator>(
    host: &H,
    chunk_head: &mut Option<NonNull<u8>>,
    n: usize,
) -> NonNull<u8> {
    let bytes = chunk_total_bytes(n);
    let region = match host.acquire(bytes) {
        Some(p) => p,
        None => fatal(HostExhausted { requested_bytes: bytes }),
    };

    let prev_head = chunk_head.map_or(0usize, |p| p.as_ptr() as usize);
    write_word(region, 0, prev_head);
    write_word(region, WORD_SIZE, n);
    *chunk_head = Some(region);

    let block = NonNull::new_unchecked(region.as_ptr().add(2 * WORD_SIZE));
    let sentinel = NonNull::new_unchecked(block.as_ptr().add(n * BLOCK_SIZE));

    Header::new(0, true, Side::Right, Side::Left).write(sentinel);
    Header::new(n, false, Side::Left, Side::Left).write(block);

    log::trace!("fiballoc: acquired chunk of {n} blocks ({bytes} bytes) from host");

    block
}

/// Returns every chunk on the list rooted at `chunk_head` to `host`, in LIFO
/// order (most recently acquired chunk first), and clears the list.
///
/// # Safety
/// Every region reachable from `*chunk_head` must still be exactly as
/// [`acquire_chunk`] left it at the chunk-level header words (the live
/// blocks inside may have since been split/merged arbitrarily — `release_all`
/// never looks inside, only at the two persisted words at the chunk's
/// front), and must have been acquired from `host`.
pub unsafe fn release_all<H: HostAllocator>(host: &H, chunk_head: &mut Option<NonNull<u8>>) {
    let mut cursor = chunk_head.take();
    while let Some(region) = cursor {
        let next_raw = read_word(region, 0);
        let n = read_word(region, WORD_SIZE);
        cursor = NonNull::new(next_raw as *mut u8);
        let bytes = chunk_total_bytes(n);
        host.release(region, bytes);
        log::trace!("fiballoc: released chunk of {n} blocks ({bytes} bytes) to host");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    /// A `HostAllocator` backed by a bump arena over a `Vec`, used instead of
    /// `SystemHost` so tests never depend on (or recurse through) the
    /// process's real global allocator.
    struct ArenaHost {
        arena: RefCell<[u8; 4096]>,
        used: RefCell<usize>,
    }

    impl ArenaHost {
        fn new(_capacity: usize) -> Self {
            Self {
                arena: RefCell::new([0u8; 4096]),
                used: RefCell::new(0),
            }
        }
    }

    impl HostAllocator for ArenaHost {
        unsafe fn acquire(&self, bytes: usize) -> Option<NonNull<u8>> {
            let mut used = self.used.borrow_mut();
            let mut arena = self.arena.borrow_mut();
            if *used + bytes > arena.len() {
                return None;
            }
            let ptr = arena.as_mut_ptr().add(*used);
            *used += bytes;
            NonNull::new(ptr)
        }

        unsafe fn release(&self, _ptr: NonNull<u8>, _bytes: usize) {
            // Bump arena: nothing to do per-release; dropped with the arena itself.
        }
    }

    #[test]
    fn acquire_chunk_lays_out_link_count_block_and_sentinel() {
        let host = ArenaHost::new(4096);
        let mut chunk_head: Option<NonNull<u8>> = None;
        let n = 11;

        let block = unsafe { acquire_chunk(&host, &mut chunk_head, n) };
        let region = chunk_head.unwrap();

        unsafe {
            assert_eq!(read_word(region, WORD_SIZE), n);
            assert_eq!(read_word(region, 0), 0);

            let h = Header::read(block);
            assert_eq!(h.size(), n);
            assert!(!h.in_use());
            assert_eq!(h.lr(), Side::Left);

            let sentinel = NonNull::new_unchecked(block.as_ptr().add(n * BLOCK_SIZE));
            let sh = Header::read(sentinel);
            assert_eq!(sh.size(), 0);
            assert!(sh.in_use());
            assert_eq!(sh.lr(), Side::Right);
        }
    }

    #[test]
    fn release_all_walks_every_chunk_and_clears_the_list() {
        let host = ArenaHost::new(4096);
        let mut chunk_head: Option<NonNull<u8>> = None;

        unsafe {
            acquire_chunk(&host, &mut chunk_head, 11);
            acquire_chunk(&host, &mut chunk_head, 11);
            acquire_chunk(&host, &mut chunk_head, 11);
            assert!(chunk_head.is_some());

            release_all(&host, &mut chunk_head);
            assert!(chunk_head.is_none());
        }
    }
}
