//! The public API (component G).
//!
//! `Engine` ties every other component together: the size ladder, the
//! splitter, the coalescer and the chunk source. It is deliberately the only
//! `pub` surface most consumers ever touch directly — `LockedEngine` is a
//! thin wrapper around it for concurrent use.

use core::ptr::NonNull;

use crate::mem::chunk::{acquire_chunk, release_all, HostAllocator, SystemHost};
use crate::mem::coalesce::coalesce;
use crate::mem::header::{area_of, block_of, Header};
use crate::mem::ladder::{Cell, Ladder};
use crate::mem::split::split;
use crate::mem::{arch, BLOCK_SIZE, WORD_SIZE};

/// A Fibonacci buddy sub-allocation engine, backed by a [`HostAllocator`].
///
/// Single-threaded by design: wrap it in [`crate::mem::locked::LockedEngine`]
/// for concurrent use.
pub struct Engine<H: HostAllocator = SystemHost> {
    host: H,
    ladder: Ladder,
    chunk_head: Option<NonNull<u8>>,
}

#[inline]
fn cells_bytes(cap: usize) -> usize {
    cap * core::mem::size_of::<Cell>()
}

#[inline]
fn blocks_for_bytes(bytes: usize) -> usize {
    (bytes + WORD_SIZE + BLOCK_SIZE - 1) / BLOCK_SIZE
}

impl<H: HostAllocator> Engine<H> {
    /// Builds a ready-to-use engine: acquires a first chunk sized to hold the
    /// initial ladder's cell array, and bootstraps the ladder directly into
    /// it (there is no ladder yet to drive a split, so the first chunk is
    /// consumed whole rather than split).
    pub fn new(host: H) -> Self {
        let mut chunk_head = None;
        let n = blocks_for_bytes(cells_bytes(arch::ARRAY_INIT_CAPACITY));
        let block = unsafe { acquire_chunk(&host, &mut chunk_head, n) };
        unsafe { Header::set_in_use(block, true) };

        let cells = area_of(block).cast::<Cell>();
        let ladder = unsafe { Ladder::bootstrap(cells, arch::ARRAY_INIT_CAPACITY, block) };

        log::debug!("fiballoc: engine initialized, ladder seeded with {} cells", ladder.len());

        Self {
            host,
            ladder,
            chunk_head,
        }
    }

    /// Returns a pointer to at least `x` writable, uninitialized bytes,
    /// aligned to pointer size. `x = 0` is treated as `x = 1`.
    pub fn alloc(&mut self, x: usize) -> NonNull<u8> {
        let x = x.max(1);
        let n = blocks_for_bytes(x);
        let block = self.raw_alloc_blocks(n);
        unsafe { Header::set_in_use(block, true) };
        log::trace!("fiballoc: alloc({x}) -> {n} blocks at {:p}", block.as_ptr());
        area_of(block)
    }

    /// Reclaims a pointer previously returned by [`Engine::alloc`] and not
    /// yet freed. Undefined behavior on a foreign pointer or a double free —
    /// the engine performs no defensive validation.
    pub fn free(&mut self, p: NonNull<u8>) {
        let block = block_of(p);
        log::trace!("fiballoc: free({:p})", block.as_ptr());
        self.raw_free_blocks(block);
    }

    /// Consumes the engine, returning every chunk it ever acquired back to
    /// the host. After this call the engine no longer exists, so no further
    /// `alloc`/`free` is even expressible.
    pub fn finalize(mut self) {
        unsafe { release_all(&self.host, &mut self.chunk_head) };
    }

    /// Finds a free block of at least `n` blocks, growing the ladder and/or
    /// drawing a fresh chunk as needed, then splits it down to size.
    fn raw_alloc_blocks(&mut self, n: usize) -> NonNull<u8> {
        loop {
            if self.ladder.smallest_at_least(n).is_none() {
                self.extend_ladder_by_one();
                continue;
            }

            if let Some(i) = self.ladder.smallest_free_at_least(n) {
                let block = unsafe { self.ladder.take_first(i) }
                    .expect("smallest_free_at_least reported a non-empty cell");
                let (final_block, _final_index) = unsafe { split(&mut self.ladder, i, block, n) };
                return final_block;
            }

            let i = self.ladder.smallest_at_least(n).expect("checked above");
            let size = self.ladder.size_at(i);
            let fresh = unsafe { acquire_chunk(&self.host, &mut self.chunk_head, size) };
            unsafe { self.ladder.insert_free(i, fresh) };
        }
    }

    /// Marks a block free, reinserts it onto its cell's list and lets it
    /// coalesce with its buddy for as long as possible.
    fn raw_free_blocks(&mut self, block: NonNull<u8>) {
        let h = unsafe { Header::read(block) };
        let i = self
            .ladder
            .index_of_size(h.size())
            .expect("freed block carries a size that is not a ladder term");
        unsafe {
            Header::set_in_use(block, false);
            self.ladder.insert_free(i, block);
            coalesce(&mut self.ladder, i);
        }
    }

    /// Appends one more Fibonacci term to the ladder, relocating the cell
    /// array through the ordinary allocation path (and freeing the old one
    /// through the ordinary free path) if it has run out of capacity.
    fn extend_ladder_by_one(&mut self) {
        if self.ladder.len() == self.ladder.cap() {
            let new_cap = self.ladder.cap() * 2;
            let n = blocks_for_bytes(cells_bytes(new_cap));
            let new_block = self.raw_alloc_blocks(n);
            unsafe { Header::set_in_use(new_block, true) };
            let new_cells = area_of(new_block).cast::<Cell>();

            let old_storage = unsafe { self.ladder.relocate(new_cells, new_cap, new_block) };
            log::debug!("fiballoc: ladder capacity grown to {new_cap} cells");
            self.raw_free_blocks(old_storage);
        }

        self.ladder.push_next_term();
        log::trace!(
            "fiballoc: ladder extended to {} terms (top size = {})",
            self.ladder.len(),
            self.ladder.size_at(self.ladder.len() - 1)
        );
    }
}

impl<H: HostAllocator> Drop for Engine<H> {
    /// Leak-prevention safety net: releases any chunks still outstanding if
    /// the engine is dropped without an explicit [`Engine::finalize`] call
    /// (for instance during an unwind). `finalize` already empties
    /// `chunk_head` via `release_all`, so this runs again harmlessly as a
    /// no-op on the ordinary post-`finalize` drop.
    fn drop(&mut self) {
        unsafe { release_all(&self.host, &mut self.chunk_head) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    struct ArenaHost {
        arena: RefCell<[u8; 1 << 16]>,
        used: RefCell<usize>,
    }

    impl ArenaHost {
        fn new() -> Self {
            Self {
                arena: RefCell::new([0u8; 1 << 16]),
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

        unsafe fn release(&self, _ptr: NonNull<u8>, _bytes: usize) {}
    }

    #[test]
    fn alloc_then_free_does_not_panic_and_yields_distinct_pointers() {
        let mut engine = Engine::new(ArenaHost::new());
        let a = engine.alloc(16);
        let b = engine.alloc(32);
        assert_ne!(a, b);
        engine.free(a);
        engine.free(b);
        engine.finalize();
    }

    #[test]
    fn freed_block_is_reused_by_a_same_sized_request() {
        let mut engine = Engine::new(ArenaHost::new());
        let a = engine.alloc(8);
        engine.free(a);
        let b = engine.alloc(8);
        assert_eq!(a, b);
        engine.finalize();
    }

    #[test]
    fn many_alloc_free_cycles_survive_without_corruption() {
        let mut engine = Engine::new(ArenaHost::new());
        let mut live = alloc::vec::Vec::new();
        for round in 0..64 {
            let size = 8 + (round % 7) * 16;
            live.push(engine.alloc(size));
            if live.len() > 4 {
                let p = live.remove(0);
                engine.free(p);
            }
        }
        for p in live {
            engine.free(p);
        }
        engine.finalize();
    }
}
