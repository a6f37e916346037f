//! The coalescer (component E).
//!
//! Starting from a block just freed (and already pushed onto its cell's free
//! list), repeatedly checks whether its buddy is free and whole; if so,
//! merges the pair and continues one level up. The merged block's `lr`/`inh`
//! are reconstructed entirely from the two children's headers — no separate
//! bookkeeping is consulted.

use core::ptr::NonNull;

use crate::mem::header::{Header, Side};
use crate::mem::ladder::Ladder;
use crate::mem::BLOCK_SIZE;

/// Buddy address and ladder index for a block at cell `i` with header `h`.
unsafe fn buddy_of(block: NonNull<u8>, i: usize, h: Header, ladder: &Ladder) -> (NonNull<u8>, usize) {
    match h.lr() {
        Side::Left => {
            let offset = ladder.size_at(i) * BLOCK_SIZE;
            (NonNull::new_unchecked(block.as_ptr().add(offset)), i + 3)
        }
        Side::Right => {
            let offset = ladder.size_at(i - 3) * BLOCK_SIZE;
            (NonNull::new_unchecked(block.as_ptr().sub(offset)), i - 3)
        }
    }
}

/// Merges the block at the head of cell `i`'s free list upward with its
/// buddy for as long as the buddy is free and whole, then leaves the
/// (possibly larger) surviving block at the head of its final cell's list.
///
/// # Safety
/// Cell `i`'s free list must be non-empty, with the block just inserted by
/// the caller at its head.
pub unsafe fn coalesce(ladder: &mut Ladder, i: usize) {
    let mut index = i;
    let mut block = ladder
        .take_first(index)
        .expect("coalesce called on an empty cell");

    loop {
        let h = Header::read(block);
        let (buddy, buddy_index) = buddy_of(block, index, h, ladder);

        if buddy_index >= ladder.len() {
            break;
        }

        let bh = Header::read(buddy);
        if bh.in_use() || bh.size() != ladder.size_at(buddy_index) {
            break;
        }

        ladder.delete_free(buddy_index, buddy);

        let (left, left_h, right_h, parent_index) = match h.lr() {
            Side::Left => (block, h, bh, index + 4),
            Side::Right => (buddy, bh, h, index + 1),
        };

        let parent_lr = left_h.inh();
        let parent_inh = right_h.inh();
        let merged_size = ladder.size_at(parent_index);
        Header::new(merged_size, false, parent_lr, parent_inh).write(left);

        block = left;
        index = parent_index;
    }

    ladder.insert_free(index, block);
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use core::mem::MaybeUninit;

    unsafe fn test_ladder(storage: &mut [MaybeUninit<crate::mem::ladder::Cell>]) -> Ladder {
        let cells = NonNull::new(storage.as_mut_ptr().cast()).unwrap();
        let fake_block = NonNull::new(storage.as_mut_ptr().cast::<u8>()).unwrap();
        Ladder::bootstrap(cells, storage.len(), fake_block)
    }

    #[test]
    fn merges_whole_free_buddies_back_into_parent() {
        let mut cell_storage = [MaybeUninit::<crate::mem::ladder::Cell>::uninit(); 32];
        let mut ladder = unsafe { test_ladder(&mut cell_storage) };

        let size0 = ladder.size_at(0);
        let size3 = ladder.size_at(3);
        let parent_size = ladder.size_at(4);
        assert_eq!(size0 + size3, parent_size);

        let mut region = vec![0u8; (parent_size + 1) * BLOCK_SIZE];
        let left = NonNull::new(region.as_mut_ptr()).unwrap();
        let right = unsafe { NonNull::new_unchecked(left.as_ptr().add(size0 * BLOCK_SIZE)) };

        unsafe {
            Header::new(size0, false, Side::Left, Side::Left).write(left);
            Header::new(size3, false, Side::Right, Side::Left).write(right);

            ladder.insert_free(3, right);
            ladder.insert_free(0, left);
            coalesce(&mut ladder, 0);

            assert!(ladder.cells()[0].head.is_none());
            assert!(ladder.cells()[3].head.is_none());
            assert_eq!(ladder.cells()[4].head, Some(left));

            let merged = Header::read(left);
            assert_eq!(merged.size(), parent_size);
            assert!(!merged.in_use());
        }
    }

    #[test]
    fn stops_when_buddy_still_in_use() {
        let mut cell_storage = [MaybeUninit::<crate::mem::ladder::Cell>::uninit(); 32];
        let mut ladder = unsafe { test_ladder(&mut cell_storage) };

        let size0 = ladder.size_at(0);
        let size3 = ladder.size_at(3);
        let parent_size = ladder.size_at(4);

        let mut region = vec![0u8; (parent_size + 1) * BLOCK_SIZE];
        let left = NonNull::new(region.as_mut_ptr()).unwrap();
        let right = unsafe { NonNull::new_unchecked(left.as_ptr().add(size0 * BLOCK_SIZE)) };

        unsafe {
            Header::new(size0, false, Side::Left, Side::Left).write(left);
            Header::new(size3, true, Side::Right, Side::Left).write(right); // in use

            ladder.insert_free(0, left);
            coalesce(&mut ladder, 0);

            assert_eq!(ladder.cells()[0].head, Some(left));
            assert!(ladder.cells()[4].head.is_none());
        }
    }
}
