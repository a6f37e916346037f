//! Free-list operations (component C).
//!
//! Each cell owns a doubly-linked list of free blocks of exactly its size.
//! The links are not stored anywhere near the ladder: while a block is free,
//! its own user area holds `prev` in the first word and `next` in the
//! second. This is why the minimum block size must fit a header plus two
//! pointers.

use core::ptr::NonNull;

use crate::mem::header::area_of;
use crate::mem::WORD_SIZE;

#[inline]
unsafe fn read_link(area: NonNull<u8>, offset: usize) -> Option<NonNull<u8>> {
    let raw = core::ptr::read(area.as_ptr().add(offset).cast::<usize>());
    NonNull::new(raw as *mut u8)
}

#[inline]
unsafe fn write_link(area: NonNull<u8>, offset: usize, value: Option<NonNull<u8>>) {
    let raw = value.map_or(0usize, |p| p.as_ptr() as usize);
    core::ptr::write(area.as_ptr().add(offset).cast::<usize>(), raw);
}

#[inline]
unsafe fn prev_of(block: NonNull<u8>) -> Option<NonNull<u8>> {
    read_link(area_of(block), 0)
}

#[inline]
unsafe fn set_prev(block: NonNull<u8>, prev: Option<NonNull<u8>>) {
    write_link(area_of(block), 0, prev);
}

#[inline]
unsafe fn next_of(block: NonNull<u8>) -> Option<NonNull<u8>> {
    read_link(area_of(block), WORD_SIZE)
}

#[inline]
unsafe fn set_next(block: NonNull<u8>, next: Option<NonNull<u8>>) {
    write_link(area_of(block), WORD_SIZE, next);
}

/// Pushes `block` at the head of the list rooted at `*head`. Does not touch
/// `in_use` — callers decide that independently.
///
/// # Safety
/// `block` must be a live block whose area is free to repurpose as link
/// storage, and `*head`, if set, must point to a live block on the same list.
pub unsafe fn insert(head: &mut Option<NonNull<u8>>, block: NonNull<u8>) {
    set_prev(block, None);
    set_next(block, *head);
    if let Some(old_head) = *head {
        set_prev(old_head, Some(block));
    }
    *head = Some(block);
}

/// Detaches and returns the head of the list, or `None` if it is empty.
///
/// # Safety
/// `*head`, if set, must point to a live block on this list.
pub unsafe fn take_first(head: &mut Option<NonNull<u8>>) -> Option<NonNull<u8>> {
    let old_head = (*head)?;
    let new_head = next_of(old_head);
    if let Some(n) = new_head {
        set_prev(n, None);
    }
    *head = new_head;
    Some(old_head)
}

/// Removes `block` from the list rooted at `*head` by pointer identity.
///
/// Linear search is acceptable here: repeated coalescing keeps cell lists
/// short in steady state, and the identity of the node to remove is already
/// known so no comparison beyond pointer equality is required.
///
/// # Safety
/// `block`, if present, must actually be a node reachable from `*head`.
pub unsafe fn delete(head: &mut Option<NonNull<u8>>, block: NonNull<u8>) {
    let mut cursor = *head;
    while let Some(node) = cursor {
        if node == block {
            let prev = prev_of(node);
            let next = next_of(node);
            match prev {
                Some(p) => set_next(p, next),
                None => *head = next,
            }
            if let Some(n) = next {
                set_prev(n, prev);
            }
            return;
        }
        cursor = next_of(node);
    }
}
