//! Architecture-dependent seed constants for the Fibonacci size ladder.
//!
//! `BLOCK_SIZE` and `WORD_SIZE` (see [`super`]) are the same on every target;
//! only the seed terms of the sequence and the initial ladder dimensions
//! depend on pointer width, since the smallest block still has to hold a
//! header word plus two free-list pointers.

/// `ladder[0].size`, the smallest Fibonacci term this target can address.
#[cfg(target_pointer_width = "64")]
pub const MIN_SIZE: usize = 3;
#[cfg(target_pointer_width = "64")]
pub const SIZE_1: usize = 4;
#[cfg(target_pointer_width = "64")]
pub const SIZE_2: usize = 5;
#[cfg(target_pointer_width = "64")]
pub const SIZE_3: usize = 7;
#[cfg(target_pointer_width = "64")]
pub const ARRAY_INIT_SIZE: usize = 11;

#[cfg(target_pointer_width = "32")]
pub const MIN_SIZE: usize = 2;
#[cfg(target_pointer_width = "32")]
pub const SIZE_1: usize = 3;
#[cfg(target_pointer_width = "32")]
pub const SIZE_2: usize = 4;
#[cfg(target_pointer_width = "32")]
pub const SIZE_3: usize = 5;
#[cfg(target_pointer_width = "32")]
pub const ARRAY_INIT_SIZE: usize = 10;

#[cfg(not(any(target_pointer_width = "64", target_pointer_width = "32")))]
pub const MIN_SIZE: usize = 1;
#[cfg(not(any(target_pointer_width = "64", target_pointer_width = "32")))]
pub const SIZE_1: usize = 2;
#[cfg(not(any(target_pointer_width = "64", target_pointer_width = "32")))]
pub const SIZE_2: usize = 3;
#[cfg(not(any(target_pointer_width = "64", target_pointer_width = "32")))]
pub const SIZE_3: usize = 4;
#[cfg(not(any(target_pointer_width = "64", target_pointer_width = "32")))]
pub const ARRAY_INIT_SIZE: usize = 9;

/// Initial cell-array capacity; identical across targets, doubled on demand
/// by [`crate::mem::ladder`] once `ARRAY_INIT_SIZE` terms fill it up.
pub const ARRAY_INIT_CAPACITY: usize = 16;

/// The four seed terms, in order, for the current target.
pub const SEED: [usize; 4] = [MIN_SIZE, SIZE_1, SIZE_2, SIZE_3];
