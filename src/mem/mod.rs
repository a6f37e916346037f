//! The Fibonacci buddy sub-allocation engine.
//!
//! Module layout mirrors the component breakdown of the design: [`header`] is
//! the per-block bit-packed metadata codec, [`ladder`] is the Fibonacci size
//! table, [`freelist`] is the doubly-linked per-cell list, [`split`] and
//! [`coalesce`] are the two halves of the buddy state machine, [`chunk`] is
//! the host-facing collaborator, [`engine`] ties all of it into the public
//! API, and [`locked`] is the optional concurrency wrapper.

pub mod arch;
pub mod chunk;
pub mod coalesce;
pub mod engine;
pub mod error;
pub mod freelist;
pub mod header;
pub mod ladder;
pub mod locked;
pub mod split;
pub mod utils;

/// Size, in bytes, of a single block unit. Fixed across every target.
pub const BLOCK_SIZE: usize = 8;

/// Size, in bytes, of one machine word — the width of a header and of a free
/// block's `prev`/`next` pointers.
pub const WORD_SIZE: usize = core::mem::size_of::<usize>();
