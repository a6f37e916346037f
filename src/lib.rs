//! `fiballoc` — a dynamic memory allocator partitioned along a generalized
//! Fibonacci sequence `a(n) = a(n-1) + a(n-4)`.
//!
//! Requests are satisfied by splitting a free block into two unequal Fibonacci
//! buddies whose sizes sum to the parent's; freed blocks are recursively
//! merged back with their buddy when it is free and whole. The engine draws
//! its backing memory from a [`mem::chunk::HostAllocator`] and never talks to
//! the operating system directly, so it can be embedded in a kernel, wired up
//! as a `#[global_allocator]` through [`mem::locked::LockedEngine`], or driven
//! entirely in host-side tests against an arena.
#![no_std]
#![allow(clippy::missing_safety_doc)]

extern crate alloc;

pub mod fzboot;
pub mod mem;

pub use crate::fzboot::errors;
pub use crate::mem::engine::Engine;
pub use crate::mem::locked::LockedEngine;
