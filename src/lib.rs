//! This crate provides a type-erased callables as replacement for `Box<dyn FnMut>`
//! that can store small closures inline without heap allocation.
//!
//! `TFn` is a type-erased callable that can store any `FnMut` that implements `Clone`, `Send`, `Sync` and is `'static`.
//! `LTFn` is relaxed version of `TFn` that doesn't require `Send`, `Sync` bounds.
//!
//! Call signature is given as a tuple of argument types and a return type.
//! `LTFn<(A, B), R>` holds any `FnMut(A, B) -> R + Clone`.
//! Containers are values: they can be cloned, swapped, taken from and reassigned.
//! Closures up to [`MAX_SIZE`] bytes and aligned to at most [`MAX_ALIGN`] are stored inline.
//!
//! ## Usage
//!
//! ```
//! use tfn::{CallError, LTFn};
//!
//! // Small closure fits inline storage, so no allocation is performed.
//! let offset = 10u32;
//! let mut f: LTFn<(u32,), u32> = LTFn::new(move |x: u32| x + offset);
//! assert!(f.is_inline());
//! assert_eq!(f.call((5,)), Ok(15));
//!
//! // Large captures are boxed.
//! let table = [1u64; 16];
//! let mut g: LTFn<(usize,), u64> = LTFn::new(move |i: usize| table[i]);
//! assert!(!g.is_inline());
//! assert_eq!(g.call((0,)), Ok(1));
//!
//! // Clone keeps storage mode of the original.
//! let mut h = g.clone();
//! assert!(!h.is_inline());
//! assert_eq!(h.call((15,)), Ok(1));
//!
//! // Taking leaves empty container behind.
//! let mut taken = f.take();
//! assert_eq!(f.call((5,)), Err(CallError::Empty));
//! assert_eq!(taken.call((5,)), Ok(15));
//! ```

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod callable;
mod error;
mod holder;
mod storage;
mod tfn;
mod vtable;

pub use self::{
    callable::Callable,
    error::CallError,
    storage::{MAX_ALIGN, MAX_SIZE},
    tfn::{LTFn, TFn},
};
