//! A type-erased, resizable array of fixed-size elements.
//!
//! [`DynArray`] owns one contiguous block of `capacity * element_size` bytes.
//! The element size is chosen at creation and never changes; the capacity is
//! changed only by explicit [`resize`](DynArray::resize) calls, which consume
//! the array and either return it relocated or hand it back untouched inside a
//! [`ResizeError`].
//!
//! ```
//! use dynarray::DynArray;
//!
//! let mut array = DynArray::of::<u64>(10)?;
//! array.typed_data_mut::<u64>()[0] = 69;
//!
//! let array = array.resize_zeroed(16)?;
//! assert_eq!(array.capacity(), 16);
//! assert_eq!(array.typed_data::<u64>()[0], 69);
//! assert!(array.typed_data::<u64>()[10..].iter().all(|&v| v == 0));
//! array.release();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Memory comes from a [`RawAlloc`](alloc::RawAlloc), by default the global
//! allocator. A [`BudgetAlloc`](budget::BudgetAlloc) bounds the bytes held by
//! every array that shares it.

pub mod alloc;
pub mod array;
pub mod budget;
pub mod error;

pub use array::{DEFAULT_ALIGNMENT, DynArray};
pub use error::{AllocError, ResizeError, Result};
