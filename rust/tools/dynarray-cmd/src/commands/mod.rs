//! Command implementations for dynarray-cmd

use dynarray::{DynArray, alloc::RawAlloc};

pub mod demo;
pub mod resize;

/// Prints the metadata of an array, one field per line.
pub fn print_metadata<A: RawAlloc>(array: &DynArray<A>) {
    println!("ALLOCATED: {}", array.capacity());
    println!("ITEM SIZE: {}", array.element_size());
}
