//! The allocator seam of [`DynArray`](crate::DynArray).
//!
//! A buffer never talks to the system allocator directly. It goes through a
//! [`RawAlloc`], which lets callers plug in a bounded allocator (see
//! [`BudgetAlloc`](crate::budget::BudgetAlloc)) or an instrumented one in tests.

use std::{alloc::Layout, ptr::NonNull};

/// Allocate/reallocate/free triad used by [`DynArray`](crate::DynArray).
///
/// Failures are reported as `None`, never by panicking or aborting.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - A block returned by `allocate` or `reallocate` is valid for reads and
///   writes of `layout.size()` bytes and is aligned to `layout.align()`.
/// - A `reallocate` that returns `None` leaves the original block allocated,
///   untouched and still owned by the caller.
/// - A successful `reallocate` preserves the first `min(old, new)` bytes.
pub unsafe trait RawAlloc {
    /// Allocates a block for `layout`. `layout.size()` is never zero.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Allocates a zero-filled block for `layout`. `layout.size()` is never zero.
    fn allocate_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        let ptr = self.allocate(layout)?;
        unsafe { ptr.as_ptr().write_bytes(0, layout.size()) };
        Some(ptr)
    }

    /// Grows or shrinks the block at `ptr` to `new_size` bytes, keeping the
    /// alignment of `old_layout`. Neither size is ever zero.
    ///
    /// # Safety
    ///
    /// `ptr` must denote a block currently allocated by this allocator with
    /// `old_layout`.
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>>;

    /// Releases the block at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must denote a block currently allocated by this allocator with
    /// `layout`.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The process-wide allocator (`std::alloc`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Global;

unsafe impl RawAlloc for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert_ne!(layout.size(), 0);
        NonNull::new(unsafe { std::alloc::alloc(layout) })
    }

    #[inline]
    fn allocate_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert_ne!(layout.size(), 0);
        NonNull::new(unsafe { std::alloc::alloc_zeroed(layout) })
    }

    #[inline]
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        debug_assert_ne!(new_size, 0);
        NonNull::new(unsafe { std::alloc::realloc(ptr.as_ptr(), old_layout, new_size) })
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

unsafe impl<A: RawAlloc + ?Sized> RawAlloc for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).allocate(layout)
    }

    #[inline]
    fn allocate_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).allocate_zeroed(layout)
    }

    #[inline]
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        unsafe { (**self).reallocate(ptr, old_layout, new_size) }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { (**self).deallocate(ptr, layout) }
    }
}

/// Layout of a payload holding `elements` items of `element_size` bytes.
///
/// Returns `None` when the byte size overflows or exceeds what a `Layout`
/// can describe.
pub(crate) fn payload_layout(
    elements: usize,
    element_size: usize,
    alignment: usize,
) -> Option<Layout> {
    let size = elements.checked_mul(element_size)?;
    Layout::from_size_align(size, alignment).ok()
}

/// A well-aligned, non-null pointer for zero-byte payloads. Never dereferenced
/// for more than zero bytes and never handed to an allocator.
#[inline]
pub(crate) fn dangling(alignment: usize) -> NonNull<u8> {
    debug_assert!(alignment.is_power_of_two());
    NonNull::new(std::ptr::without_provenance_mut(alignment)).unwrap_or(NonNull::dangling())
}

#[inline]
pub(crate) fn is_aligned(ptr: *const u8, alignment: usize) -> bool {
    alignment.is_power_of_two() && ((ptr as usize) & (alignment - 1)) == 0
}
