use std::{alloc::Layout, ptr::NonNull};

use crate::{
    alloc::{Global, RawAlloc, dangling, is_aligned, payload_layout},
    error::{AllocError, ResizeError, Result},
};

/// A contiguous, type-erased array of `capacity` elements of `element_size` bytes.
///
/// The element size is fixed at creation. The capacity is the visible size of
/// the array: there is no separate length, and every one of the
/// `capacity * element_size` payload bytes can be read and written through
/// [`as_mut_slice`](Self::as_mut_slice), the typed views or `Deref`.
///
/// Resizing consumes the array and hands back a new one, so a stale handle to a
/// relocated block cannot be used. A failed resize hands the original array
/// back inside the [`ResizeError`], unmodified.
///
/// # Contents
///
/// The values of elements produced by [`new`](Self::new) and
/// [`resize`](Self::resize) are unspecified and must be written (e.g. with
/// [`fill`](Self::fill)) before they are interpreted. The bytes are always
/// initialized memory, so the byte views are sound to read, but only
/// [`resize_zeroed`](Self::resize_zeroed) guarantees zeroes in the elements it adds.
pub struct DynArray<A: RawAlloc = Global> {
    ptr: NonNull<u8>,
    capacity: usize,
    element_size: usize,
    alignment: usize,
    alloc: A,
}

/// Alignment of payloads created without an explicit alignment.
pub const DEFAULT_ALIGNMENT: usize = 16;

impl DynArray<Global> {
    /// Creates an array of `capacity` elements of `element_size` bytes each.
    ///
    /// The payload is aligned to [`DEFAULT_ALIGNMENT`].
    /// A zero `capacity` is valid and allocates nothing.
    ///
    /// # Panics
    ///
    /// Panics if `element_size` is zero.
    pub fn new(element_size: usize, capacity: usize) -> Result<DynArray<Global>> {
        Self::new_in(element_size, capacity, Global)
    }

    /// Creates an array whose element size and alignment are those of `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    pub fn of<T>(capacity: usize) -> Result<DynArray<Global>> {
        Self::of_in::<T>(capacity, Global)
    }
}

impl<A: RawAlloc> DynArray<A> {
    /// Creates an array allocated from `alloc`, aligned to
    /// [`DEFAULT_ALIGNMENT`].
    pub fn new_in(element_size: usize, capacity: usize, alloc: A) -> Result<DynArray<A>> {
        Self::with_alignment_in(element_size, DEFAULT_ALIGNMENT, capacity, alloc)
    }

    /// Creates an array for elements of type `T`, allocated from `alloc`.
    pub fn of_in<T>(capacity: usize, alloc: A) -> Result<DynArray<A>> {
        Self::with_alignment_in(
            std::mem::size_of::<T>(),
            std::mem::align_of::<T>(),
            capacity,
            alloc,
        )
    }

    /// Creates an array with an explicit payload alignment.
    ///
    /// # Panics
    ///
    /// Panics if `element_size` is zero or `alignment` is not a power of two.
    pub fn with_alignment_in(
        element_size: usize,
        alignment: usize,
        capacity: usize,
        alloc: A,
    ) -> Result<DynArray<A>> {
        assert!(element_size > 0, "element size must be non-zero");
        assert!(alignment.is_power_of_two(), "alignment must be a power of two");

        let err = AllocError::new(capacity, element_size);
        let layout = payload_layout(capacity, element_size, alignment).ok_or(err)?;
        let ptr = if layout.size() == 0 {
            dangling(alignment)
        } else {
            alloc.allocate_zeroed(layout).ok_or(err)?
        };
        debug_assert!(is_aligned(ptr.as_ptr(), alignment));

        log::trace!(
            "dynarray: created {capacity} x {element_size} bytes at {:p}",
            ptr.as_ptr()
        );
        Ok(DynArray {
            ptr,
            capacity,
            element_size,
            alignment,
            alloc,
        })
    }

    /// Number of elements the array holds.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Byte size of a single element.
    #[inline]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Alignment of the payload in bytes.
    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Size of the payload in bytes: `capacity * element_size`.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.capacity * self.element_size
    }

    /// Returns true if the array holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.capacity == 0
    }

    /// Returns the allocator backing this array.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns a raw pointer to element 0.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Returns a mutable raw pointer to element 0.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Returns the whole payload as bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.byte_len()) }
    }

    /// Returns the whole payload as mutable bytes.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.byte_len()) }
    }

    /// Returns the bytes of element `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity`.
    #[inline]
    pub fn element(&self, index: usize) -> &[u8] {
        let range = self.element_range(index, 1);
        &self.as_slice()[range]
    }

    /// Returns the mutable bytes of element `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity`.
    #[inline]
    pub fn element_mut(&mut self, index: usize) -> &mut [u8] {
        let range = self.element_range(index, 1);
        &mut self.as_mut_slice()[range]
    }

    /// Sets every byte of the payload to `byte`.
    ///
    /// This is a byte-level fill. It is only meaningful for element types whose
    /// representation is a repeated byte pattern (integers, flags, plain structs).
    /// Filling an empty array does nothing.
    pub fn fill(&mut self, byte: u8) {
        self.as_mut_slice().fill(byte);
    }

    /// Sets every byte of the payload to zero.
    pub fn zero(&mut self) {
        self.fill(0);
    }

    /// Sets every byte of elements `start..start + count` to `byte`.
    ///
    /// # Panics
    ///
    /// Panics if the range extends past `capacity`.
    pub fn fill_elements(&mut self, start: usize, count: usize, byte: u8) {
        let range = self.element_range(start, count);
        self.as_mut_slice()[range].fill(byte);
    }

    /// Resizes the array to hold exactly `new_capacity` elements.
    ///
    /// The block may move. Elements below `min(old, new)` capacity keep their
    /// bytes; added elements hold unspecified values and a shrunk tail is released.
    /// Resizing to zero releases the whole block and never fails.
    ///
    /// On failure the original array is returned inside the error, unmodified and
    /// still usable at its old capacity.
    pub fn resize(mut self, new_capacity: usize) -> Result<DynArray<A>, ResizeError<A>> {
        match self.relocate(new_capacity) {
            Ok(()) => Ok(self),
            Err(err) => Err(ResizeError::new(self, err)),
        }
    }

    /// Same as [`resize`](Self::resize), and additionally zeroes every byte of
    /// the added elements when `new_capacity` exceeds the current capacity.
    ///
    /// Shrinking or keeping the same capacity zeroes nothing.
    pub fn resize_zeroed(self, new_capacity: usize) -> Result<DynArray<A>, ResizeError<A>> {
        // `relocate` already clears the bytes it adds; this is the variant that
        // promises it.
        self.resize(new_capacity)
    }

    /// Releases the array and its whole block.
    ///
    /// Equivalent to dropping it.
    pub fn release(self) {
        drop(self);
    }
}

impl<A: RawAlloc> DynArray<A> {
    /// Returns the elements of the payload viewed as a slice of `T`.
    ///
    /// # Panics
    ///
    /// Panics if the payload is not aligned for `T` or its byte length is not
    /// a multiple of `size_of::<T>()`.
    #[inline]
    pub fn typed_data<T>(&self) -> &[T]
    where
        T: bytemuck::AnyBitPattern,
    {
        bytemuck::cast_slice(self.as_slice())
    }

    /// Returns the elements of the payload viewed as a mutable slice of `T`.
    ///
    /// # Panics
    ///
    /// Panics if the payload is not aligned for `T` or its byte length is not
    /// a multiple of `size_of::<T>()`.
    #[inline]
    pub fn typed_data_mut<T>(&mut self) -> &mut [T]
    where
        T: bytemuck::AnyBitPattern + bytemuck::NoUninit,
    {
        bytemuck::cast_slice_mut(self.as_mut_slice())
    }
}

impl<A: RawAlloc> DynArray<A> {
    /// Moves the block to hold `new_capacity` elements, leaving `self`
    /// untouched on failure. Added bytes are zeroed so that the payload is
    /// never uninitialized memory.
    fn relocate(&mut self, new_capacity: usize) -> Result<()> {
        let err = AllocError::new(new_capacity, self.element_size);
        let new_layout =
            payload_layout(new_capacity, self.element_size, self.alignment).ok_or(err)?;
        let old_layout = self.layout();

        let ptr = match (old_layout.size(), new_layout.size()) {
            (0, 0) => self.ptr,
            (0, _) => self.alloc.allocate_zeroed(new_layout).ok_or(err)?,
            (_, 0) => {
                unsafe { self.alloc.deallocate(self.ptr, old_layout) };
                dangling(self.alignment)
            }
            (old_size, new_size) => {
                let ptr = unsafe { self.alloc.reallocate(self.ptr, old_layout, new_size) }
                    .ok_or(err)?;
                if new_size > old_size {
                    unsafe { ptr.as_ptr().add(old_size).write_bytes(0, new_size - old_size) };
                }
                ptr
            }
        };
        debug_assert!(is_aligned(ptr.as_ptr(), self.alignment));

        log::trace!(
            "dynarray: resized {} -> {new_capacity} x {} bytes, {:p} -> {:p}",
            self.capacity,
            self.element_size,
            self.ptr.as_ptr(),
            ptr.as_ptr()
        );
        self.ptr = ptr;
        self.capacity = new_capacity;
        Ok(())
    }

    #[inline]
    fn layout(&self) -> Layout {
        // The same size and alignment were validated when the block was obtained.
        unsafe { Layout::from_size_align_unchecked(self.byte_len(), self.alignment) }
    }

    /// Byte range of elements `start..start + count`.
    #[inline]
    fn element_range(&self, start: usize, count: usize) -> std::ops::Range<usize> {
        let end = start.checked_add(count).expect("add");
        assert!(
            end <= self.capacity,
            "element range end out of bounds: {end} <= {}",
            self.capacity,
        );
        start * self.element_size..end * self.element_size
    }
}

impl<A: RawAlloc> Drop for DynArray<A> {
    fn drop(&mut self) {
        let layout = self.layout();
        if layout.size() != 0 {
            unsafe { self.alloc.deallocate(self.ptr, layout) };
        }
        log::trace!("dynarray: released {:p}", self.ptr.as_ptr());
    }
}

impl<A: RawAlloc> std::ops::Deref for DynArray<A> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<A: RawAlloc> std::ops::DerefMut for DynArray<A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<A: RawAlloc> std::fmt::Debug for DynArray<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynArray")
            .field("element_size", &self.element_size)
            .field("capacity", &self.capacity)
            .field("alignment", &self.alignment)
            .field("byte_len", &self.byte_len())
            .finish_non_exhaustive()
    }
}

unsafe impl<A: RawAlloc + Send> Send for DynArray<A> {}

unsafe impl<A: RawAlloc + Sync> Sync for DynArray<A> {}
