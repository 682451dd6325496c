use thiserror::Error;

use crate::{DynArray, alloc::RawAlloc};

/// The allocator could not satisfy a request for `elements * element_size` bytes.
///
/// This is the only failure a [`DynArray`] reports. Size computations that
/// overflow are folded into it: such a request can never be satisfied either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("failed to allocate {elements} elements of {element_size} bytes")]
pub struct AllocError {
    /// Number of elements requested.
    pub elements: usize,
    /// Byte size of a single element.
    pub element_size: usize,
}

impl AllocError {
    pub(crate) fn new(elements: usize, element_size: usize) -> AllocError {
        AllocError {
            elements,
            element_size,
        }
    }
}

pub type Result<T, E = AllocError> = std::result::Result<T, E>;

/// A failed resize.
///
/// Carries the original array, which is left exactly as it was before the
/// call: same block, same capacity, same contents.
#[derive(Error)]
#[error("{error}")]
pub struct ResizeError<A: RawAlloc> {
    array: DynArray<A>,
    #[source]
    error: AllocError,
}

impl<A: RawAlloc> ResizeError<A> {
    pub(crate) fn new(array: DynArray<A>, error: AllocError) -> Self {
        ResizeError { array, error }
    }

    /// Returns the cause of the failure.
    pub fn error(&self) -> AllocError {
        self.error
    }

    /// Returns a reference to the untouched original array.
    pub fn array(&self) -> &DynArray<A> {
        &self.array
    }

    /// Consumes the error, handing back the original array.
    pub fn into_inner(self) -> DynArray<A> {
        self.array
    }

    /// Splits the error into the original array and the cause.
    pub fn into_parts(self) -> (DynArray<A>, AllocError) {
        (self.array, self.error)
    }
}

impl<A: RawAlloc> std::fmt::Debug for ResizeError<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeError")
            .field("error", &self.error)
            .field("capacity", &self.array.capacity())
            .field("element_size", &self.array.element_size())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_error_message() {
        let err = AllocError::new(12, 8);
        assert_eq!(err.to_string(), "failed to allocate 12 elements of 8 bytes");
    }

    #[test]
    fn test_resize_error_keeps_array() {
        let mut array = DynArray::new(4, 3).unwrap();
        array.fill(0x5a);
        let err = ResizeError::new(array, AllocError::new(usize::MAX, 4));
        assert_eq!(err.error().elements, usize::MAX);
        assert_eq!(err.array().capacity(), 3);
        assert!(format!("{err:?}").contains("capacity"));

        let (array, cause) = err.into_parts();
        assert_eq!(cause, AllocError::new(usize::MAX, 4));
        assert!(array.iter().all(|&b| b == 0x5a));
    }
}
