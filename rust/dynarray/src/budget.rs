//! Byte budgets for bounding the memory held by a group of arrays.

use std::{alloc::Layout, cell::Cell, ptr::NonNull, rc::Rc};

use crate::alloc::{Global, RawAlloc};

/// A byte budget that allocations can be charged against.
///
/// Clones share the same counter. The budget is single-threaded; wrap the
/// arrays that use it in external synchronization if they must be shared.
#[derive(Clone)]
pub struct Budget(Rc<BudgetState>);

struct BudgetState {
    limit: usize,
    used: Cell<usize>,
}

impl Budget {
    /// Creates a budget allowing up to `limit` bytes to be held at once.
    pub fn new(limit: usize) -> Budget {
        Budget(Rc::new(BudgetState {
            limit,
            used: Cell::new(0),
        }))
    }

    /// Total number of bytes this budget allows.
    pub fn limit(&self) -> usize {
        self.0.limit
    }

    /// Number of bytes currently charged.
    pub fn used(&self) -> usize {
        self.0.used.get()
    }

    /// Number of bytes that can still be charged.
    pub fn remaining(&self) -> usize {
        self.0.limit - self.0.used.get()
    }

    /// Attempts to charge `amount` bytes. Returns `false`, charging nothing,
    /// when the budget lacks sufficient remaining bytes.
    pub fn try_charge(&self, amount: usize) -> bool {
        if amount > self.remaining() {
            return false;
        }
        self.0.used.set(self.0.used.get() + amount);
        true
    }

    /// Returns `amount` previously charged bytes to the budget.
    pub fn release(&self, amount: usize) {
        let used = self.0.used.get();
        debug_assert!(amount <= used);
        self.0.used.set(used.saturating_sub(amount));
    }
}

impl std::fmt::Debug for Budget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Budget")
            .field("limit", &self.limit())
            .field("used", &self.used())
            .finish()
    }
}

/// A [`RawAlloc`] that charges every byte it hands out against a [`Budget`].
///
/// Requests that would exceed the budget are refused. A refused reallocation
/// leaves both the block and the budget unchanged.
#[derive(Debug, Clone)]
pub struct BudgetAlloc<A = Global> {
    budget: Budget,
    inner: A,
}

impl BudgetAlloc<Global> {
    pub fn new(budget: Budget) -> BudgetAlloc<Global> {
        Self::with_inner(budget, Global)
    }
}

impl<A: RawAlloc> BudgetAlloc<A> {
    /// Creates a budgeted allocator forwarding successful requests to `inner`.
    pub fn with_inner(budget: Budget, inner: A) -> BudgetAlloc<A> {
        BudgetAlloc { budget, inner }
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }
}

unsafe impl<A: RawAlloc> RawAlloc for BudgetAlloc<A> {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if !self.budget.try_charge(layout.size()) {
            return None;
        }
        let ptr = self.inner.allocate(layout);
        if ptr.is_none() {
            self.budget.release(layout.size());
        }
        ptr
    }

    fn allocate_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        if !self.budget.try_charge(layout.size()) {
            return None;
        }
        let ptr = self.inner.allocate_zeroed(layout);
        if ptr.is_none() {
            self.budget.release(layout.size());
        }
        ptr
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        let old_size = old_layout.size();
        let growth = new_size.saturating_sub(old_size);
        if !self.budget.try_charge(growth) {
            return None;
        }
        match unsafe { self.inner.reallocate(ptr, old_layout, new_size) } {
            Some(new_ptr) => {
                self.budget.release(old_size.saturating_sub(new_size));
                Some(new_ptr)
            }
            None => {
                self.budget.release(growth);
                None
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { self.inner.deallocate(ptr, layout) };
        self.budget.release(layout.size());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_charge_and_release() {
        let budget = Budget::new(100);
        assert!(budget.try_charge(60));
        assert_eq!(budget.remaining(), 40);
        assert!(!budget.try_charge(41));
        assert_eq!(budget.used(), 60);
        assert!(budget.try_charge(40));
        assert_eq!(budget.remaining(), 0);
        budget.release(100);
        assert_eq!(budget.used(), 0);
        assert_eq!(budget.limit(), 100);
    }

    #[test]
    fn test_budget_clones_share_counter() {
        let budget = Budget::new(10);
        let other = budget.clone();
        assert!(other.try_charge(7));
        assert_eq!(budget.remaining(), 3);
    }

    #[test]
    fn test_budget_alloc_refuses_over_limit() {
        let alloc = BudgetAlloc::new(Budget::new(128));
        let layout = Layout::from_size_align(256, 8).unwrap();
        assert!(alloc.allocate(layout).is_none());
        assert_eq!(alloc.budget().used(), 0);
    }

    #[test]
    fn test_budget_alloc_tracks_reallocations() {
        let alloc = BudgetAlloc::new(Budget::new(128));
        let layout = Layout::from_size_align(32, 8).unwrap();
        let ptr = alloc.allocate(layout).unwrap();
        assert_eq!(alloc.budget().used(), 32);

        unsafe {
            assert!(alloc.reallocate(ptr, layout, 256).is_none());
            assert_eq!(alloc.budget().used(), 32);

            let ptr = alloc.reallocate(ptr, layout, 96).unwrap();
            assert_eq!(alloc.budget().used(), 96);

            let layout = Layout::from_size_align(96, 8).unwrap();
            let ptr = alloc.reallocate(ptr, layout, 16).unwrap();
            assert_eq!(alloc.budget().used(), 16);

            alloc.deallocate(ptr, Layout::from_size_align(16, 8).unwrap());
        }
        assert_eq!(alloc.budget().used(), 0);
    }
}
