use dynarray::{
    AllocError, DynArray,
    budget::{Budget, BudgetAlloc},
};

/// Create, write one element, read it back, release.
#[test]
fn test_create_write_release() {
    let mut array = DynArray::new(8, 10).expect("create");
    assert_eq!(array.capacity(), 10);
    assert_eq!(array.element_size(), 8);

    array.typed_data_mut::<u64>()[0] = 69;
    assert_eq!(array.typed_data::<u64>()[0], 69);

    assert_eq!(array.capacity(), 10);
    assert_eq!(array.element_size(), 8);
    array.release();
}

/// Growing with zeroing clears exactly the added elements.
#[test]
fn test_grow_zeroed() {
    let mut array = DynArray::new(4, 4).expect("create");
    array
        .typed_data_mut::<u32>()
        .copy_from_slice(&[0xdead_beef, 1, 2, 3]);

    let array = array.resize_zeroed(8).expect("resize");
    assert_eq!(array.capacity(), 8);
    assert_eq!(array.element_size(), 4);
    assert_eq!(
        array.typed_data::<u32>(),
        &[0xdead_beef, 1, 2, 3, 0, 0, 0, 0]
    );
    for i in 4..8 {
        assert!(array.element(i).iter().all(|&b| b == 0));
    }
}

/// A refused resize leaves the original array usable at its old capacity.
#[test]
fn test_failed_resize_keeps_capacity() {
    let alloc = BudgetAlloc::new(Budget::new(64));
    let mut array = DynArray::new_in(8, 5, &alloc).expect("create");
    array.fill(7);

    let err = array.resize(100).expect_err("budget must refuse");
    assert_eq!(err.error(), AllocError { elements: 100, element_size: 8 });
    assert_eq!(
        err.to_string(),
        "failed to allocate 100 elements of 8 bytes"
    );

    let array = err.into_inner();
    assert_eq!(array.capacity(), 5);
    assert_eq!(array.element_size(), 8);
    assert!(array.iter().all(|&b| b == 7));
    assert_eq!(alloc.budget().used(), 40);
}

/// An empty array is valid: filling it is a no-op and it can be released.
#[test]
fn test_empty_array() {
    let mut array = DynArray::new(1, 0).expect("create");
    assert_eq!(array.capacity(), 0);
    assert!(array.is_empty());
    array.fill(0xff);
    array.zero();
    assert!(array.as_slice().is_empty());
    array.release();
}

#[test]
fn test_capacity_tracks_resizes() {
    let mut array = DynArray::of::<u16>(3).expect("create");
    for new_capacity in [0, 1, 7, 7, 100, 2, 0, 5] {
        array = array.resize(new_capacity).expect("resize");
        assert_eq!(array.capacity(), new_capacity);
        assert_eq!(array.element_size(), 2);
        assert_eq!(array.typed_data::<u16>().len(), new_capacity);
    }
}

#[test]
fn test_growth_preserves_values() {
    let mut array = DynArray::of::<i64>(16).expect("create");
    for (i, v) in array.typed_data_mut::<i64>().iter_mut().enumerate() {
        *v = -(i as i64) * 1000;
    }

    let array = array.resize(4096).expect("resize");
    for i in 0..16 {
        assert_eq!(array.typed_data::<i64>()[i], -(i as i64) * 1000);
    }
}

#[test]
fn test_fill_pattern_across_sizes() {
    for capacity in [0, 1, 16, 4096] {
        let mut array = DynArray::new(8, capacity).expect("create");
        array.fill(0xff);
        assert!(array.iter().all(|&b| b == 0xff));
        assert!(array.typed_data::<u64>().iter().all(|&v| v == u64::MAX));
        array.zero();
        array.zero();
        assert!(array.iter().all(|&b| b == 0));
    }
}

#[test]
fn test_shared_budget_across_arrays() {
    let budget = Budget::new(1024);
    let alloc = BudgetAlloc::new(budget.clone());

    let a = DynArray::new_in(16, 32, &alloc).expect("create");
    let b = DynArray::new_in(16, 32, &alloc).expect("create");
    assert_eq!(budget.remaining(), 0);
    assert!(DynArray::new_in(1, 1, &alloc).is_err());

    let a = a.resize(8).expect("shrink");
    assert_eq!(budget.used(), 512 + 128);

    let b = b.resize_zeroed(56).expect("grow within the freed bytes");
    assert_eq!(budget.remaining(), 0);

    drop(a);
    drop(b);
    assert_eq!(budget.used(), 0);
}
