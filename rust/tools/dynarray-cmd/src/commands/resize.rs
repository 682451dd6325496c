//! Resize command implementation

use anyhow::{Context, Result};
use dynarray::{
    DynArray,
    alloc::{Global, RawAlloc},
    budget::{Budget, BudgetAlloc},
};

use crate::{commands::print_metadata, utils};

pub struct ResizeArgs {
    pub element_size: usize,
    pub capacity: usize,
    pub to: usize,
    pub zero: bool,
    pub fill: Option<u8>,
    pub budget: Option<usize>,
}

pub fn run(args: ResizeArgs) -> Result<()> {
    anyhow::ensure!(args.element_size > 0, "Element size must be non-zero");

    match args.budget {
        Some(limit) => {
            let alloc = BudgetAlloc::new(Budget::new(limit));
            resize_in(&args, &alloc)?;
            log::debug!("budget after release: {:?}", alloc.budget());
            Ok(())
        }
        None => resize_in(&args, Global),
    }
}

fn resize_in<A: RawAlloc>(args: &ResizeArgs, alloc: A) -> Result<()> {
    let mut array = DynArray::new_in(args.element_size, args.capacity, alloc)
        .context("Failed to create array")?;
    if let Some(byte) = args.fill {
        array.fill(byte);
    }
    print_metadata(&array);

    let result = if args.zero {
        array.resize_zeroed(args.to)
    } else {
        array.resize(args.to)
    };

    let array = match result {
        Ok(array) => array,
        Err(err) => {
            println!("resize failed: {err}");
            let array = err.into_inner();
            println!("original array left intact:");
            print_metadata(&array);
            print!("{}", utils::hex_dump(&array, array.element_size()));
            return Ok(());
        }
    };

    print_metadata(&array);
    print!("{}", utils::hex_dump(&array, array.element_size()));
    println!("payload: {}", utils::format_size(array.byte_len() as u64));
    array.release();
    Ok(())
}
