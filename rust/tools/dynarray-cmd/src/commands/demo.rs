//! Demo command implementation

use anyhow::{Context, Result};
use dynarray::DynArray;

use crate::commands::print_metadata;

pub fn run() -> Result<()> {
    let mut array = DynArray::of::<u64>(10).context("Failed to create array")?;

    print_metadata(&array);
    println!("arr[0]:    {}", array.typed_data::<u64>()[0]);
    array.typed_data_mut::<u64>()[0] = 69;
    println!("arr[0]:    {}", array.typed_data::<u64>()[0]);
    print_metadata(&array);

    array.release();
    Ok(())
}
