//! Common utilities for dynarray-cmd

use std::fmt::Write;

/// Formats a byte count in human-readable format
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Renders `bytes` as one line per element: the element index followed by its
/// bytes in hex.
pub fn hex_dump(bytes: &[u8], element_size: usize) -> String {
    let mut out = String::new();
    for (index, element) in bytes.chunks(element_size.max(1)).enumerate() {
        let _ = write!(out, "[{index:>4}]");
        for byte in element {
            let _ = write!(out, " {byte:02x}");
        }
        out.push('\n');
    }
    out
}
