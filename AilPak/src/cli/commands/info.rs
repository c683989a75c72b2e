//! CLI command for archive statistics

use std::path::Path;

use console::style;

use crate::ail::AilOperations;
use crate::cli::progress::format_size;

pub fn execute(source: &Path) -> anyhow::Result<()> {
    let info = AilOperations::info(source)?;

    println!("{}", style(source.display()).bold());
    println!("  Slots:        {}", info.slot_count);
    println!("  Entries:      {}", info.entry_count);
    println!("  Placeholders: {}", info.placeholder_count);
    println!("  Compressed:   {}", info.packed_count);
    println!("  Stored size:  {}", format_size(info.stored_bytes));
    println!("  Unpacked:     {}", format_size(info.extracted_bytes));
    if info.trailing_bytes > 0 {
        println!("  Trailing:     {} bytes", info.trailing_bytes);
    }

    Ok(())
}
