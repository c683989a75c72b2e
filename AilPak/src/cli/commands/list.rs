//! CLI command for listing AIL archive contents

use std::path::Path;

use crate::ail::AilOperations;
use crate::cli::progress::format_size;

pub fn execute(source: &Path, detailed: bool) -> anyhow::Result<()> {
    let entries = AilOperations::list(source)?;

    if !detailed {
        for entry in &entries {
            println!("{}", entry.name);
        }
        return Ok(());
    }

    println!("{:>6}  {:>10}  {:>10}  {:>6}  NAME", "SLOT", "SIZE", "STORED", "RATIO");

    for entry in &entries {
        let ratio = if entry.extracted_size() > 0 {
            (f64::from(entry.size) / f64::from(entry.extracted_size())) * 100.0
        } else {
            100.0
        };

        println!(
            "{:>6}  {:>10}  {:>10}  {:>5.1}%  {}",
            entry.index,
            format_size(u64::from(entry.extracted_size())),
            format_size(u64::from(entry.size)),
            ratio,
            entry.name
        );
    }

    let total_extracted: u64 = entries.iter().map(|e| u64::from(e.extracted_size())).sum();
    let total_stored: u64 = entries.iter().map(|e| u64::from(e.size)).sum();

    println!();
    println!(
        "{} files, {} total ({} stored)",
        entries.len(),
        format_size(total_extracted),
        format_size(total_stored)
    );

    Ok(())
}
