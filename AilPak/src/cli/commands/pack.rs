//! CLI command for packing an AIL archive

use std::path::Path;
use std::time::Instant;

use anyhow::Context;

use crate::ail::{AilOperations, AilPhase, AilWriter};
use crate::cli::progress::{
    DISK, LOOKING_GLASS, PACKAGE, format_size, print_done, print_step, print_warning, simple_bar,
};

pub fn execute(
    source: &Path,
    destination: &Path,
    compress: bool,
    progress: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();

    print_step(1, 3, LOOKING_GLASS, &format!("Scanning {}...", source.display()));
    let files = AilOperations::find_input_files(source)
        .with_context(|| format!("Failed to scan {}", source.display()))?;
    if files.is_empty() {
        anyhow::bail!("No files found in {}", source.display());
    }

    let writer = AilWriter::new(&files)?.with_compression(compress);
    for index in writer.placeholder_indices() {
        print_warning(&format!("Index #{index:05} is missing, writing an empty slot"));
    }

    print_step(
        2,
        3,
        PACKAGE,
        &format!(
            "Packing {} files into {} slots (compression: {})...",
            files.len(),
            writer.slot_count(),
            if compress { "lzss" } else { "none" }
        ),
    );

    if progress {
        // each file is visited once to size it and once to write it
        let pb = simple_bar(2 * files.len() as u64, "Packing");
        writer.write_with_progress(destination, &|p| match p.phase {
            AilPhase::CompressingFiles | AilPhase::WritingEntries => {
                pb.set_message(p.phase.as_str());
                pb.inc(1);
            }
            _ => {}
        })?;
        pb.finish_and_clear();
    } else {
        writer.write(destination)?;
    }

    let size = std::fs::metadata(destination)?.len();
    print_step(
        3,
        3,
        DISK,
        &format!("Wrote {} ({})", destination.display(), format_size(size)),
    );
    print_done(started.elapsed());

    Ok(())
}
