//! CLI command for unpacking an AIL archive

use std::path::Path;
use std::time::Instant;

use crate::ail::{AilOperations, AilPhase, default_output_dir};
use crate::cli::progress::{DISK, LOOKING_GLASS, PACKAGE, print_done, print_step, simple_bar};

pub fn execute(source: &Path, destination: Option<&Path>, progress: bool) -> anyhow::Result<()> {
    let started = Instant::now();
    let destination = destination.map_or_else(|| default_output_dir(source), Path::to_path_buf);

    print_step(1, 3, LOOKING_GLASS, &format!("Reading {}...", source.display()));
    print_step(
        2,
        3,
        PACKAGE,
        &format!("Extracting to {}...", destination.display()),
    );

    let entries = if progress {
        let pb = simple_bar(0, "Extracting");
        let entries = AilOperations::extract_with_progress(source, &destination, &|p| {
            if p.phase == AilPhase::ExtractingFiles {
                pb.set_length(p.total as u64);
                pb.set_position(p.current as u64);
                if let Some(name) = &p.current_file {
                    pb.set_message(name.clone());
                }
            }
        })?;
        pb.finish_and_clear();
        entries
    } else {
        AilOperations::extract(source, &destination)?
    };

    let packed = entries.iter().filter(|e| e.is_packed).count();
    print_step(
        3,
        3,
        DISK,
        &format!("Extracted {} files ({packed} compressed)", entries.len()),
    );
    print_done(started.elapsed());

    Ok(())
}
