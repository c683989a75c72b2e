//! AIL archive operations

mod helpers;
mod operations;

pub use helpers::{default_output_dir, find_input_files};
pub use operations::AilOperations;

use super::AilProgress;

/// Progress callback for AIL operations.
///
/// Receives an [`AilProgress`] struct with phase, current/total counts, and optional filename.
///
/// # Example
/// ```no_run
/// use ailpak::ail::{AilOperations, AilPhase};
///
/// AilOperations::extract_with_progress("Gall0.ail", "Gall0", &|progress| {
///     match progress.phase {
///         AilPhase::ReadingTable => println!("Reading slot table..."),
///         AilPhase::ExtractingFiles => {
///             println!("{}/{}: {:?}", progress.current, progress.total, progress.current_file);
///         }
///         _ => {}
///     }
/// })?;
/// # Ok::<(), ailpak::Error>(())
/// ```
pub type ProgressCallback<'a> = &'a dyn Fn(&AilProgress);
