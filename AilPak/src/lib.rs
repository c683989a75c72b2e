//! # `AilPak`
//!
//! A pure-Rust library for the AIL game archive container.
//!
//! An AIL archive is a sparse table of numbered slots. Each non-empty slot
//! holds one file behind a small header, stored raw or compressed with a
//! 4 KiB-window LZSS variant. Archives carry no file names: entries are named
//! `{archive}#{slot:05}` on extraction, and their extensions are recovered
//! from the payload's leading bytes.
//!
//! ## Quick Start
//!
//! ### Unpacking an Archive
//!
//! ```no_run
//! use ailpak::ail::AilOperations;
//!
//! // List slots without extracting
//! let entries = AilOperations::list("Gall0.ail")?;
//! println!("Found {} entries", entries.len());
//!
//! // Extract every entry into Gall0/
//! AilOperations::extract("Gall0.ail", "Gall0")?;
//!
//! // Read a single slot
//! let data = AilOperations::read_entry("Gall0.ail", 3)?;
//! # Ok::<(), ailpak::Error>(())
//! ```
//!
//! ### Packing Files
//!
//! Input files are placed by the `#NNNNN` token in their names:
//!
//! ```no_run
//! use ailpak::ail::AilOperations;
//!
//! let files = AilOperations::find_input_files("Gall0")?;
//! AilOperations::create(&files, "Gall0.ail")?;
//! # Ok::<(), ailpak::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `ailpak` command-line binary

pub mod ail;
pub mod compression;
pub mod error;

// Re-exports for convenience
pub use error::{Error, ErrorKind, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, ErrorKind, Result};

    pub use crate::ail::{
        AilEntry, AilOperations, AilPhase, AilProgress, AilReader, AilWriter, ArchiveInfo,
        detect_extension, find_input_files, parse_slot_index,
    };
    pub use crate::compression::lzss;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
