//! AIL archive format reader/writer
//!
//! Layout (little-endian throughout):
//!
//! ```text
//! u32 slot_count
//! u32 size[slot_count]          0 or 0xFFFFFFFF marks an empty slot
//! for each non-empty slot, in index order:
//!     u32 0                      | raw bytes[size - 4]
//!     u16 1, u32 unpacked_size   | lzss bytes[size - 6]
//! ```

mod ail_tools;
mod naming;
mod reader;
mod signature;
mod types;
mod writer;

// Primary public API
pub use ail_tools::{AilOperations, ProgressCallback, default_output_dir, find_input_files};

pub use naming::{SLOT_DIGITS, entry_name, parse_slot_index};
pub use reader::AilReader;
pub use signature::{
    SIGNATURES, detect_extension, detect_extension_from_bytes, signature_for_extension,
};
pub use types::*;
pub use writer::AilWriter;

/// Largest slot count a valid archive may declare
pub const MAX_SLOT_COUNT: u32 = 0xFFFF;

/// Slot size marking an empty slot, alongside 0
pub const EMPTY_SLOT: u32 = u32::MAX;

/// Bytes allowed after the last entry before the slot table is rejected
pub const MAX_TRAILING_BYTES: u64 = 0x80000;

/// Value of the first two bytes of a compressed entry
pub const PACKED_FLAG: u16 = 0x0001;

/// Length of the micro-header in front of a stored entry
pub const STORED_HEADER_LEN: u32 = 4;

/// Length of the micro-header in front of a compressed entry
pub const PACKED_HEADER_LEN: u32 = 6;

/// Files this size or smaller are never compressed
pub const MIN_COMPRESS_SIZE: usize = 8;

/// Raw bytes decompressed to sniff the signature of a packed entry
pub const SIGNATURE_PREVIEW_LEN: u32 = 16;

/// Chunk size for streaming stored entries to disk
pub const EXTRACT_CHUNK_SIZE: usize = 0x8000;

/// Length of the slot table for `slot_count` slots, including the count itself
#[must_use]
pub fn slot_table_len(slot_count: u32) -> u64 {
    4 + 4 * u64::from(slot_count)
}
