//! Error types for `AilPak`

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of an [`Error`].
///
/// Lets callers branch on the failure category (bad input, bad archive,
/// corrupt payload, I/O) without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied unusable input (file list, file names).
    InvalidInput,
    /// The archive structure is not a valid AIL container.
    InvalidFormat,
    /// An entry's payload does not decode to its recorded size.
    DataCorruption,
    /// Underlying file system failure.
    Io,
}

/// The error type for `AilPak` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),

    /// Unexpected end of file while reading entry data.
    #[error("unexpected end of file")]
    UnexpectedEof,

    // ==================== Packing Input Errors ====================
    /// No input files were given to the packer.
    #[error("no files provided for packing")]
    EmptyFileList,

    /// An input file name carries no `#NNNNN` slot token.
    #[error("invalid file name: {} (expected basename#NNNNN with a 5-digit slot number)", path.display())]
    InvalidEntryName {
        /// The offending input path.
        path: PathBuf,
    },

    /// Two input files claim the same slot.
    #[error("slot #{index:05} is claimed by both {} and {}", first.display(), second.display())]
    DuplicateSlot {
        /// The contested slot index.
        index: u32,
        /// The first file claiming the slot.
        first: PathBuf,
        /// The second file claiming the slot.
        second: PathBuf,
    },

    /// The highest slot index would produce a slot table the reader rejects.
    #[error("too many slots: {count} (maximum {max})")]
    TooManySlots {
        /// Number of slots the archive would need.
        count: u32,
        /// Largest slot count an archive may declare.
        max: u32,
    },

    /// An input file does not fit in a 32-bit slot size.
    #[error("file {} is too large: {size} bytes", path.display())]
    EntryTooLarge {
        /// The offending input path.
        path: PathBuf,
        /// The file size in bytes.
        size: u64,
    },

    /// A file changed between the sizing pass and the data pass.
    #[error("entry size for slot #{index:05} changed while packing: declared {declared}, wrote {actual}")]
    InconsistentEntrySize {
        /// The slot index.
        index: u32,
        /// Size committed to the slot table.
        declared: u32,
        /// Size produced by the data pass.
        actual: u64,
    },

    // ==================== Archive Format Errors ====================
    /// The slot count is zero or above the sanity bound.
    #[error("invalid slot count: {count}")]
    InvalidSlotCount {
        /// The slot count read from the archive.
        count: u32,
    },

    /// The archive ends before its slot table does.
    #[error("slot table truncated: needs {needed} bytes, file has {file_len}")]
    TruncatedSlotTable {
        /// Bytes the slot table occupies.
        needed: u64,
        /// Archive length in bytes.
        file_len: u64,
    },

    /// A slot's declared size reaches past the end of the archive.
    #[error("invalid entry size at slot {index}: offset {offset} + size {size} exceeds file length {file_len}")]
    SlotOutOfBounds {
        /// The slot index.
        index: u32,
        /// Absolute offset of the slot's data.
        offset: u64,
        /// Declared slot size.
        size: u32,
        /// Archive length in bytes.
        file_len: u64,
    },

    /// Every slot in the table is empty.
    #[error("invalid archive structure: no entries")]
    NoEntries,

    /// Too many bytes follow the last entry for this to be a real slot table.
    #[error("invalid archive structure: {trailing} trailing bytes after the last entry")]
    ExcessTrailingData {
        /// Number of unaccounted bytes at the end of the archive.
        trailing: u64,
    },

    /// An entry is shorter than its micro-header.
    #[error("entry at slot {index} is too small for its header: {size} bytes")]
    EntryTooSmall {
        /// The slot index.
        index: u32,
        /// Declared slot size.
        size: u32,
    },

    // ==================== Entry Data Errors ====================
    /// Decompressed entry length differs from the micro-header's record.
    #[error("size mismatch in {name}: expected {expected}, got {actual}")]
    UnpackedSizeMismatch {
        /// Entry name.
        name: String,
        /// Unpacked size recorded in the micro-header.
        expected: u32,
        /// Length actually produced by decompression.
        actual: usize,
    },

    /// The requested slot holds no entry.
    #[error("no entry at slot #{0:05}")]
    EntryNotFound(u32),
}

impl Error {
    /// Classify this error into the archive error taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::WalkDirError(_) | Self::UnexpectedEof => ErrorKind::Io,
            Self::EmptyFileList
            | Self::InvalidEntryName { .. }
            | Self::DuplicateSlot { .. }
            | Self::TooManySlots { .. }
            | Self::EntryTooLarge { .. }
            | Self::InconsistentEntrySize { .. }
            | Self::EntryNotFound(_) => ErrorKind::InvalidInput,
            Self::InvalidSlotCount { .. }
            | Self::TruncatedSlotTable { .. }
            | Self::SlotOutOfBounds { .. }
            | Self::NoEntries
            | Self::ExcessTrailingData { .. }
            | Self::EntryTooSmall { .. } => ErrorKind::InvalidFormat,
            Self::UnpackedSizeMismatch { .. } => ErrorKind::DataCorruption,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `AilPak` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::EmptyFileList.kind(), ErrorKind::InvalidInput);
        assert_eq!(Error::NoEntries.kind(), ErrorKind::InvalidFormat);
        assert_eq!(
            Error::UnpackedSizeMismatch { name: "a#00000".into(), expected: 4, actual: 3 }.kind(),
            ErrorKind::DataCorruption
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(Error::from(io).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_slot_error_message_names_index() {
        let err = Error::SlotOutOfBounds { index: 7, offset: 40, size: 100, file_len: 64 };
        assert!(err.to_string().contains("slot 7"));
    }
}
