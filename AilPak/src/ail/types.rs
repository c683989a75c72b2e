//! Types for AIL archive handling

use std::path::PathBuf;

use super::{PACKED_HEADER_LEN, PACKED_FLAG, STORED_HEADER_LEN};

/// Per-entry header stored in front of each payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicroHeader {
    /// `u32 0`, raw payload follows
    Stored,
    /// `u16 1` and `u32` unpacked length, LZSS payload follows
    Packed {
        /// Length of the payload after decompression
        unpacked_size: u32,
    },
    /// Any other prefix. Read as a raw payload behind a 6-byte header.
    Unknown,
}

impl MicroHeader {
    /// Classify the micro-header at the start of an entry.
    ///
    /// `prefix` holds up to the first eight entry bytes. Bytes 4..8 only
    /// matter for raw Ogg streams: an `OggS` tag there marks the entry as
    /// stored even though its first four bytes are not zero.
    ///
    /// Returns `None` if `prefix` is too short to hold the detected header.
    #[must_use]
    pub fn classify(prefix: &[u8]) -> Option<Self> {
        let head: [u8; 4] = prefix.get(..4)?.try_into().ok()?;
        let value = u32::from_le_bytes(head);

        if value & 0xFFFF == u32::from(PACKED_FLAG) {
            let size: [u8; 4] = prefix.get(2..6)?.try_into().ok()?;
            Some(Self::Packed {
                unpacked_size: u32::from_le_bytes(size),
            })
        } else if value == 0 || prefix.get(4..8) == Some(b"OggS".as_slice()) {
            Some(Self::Stored)
        } else {
            Some(Self::Unknown)
        }
    }

    /// Number of bytes this header occupies in the archive
    #[must_use]
    pub fn encoded_len(self) -> u32 {
        match self {
            Self::Stored => STORED_HEADER_LEN,
            Self::Packed { .. } | Self::Unknown => PACKED_HEADER_LEN,
        }
    }

    /// Serialize the header. `Unknown` has no encoding and writes nothing.
    #[must_use]
    pub fn to_bytes(self) -> Vec<u8> {
        match self {
            Self::Stored => 0u32.to_le_bytes().to_vec(),
            Self::Packed { unpacked_size } => {
                let mut bytes = Vec::with_capacity(PACKED_HEADER_LEN as usize);
                bytes.extend_from_slice(&PACKED_FLAG.to_le_bytes());
                bytes.extend_from_slice(&unpacked_size.to_le_bytes());
                bytes
            }
            Self::Unknown => Vec::new(),
        }
    }
}

/// An entry found in an AIL archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AilEntry {
    /// Slot index in the archive's size table
    pub index: u32,
    /// Output file name: `{archive}#{index:05}` plus a detected extension
    pub name: String,
    /// Absolute offset of the payload (after the micro-header once classified)
    pub offset: u64,
    /// Payload size in bytes (the whole slot until classified)
    pub size: u32,
    /// Decompressed size, only meaningful when `is_packed`
    pub unpacked_size: u32,
    /// Whether the payload is LZSS compressed
    pub is_packed: bool,
}

impl AilEntry {
    /// Size of the entry once extracted
    #[must_use]
    pub fn extracted_size(&self) -> u32 {
        if self.is_packed { self.unpacked_size } else { self.size }
    }
}

/// One slot of an archive being packed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackEntry {
    /// Slot index parsed from the `#NNNNN` token
    pub index: u32,
    /// Source file, `None` for a placeholder slot
    pub file_path: Option<PathBuf>,
}

impl PackEntry {
    /// Returns true if no input file backs this slot
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.file_path.is_none()
    }
}

/// Aggregate statistics about an archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveInfo {
    /// Slots declared in the size table
    pub slot_count: u32,
    /// Slots holding an entry
    pub entry_count: usize,
    /// Empty slots (size 0 or `0xFFFFFFFF`)
    pub placeholder_count: usize,
    /// Entries stored with LZSS compression
    pub packed_count: usize,
    /// Sum of payload sizes as stored
    pub stored_bytes: u64,
    /// Sum of payload sizes once extracted
    pub extracted_bytes: u64,
    /// Bytes after the last entry
    pub trailing_bytes: u64,
}

/// Progress information during archive operations
#[derive(Debug, Clone)]
pub struct AilProgress {
    /// Current operation phase
    pub phase: AilPhase,
    /// Current item number (1-indexed)
    pub current: usize,
    /// Total number of items
    pub total: usize,
    /// Current file being processed (if applicable)
    pub current_file: Option<String>,
}

impl AilProgress {
    /// Create a new progress update
    #[must_use]
    pub fn new(phase: AilPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: None,
        }
    }

    /// Create a progress update with a file/item name
    #[must_use]
    pub fn with_file(
        phase: AilPhase,
        current: usize,
        total: usize,
        file: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: Some(file.into()),
        }
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Phase of an archive operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AilPhase {
    /// Reading and validating the slot table
    ReadingTable,
    /// Classifying micro-headers and sniffing signatures
    DetectingTypes,
    /// Writing entries to disk (during extraction)
    ExtractingFiles,
    /// Checking input file names (during packing)
    ScanningFiles,
    /// Sizing and compressing entries (during packing)
    CompressingFiles,
    /// Writing entry data (during packing)
    WritingEntries,
    /// Operation complete
    Complete,
}

impl AilPhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadingTable => "Reading slot table",
            Self::DetectingTypes => "Detecting file types",
            Self::ExtractingFiles => "Extracting files",
            Self::ScanningFiles => "Scanning files",
            Self::CompressingFiles => "Compressing files",
            Self::WritingEntries => "Writing entries",
            Self::Complete => "Complete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_micro_headers() {
        assert_eq!(MicroHeader::classify(&[0, 0, 0, 0]), Some(MicroHeader::Stored));
        assert_eq!(
            MicroHeader::classify(&[1, 0, 0x10, 0, 0, 0, b'x', b'y']),
            Some(MicroHeader::Packed { unpacked_size: 0x10 })
        );
        assert_eq!(MicroHeader::classify(b"RIFF\0\0\0\0"), Some(MicroHeader::Unknown));
    }

    #[test]
    fn test_short_prefixes() {
        assert_eq!(MicroHeader::classify(&[0, 0, 0]), None);
        // flag present but no room for the unpacked size
        assert_eq!(MicroHeader::classify(&[1, 0, 0, 0, 0]), None);
    }

    #[test]
    fn test_packed_flag_wins_over_ogg_tag() {
        // the flag check comes first; the OggS tag only rescues non-flag prefixes
        assert_eq!(
            MicroHeader::classify(&[1, 0, 5, 0, b'O', b'g', b'g', b'S']),
            Some(MicroHeader::Packed { unpacked_size: 0x674F_0005 })
        );
        assert_eq!(MicroHeader::classify(b"\x07\x07\x07\x07OggS"), Some(MicroHeader::Stored));
    }

    #[test]
    fn test_header_bytes() {
        assert_eq!(MicroHeader::Stored.to_bytes(), vec![0, 0, 0, 0]);
        assert_eq!(
            MicroHeader::Packed { unpacked_size: 0x0102_0304 }.to_bytes(),
            vec![0x01, 0x00, 0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(MicroHeader::Stored.encoded_len(), 4);
        assert_eq!(MicroHeader::Packed { unpacked_size: 9 }.encoded_len(), 6);
    }
}
