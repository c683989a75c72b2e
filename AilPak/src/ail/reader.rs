//! AIL archive reader
//!
//! Parsing happens in two steps. [`AilReader::read_slot_table`] turns the size
//! table into entries and validates their placement, then
//! [`AilReader::classify_entries`] inspects each entry's micro-header and
//! payload signature. Both finish before any entry data is handed out, so a
//! malformed archive is rejected as a whole.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use super::naming::entry_name;
use super::signature::detect_extension_from_bytes;
use super::{
    AilEntry, ArchiveInfo, EMPTY_SLOT, EXTRACT_CHUNK_SIZE, MAX_SLOT_COUNT, MAX_TRAILING_BYTES,
    MicroHeader, SIGNATURE_PREVIEW_LEN, slot_table_len,
};
use crate::compression::lzss;
use crate::error::{Error, Result};

/// AIL archive reader
pub struct AilReader<R: Read + Seek> {
    reader: BufReader<R>,
    /// Archive file name without extension, used to name entries
    base_name: String,
    file_len: u64,
    slot_sizes: Vec<u32>,
    entries: Vec<AilEntry>,
    /// Offset just past the last entry
    end_offset: u64,
    classified: bool,
}

impl AilReader<File> {
    /// Open an archive on disk, naming entries after its file stem
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let base_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::new(File::open(path)?, base_name))
    }
}

impl<R: Read + Seek> AilReader<R> {
    /// Create a new reader from a Read + Seek source
    #[must_use]
    pub fn new(reader: R, base_name: impl Into<String>) -> Self {
        Self {
            reader: BufReader::new(reader),
            base_name: base_name.into(),
            file_len: 0,
            slot_sizes: Vec::new(),
            entries: Vec::new(),
            end_offset: 0,
            classified: false,
        }
    }

    /// Read and validate the slot table
    ///
    /// Entries returned here still include their micro-headers; call
    /// [`Self::classify_entries`] to resolve them.
    ///
    /// # Errors
    /// Returns an error if reading fails or the table is not a plausible AIL
    /// slot table: bad slot count, a slot past the end of the file, no
    /// entries at all, or more than [`MAX_TRAILING_BYTES`] left over.
    pub fn read_slot_table(&mut self) -> Result<&[AilEntry]> {
        self.file_len = self.reader.seek(SeekFrom::End(0))?;
        self.reader.seek(SeekFrom::Start(0))?;

        if self.file_len < 4 {
            return Err(Error::TruncatedSlotTable {
                needed: 4,
                file_len: self.file_len,
            });
        }

        let count = self.reader.read_u32::<LittleEndian>()?;
        if count == 0 || count > MAX_SLOT_COUNT {
            return Err(Error::InvalidSlotCount { count });
        }

        let mut offset = slot_table_len(count);
        if offset > self.file_len {
            return Err(Error::TruncatedSlotTable {
                needed: offset,
                file_len: self.file_len,
            });
        }

        let mut sizes = vec![0u32; count as usize];
        self.reader.read_u32_into::<LittleEndian>(&mut sizes)?;

        let mut entries = Vec::new();
        for (index, &size) in (0u32..).zip(&sizes) {
            if size == 0 || size == EMPTY_SLOT {
                continue;
            }

            if offset + u64::from(size) > self.file_len {
                return Err(Error::SlotOutOfBounds {
                    index,
                    offset,
                    size,
                    file_len: self.file_len,
                });
            }

            entries.push(AilEntry {
                index,
                name: entry_name(&self.base_name, index, None),
                offset,
                size,
                unpacked_size: 0,
                is_packed: false,
            });
            offset += u64::from(size);
        }

        let trailing = self.file_len - offset;
        if entries.is_empty() {
            return Err(Error::NoEntries);
        }
        if trailing > MAX_TRAILING_BYTES {
            return Err(Error::ExcessTrailingData { trailing });
        }

        tracing::debug!(
            "Slot table: {} slots, {} entries, {} trailing bytes",
            count,
            entries.len(),
            trailing
        );

        self.slot_sizes = sizes;
        self.entries = entries;
        self.end_offset = offset;
        self.classified = false;

        Ok(&self.entries)
    }

    /// Resolve micro-headers and detect file types
    ///
    /// Moves each entry's offset past its micro-header, marks compressed
    /// entries, and appends an extension to names whose payload starts with
    /// a known signature.
    ///
    /// # Errors
    /// Returns an error if the slot table hasn't been read, reading fails, or
    /// an entry is too short for its micro-header.
    pub fn classify_entries(&mut self) -> Result<&[AilEntry]> {
        if self.entries.is_empty() {
            return Err(Error::NoEntries);
        }
        if self.classified {
            return Ok(&self.entries);
        }

        let mut entries = std::mem::take(&mut self.entries);
        for entry in &mut entries {
            self.classify_entry(entry)?;
        }
        self.entries = entries;
        self.classified = true;

        Ok(&self.entries)
    }

    fn classify_entry(&mut self, entry: &mut AilEntry) -> Result<()> {
        let too_small = Error::EntryTooSmall {
            index: entry.index,
            size: entry.size,
        };

        let mut prefix = [0u8; 8];
        let peek_len = (entry.size as usize).min(prefix.len());
        self.reader.seek(SeekFrom::Start(entry.offset))?;
        self.reader.read_exact(&mut prefix[..peek_len])?;

        let Some(header) = MicroHeader::classify(&prefix[..peek_len]) else {
            return Err(too_small);
        };
        let header_len = header.encoded_len();
        if entry.size < header_len {
            return Err(too_small);
        }

        match header {
            MicroHeader::Packed { unpacked_size } => {
                entry.is_packed = true;
                entry.unpacked_size = unpacked_size;
            }
            MicroHeader::Unknown => {
                tracing::warn!(
                    "{}: unrecognised entry header {:02x?}, reading as stored data",
                    entry.name,
                    &prefix[..4]
                );
            }
            MicroHeader::Stored => {}
        }

        entry.offset += u64::from(header_len);
        entry.size -= header_len;

        let extension = self.sniff_extension(entry)?;
        if let Some(ext) = extension {
            entry.name = entry_name(&self.base_name, entry.index, Some(ext));
        }

        tracing::debug!(
            "{}: offset {}, size {}, packed {}",
            entry.name,
            entry.offset,
            entry.size,
            entry.is_packed
        );

        Ok(())
    }

    /// Look up the extension implied by the first payload bytes
    fn sniff_extension(&mut self, entry: &AilEntry) -> Result<Option<&'static str>> {
        let preview_len = entry.size.min(SIGNATURE_PREVIEW_LEN) as usize;
        let mut preview = vec![0u8; preview_len];
        self.reader.seek(SeekFrom::Start(entry.offset))?;
        self.reader.read_exact(&mut preview)?;

        if entry.is_packed {
            // a 16-byte prefix of the stream always yields at least 4 output bytes
            preview = lzss::decompress(&preview);
        }

        Ok(detect_extension_from_bytes(&preview))
    }

    /// List entries without extracting them
    ///
    /// Reads and classifies the slot table on first use.
    ///
    /// # Errors
    /// Returns an error if the archive is malformed or cannot be read.
    pub fn list_entries(&mut self) -> Result<Vec<AilEntry>> {
        if self.entries.is_empty() {
            self.read_slot_table()?;
        }
        self.classify_entries()?;

        Ok(self.entries.clone())
    }

    /// Read an entry's contents, decompressing if needed
    ///
    /// # Errors
    /// Returns an error if reading fails, or [`Error::UnpackedSizeMismatch`] if
    /// a compressed entry does not decompress to its recorded size.
    pub fn read_entry(&mut self, entry: &AilEntry) -> Result<Vec<u8>> {
        self.reader.seek(SeekFrom::Start(entry.offset))?;

        let mut data = vec![0u8; entry.size as usize];
        self.reader.read_exact(&mut data)?;

        if !entry.is_packed {
            return Ok(data);
        }

        let unpacked = lzss::decompress(&data);
        if unpacked.len() != entry.unpacked_size as usize {
            return Err(Error::UnpackedSizeMismatch {
                name: entry.name.clone(),
                expected: entry.unpacked_size,
                actual: unpacked.len(),
            });
        }

        Ok(unpacked)
    }

    /// Write an entry's contents to `writer`
    ///
    /// Stored entries are streamed in [`EXTRACT_CHUNK_SIZE`] chunks; compressed
    /// entries are decompressed in memory and verified before anything is
    /// written. Returns the number of bytes written.
    ///
    /// # Errors
    /// Returns an error if reading or writing fails, or
    /// [`Error::UnpackedSizeMismatch`] for a corrupt compressed entry.
    #[allow(clippy::cast_possible_truncation)]
    pub fn extract_entry<W: Write>(&mut self, entry: &AilEntry, writer: &mut W) -> Result<u64> {
        if entry.is_packed {
            let data = self.read_entry(entry)?;
            writer.write_all(&data)?;
            return Ok(data.len() as u64);
        }

        self.reader.seek(SeekFrom::Start(entry.offset))?;

        let mut buffer = vec![0u8; EXTRACT_CHUNK_SIZE];
        let mut remaining = u64::from(entry.size);
        while remaining > 0 {
            let to_read = remaining.min(EXTRACT_CHUNK_SIZE as u64) as usize;
            let read = self.reader.read(&mut buffer[..to_read])?;
            if read == 0 {
                return Err(Error::UnexpectedEof);
            }
            writer.write_all(&buffer[..read])?;
            remaining -= read as u64;
        }

        Ok(u64::from(entry.size))
    }

    /// Find the entry stored in a slot
    ///
    /// # Errors
    /// Returns [`Error::EntryNotFound`] if the slot is empty or out of range.
    pub fn entry(&mut self, index: u32) -> Result<AilEntry> {
        self.list_entries()?
            .into_iter()
            .find(|e| e.index == index)
            .ok_or(Error::EntryNotFound(index))
    }

    /// Summarize the archive
    ///
    /// # Errors
    /// Returns an error if the archive is malformed or cannot be read.
    pub fn info(&mut self) -> Result<ArchiveInfo> {
        let entries = self.list_entries()?;

        Ok(ArchiveInfo {
            slot_count: self.slot_count().unwrap_or_default(),
            entry_count: entries.len(),
            placeholder_count: self.slot_sizes.len() - entries.len(),
            packed_count: entries.iter().filter(|e| e.is_packed).count(),
            stored_bytes: entries.iter().map(|e| u64::from(e.size)).sum(),
            extracted_bytes: entries.iter().map(|e| u64::from(e.extracted_size())).sum(),
            trailing_bytes: self.file_len - self.end_offset,
        })
    }

    /// Number of slots declared in the table, once read
    #[must_use]
    pub fn slot_count(&self) -> Option<u32> {
        if self.slot_sizes.is_empty() {
            None
        } else {
            u32::try_from(self.slot_sizes.len()).ok()
        }
    }

    /// Raw slot sizes as declared in the table, once read
    #[must_use]
    pub fn slot_sizes(&self) -> &[u32] {
        &self.slot_sizes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::lzss;
    use std::io::Cursor;

    fn archive(slots: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(slots.len() as u32).to_le_bytes());
        for slot in slots {
            out.extend_from_slice(&(slot.len() as u32).to_le_bytes());
        }
        for slot in slots {
            out.extend_from_slice(slot);
        }
        out
    }

    fn stored(data: &[u8]) -> Vec<u8> {
        let mut out = vec![0, 0, 0, 0];
        out.extend_from_slice(data);
        out
    }

    fn packed(data: &[u8]) -> Vec<u8> {
        let mut out = vec![1, 0];
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&lzss::compress(data));
        out
    }

    fn reader(bytes: Vec<u8>) -> AilReader<Cursor<Vec<u8>>> {
        AilReader::new(Cursor::new(bytes), "Gall0")
    }

    #[test]
    fn test_classifies_stored_and_packed() {
        let bitmap = b"BM rest of a bitmap, long enough to compress BM BM BM BM BM BM";
        let bytes = archive(&[&stored(b"plain text"), &[], &packed(bitmap)]);
        let mut reader = reader(bytes);

        let entries = reader.list_entries().unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].name, "Gall0#00000");
        assert_eq!(entries[0].offset, 4 + 12 + 4);
        assert_eq!(entries[0].size, 10);
        assert!(!entries[0].is_packed);

        assert_eq!(entries[1].index, 2);
        assert_eq!(entries[1].name, "Gall0#00002.bmp");
        assert!(entries[1].is_packed);
        assert_eq!(entries[1].unpacked_size as usize, bitmap.len());

        assert_eq!(reader.read_entry(&entries[0]).unwrap(), b"plain text");
        assert_eq!(reader.read_entry(&entries[1]).unwrap(), bitmap);
    }

    #[test]
    fn test_ogg_tag_marks_stored_entry() {
        let mut slot = vec![0x11, 0x22, 0x33, 0x44];
        slot.extend_from_slice(b"OggS and the rest");
        let mut reader = reader(archive(&[&slot]));

        let entries = reader.list_entries().unwrap();
        assert!(!entries[0].is_packed);
        assert_eq!(entries[0].size as usize, slot.len() - 4);
        assert_eq!(entries[0].name, "Gall0#00000.ogg");
    }

    #[test]
    fn test_two_byte_bitmap_gets_extension() {
        let mut reader = reader(archive(&[&stored(b"BM"), &stored(b"B")]));

        let entries = reader.list_entries().unwrap();
        assert_eq!(entries[0].name, "Gall0#00000.bmp");
        assert_eq!(entries[1].name, "Gall0#00001");
        assert_eq!(reader.read_entry(&entries[0]).unwrap(), b"BM");
    }

    #[test]
    fn test_unknown_header_skips_six_bytes() {
        let slot = b"\x07\x00\x00\x00\x00\x00payload";
        let mut reader = reader(archive(&[slot]));

        let entries = reader.list_entries().unwrap();
        assert_eq!(entries[0].size, 7);
        assert_eq!(reader.read_entry(&entries[0]).unwrap(), b"payload");
    }

    #[test]
    fn test_all_ones_slot_is_empty() {
        let mut bytes = archive(&[&stored(b"abcd")]);
        // prepend a 0xFFFFFFFF slot by rebuilding the table by hand
        bytes.splice(0..4, 2u32.to_le_bytes());
        bytes.splice(4..4, u32::MAX.to_le_bytes());
        let mut reader = reader(bytes);

        let entries = reader.list_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].index, 1);
        assert_eq!(entries[0].offset, 4 + 8 + 4);
    }

    #[test]
    fn test_rejects_bad_slot_count() {
        let mut zero = reader(0u32.to_le_bytes().to_vec());
        assert!(matches!(zero.read_slot_table(), Err(Error::InvalidSlotCount { count: 0 })));

        let mut huge = reader(0x10000u32.to_le_bytes().to_vec());
        assert!(matches!(huge.read_slot_table(), Err(Error::InvalidSlotCount { .. })));
    }

    #[test]
    fn test_rejects_truncated_table() {
        let mut short = reader(vec![1, 0]);
        assert!(matches!(short.read_slot_table(), Err(Error::TruncatedSlotTable { .. })));

        let mut bytes = 3u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0; 4]);
        let mut table = reader(bytes);
        assert!(matches!(
            table.read_slot_table(),
            Err(Error::TruncatedSlotTable { needed: 16, .. })
        ));
    }

    #[test]
    fn test_rejects_slot_past_end() {
        let mut bytes = archive(&[&stored(b"abcd"), &stored(b"efgh")]);
        bytes[8..12].copy_from_slice(&1000u32.to_le_bytes());
        let mut reader = reader(bytes);

        assert!(matches!(
            reader.read_slot_table(),
            Err(Error::SlotOutOfBounds { index: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_empty_table() {
        let mut bytes = 2u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0; 8]);
        let mut reader = reader(bytes);
        assert!(matches!(reader.read_slot_table(), Err(Error::NoEntries)));
    }

    #[test]
    fn test_trailing_slack_bound() {
        let mut ok = archive(&[&stored(b"abcd")]);
        ok.resize(ok.len() + MAX_TRAILING_BYTES as usize, 0);
        assert!(reader(ok).read_slot_table().is_ok());

        let mut too_much = archive(&[&stored(b"abcd")]);
        too_much.resize(too_much.len() + MAX_TRAILING_BYTES as usize + 1, 0);
        assert!(matches!(
            reader(too_much).read_slot_table(),
            Err(Error::ExcessTrailingData { .. })
        ));
    }

    #[test]
    fn test_entry_smaller_than_header() {
        let mut reader = reader(archive(&[&[0, 0, 0]]));
        assert!(matches!(
            reader.list_entries(),
            Err(Error::EntryTooSmall { index: 0, size: 3 })
        ));
    }

    #[test]
    fn test_size_mismatch_is_corruption() {
        let mut slot = packed(b"abcdefghijabcdefghij");
        // claim one byte more than the stream decodes to
        slot[2..6].copy_from_slice(&21u32.to_le_bytes());
        let mut reader = reader(archive(&[&slot]));

        let entries = reader.list_entries().unwrap();
        let err = reader.read_entry(&entries[0]).unwrap_err();
        assert!(matches!(
            err,
            Error::UnpackedSizeMismatch { expected: 21, actual: 20, .. }
        ));
    }

    #[test]
    fn test_extract_streams_stored_entry() {
        let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let mut reader = reader(archive(&[&stored(&payload)]));
        let entries = reader.list_entries().unwrap();

        let mut out = Vec::new();
        let written = reader.extract_entry(&entries[0], &mut out).unwrap();
        assert_eq!(written, payload.len() as u64);
        assert_eq!(out, payload);
    }

    #[test]
    fn test_info() {
        let bytes = archive(&[&stored(b"abcd"), &[], &packed(&[b'z'; 64])]);
        let mut reader = reader(bytes);

        let info = reader.info().unwrap();
        assert_eq!(info.slot_count, 3);
        assert_eq!(info.entry_count, 2);
        assert_eq!(info.placeholder_count, 1);
        assert_eq!(info.packed_count, 1);
        assert_eq!(info.extracted_bytes, 4 + 64);
        assert_eq!(info.trailing_bytes, 0);
    }

    #[test]
    fn test_entry_lookup() {
        let mut reader = reader(archive(&[&[], &stored(b"abcd")]));
        assert_eq!(reader.entry(1).unwrap().size, 4);
        assert!(matches!(reader.entry(0), Err(Error::EntryNotFound(0))));
    }
}
