//! AIL archive writer with progress callbacks

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};

use super::ail_tools::ProgressCallback;
use super::naming::parse_slot_index;
use super::{
    AilPhase, AilProgress, EMPTY_SLOT, MAX_SLOT_COUNT, MIN_COMPRESS_SIZE, MicroHeader, PackEntry,
};
use crate::compression::lzss;
use crate::error::{Error, Result};

/// AIL archive writer
///
/// Every input file name must carry a `#NNNNN` slot token. Slots between 0
/// and the highest index that no file claims are written as empty
/// placeholders.
#[derive(Debug)]
pub struct AilWriter {
    /// One entry per slot, in slot order
    entries: Vec<PackEntry>,
    /// Try LZSS compression on each entry
    compress: bool,
}

impl AilWriter {
    /// Create a writer for the given input files
    ///
    /// # Errors
    /// Returns [`Error::EmptyFileList`] for an empty list,
    /// [`Error::InvalidEntryName`] for a file without a slot token,
    /// [`Error::DuplicateSlot`] if two files claim the same slot, or
    /// [`Error::TooManySlots`] if the highest slot index is out of range.
    pub fn new<P: AsRef<Path>>(files: &[P]) -> Result<Self> {
        if files.is_empty() {
            return Err(Error::EmptyFileList);
        }

        let mut slots: BTreeMap<u32, PathBuf> = BTreeMap::new();
        for file in files {
            let path = file.as_ref();
            let index = parse_slot_index(path).ok_or_else(|| Error::InvalidEntryName {
                path: path.to_path_buf(),
            })?;

            if let Some(first) = slots.insert(index, path.to_path_buf()) {
                return Err(Error::DuplicateSlot {
                    index,
                    first,
                    second: path.to_path_buf(),
                });
            }
        }

        let max_index = slots.keys().next_back().copied().unwrap_or_default();
        if max_index >= MAX_SLOT_COUNT {
            return Err(Error::TooManySlots {
                count: max_index + 1,
                max: MAX_SLOT_COUNT,
            });
        }

        let entries: Vec<PackEntry> = (0..=max_index)
            .map(|index| PackEntry {
                index,
                file_path: slots.remove(&index),
            })
            .collect();

        for entry in entries.iter().filter(|e| e.is_placeholder()) {
            tracing::debug!("Slot #{:05} has no input file, writing a placeholder", entry.index);
        }

        Ok(Self {
            entries,
            compress: true,
        })
    }

    /// Enable or disable LZSS compression (enabled by default)
    #[must_use]
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Slots with no input file
    #[must_use]
    pub fn placeholder_indices(&self) -> Vec<u32> {
        self.entries
            .iter()
            .filter(|e| e.is_placeholder())
            .map(|e| e.index)
            .collect()
    }

    /// Number of slots the archive will declare
    #[must_use]
    pub fn slot_count(&self) -> u32 {
        self.entries.last().map_or(0, |e| e.index + 1)
    }

    /// All slots, placeholders included
    #[must_use]
    pub fn entries(&self) -> &[PackEntry] {
        &self.entries
    }

    /// Write the archive
    ///
    /// # Errors
    /// Returns an error if an input file cannot be read or the output cannot
    /// be written. The partial output file is removed on failure.
    pub fn write(&self, output_path: impl AsRef<Path>) -> Result<()> {
        self.write_with_progress(output_path, &|_| {})
    }

    /// Write the archive with progress callback
    ///
    /// # Errors
    /// Returns an error if an input file cannot be read, is too large for a
    /// slot, changes between the two passes, or the output cannot be written.
    /// The partial output file is removed on failure.
    pub fn write_with_progress(
        &self,
        output_path: impl AsRef<Path>,
        progress: ProgressCallback,
    ) -> Result<()> {
        let output_path = output_path.as_ref();

        if let Some(parent) = output_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(
            "Packing {} slots into {}",
            self.slot_count(),
            output_path.display()
        );

        let mut output = BufWriter::new(File::create(output_path)?);
        let result = self
            .write_to(&mut output, progress)
            .and_then(|()| output.flush().map_err(Error::from));
        drop(output);

        if let Err(err) = result {
            if let Err(remove_err) = fs::remove_file(output_path) {
                tracing::warn!(
                    "Failed to remove partial archive {}: {}",
                    output_path.display(),
                    remove_err
                );
            }
            return Err(err);
        }

        progress(&AilProgress::new(AilPhase::Complete, 1, 1));
        Ok(())
    }

    /// Write the archive bytes to any writer
    ///
    /// Input files are read twice: once to size the slot table and once to
    /// emit the entry data.
    ///
    /// # Errors
    /// Same conditions as [`Self::write_with_progress`], without the cleanup.
    pub fn write_to<W: Write>(&self, output: &mut W, progress: ProgressCallback) -> Result<()> {
        let total = self.entries.len();
        output.write_u32::<LittleEndian>(self.slot_count())?;

        let mut declared = Vec::with_capacity(total);
        for (i, entry) in self.entries.iter().enumerate() {
            let size = match &entry.file_path {
                None => 0,
                Some(path) => {
                    progress(&AilProgress::with_file(
                        AilPhase::CompressingFiles,
                        i + 1,
                        total,
                        display_name(path),
                    ));
                    let (header, payload) = self.encode_file(path)?;
                    let size = slot_size(path, header, &payload)?;
                    tracing::debug!(
                        "Slot #{:05}: {} ({} bytes, {:?})",
                        entry.index,
                        path.display(),
                        size,
                        header
                    );
                    size
                }
            };
            output.write_u32::<LittleEndian>(size)?;
            declared.push(size);
        }

        let files: Vec<_> = self
            .entries
            .iter()
            .zip(&declared)
            .filter_map(|(e, &size)| e.file_path.as_ref().map(|p| (e.index, p, size)))
            .collect();

        for (i, &(index, path, size)) in files.iter().enumerate() {
            progress(&AilProgress::with_file(
                AilPhase::WritingEntries,
                i + 1,
                files.len(),
                display_name(path),
            ));

            let (header, payload) = self.encode_file(path)?;
            let actual = u64::from(header.encoded_len()) + payload.len() as u64;
            if actual != u64::from(size) {
                return Err(Error::InconsistentEntrySize {
                    index,
                    declared: size,
                    actual,
                });
            }

            output.write_all(&header.to_bytes())?;
            output.write_all(&payload)?;
        }

        Ok(())
    }

    /// Read a file and pick its micro-header and payload
    fn encode_file(&self, path: &Path) -> Result<(MicroHeader, Vec<u8>)> {
        let data = fs::read(path)?;
        let unpacked_size = u32::try_from(data.len()).map_err(|_| Error::EntryTooLarge {
            path: path.to_path_buf(),
            size: data.len() as u64,
        })?;
        Ok(encode_payload(data, unpacked_size, self.compress))
    }
}

/// Compress `data` if that makes it strictly smaller
///
/// Files of [`MIN_COMPRESS_SIZE`] bytes or fewer are always stored.
fn encode_payload(data: Vec<u8>, unpacked_size: u32, compress: bool) -> (MicroHeader, Vec<u8>) {
    if compress && data.len() > MIN_COMPRESS_SIZE {
        let packed = lzss::compress(&data);
        if packed.len() < data.len() {
            return (MicroHeader::Packed { unpacked_size }, packed);
        }
    }
    (MicroHeader::Stored, data)
}

fn slot_size(path: &Path, header: MicroHeader, payload: &[u8]) -> Result<u32> {
    checked_slot_size(path, u64::from(header.encoded_len()) + payload.len() as u64)
}

/// `EMPTY_SLOT` is reserved for empty slots, so it is not a valid size either
fn checked_slot_size(path: &Path, size: u64) -> Result<u32> {
    u32::try_from(size)
        .ok()
        .filter(|&size| size != EMPTY_SLOT)
        .ok_or_else(|| Error::EntryTooLarge {
            path: path.to_path_buf(),
            size,
        })
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.to_string_lossy().to_string(),
        |n| n.to_string_lossy().to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_inputs(files: &[(&str, &[u8])]) -> (TempDir, Vec<PathBuf>) {
        let dir = TempDir::new().unwrap();
        let paths = files
            .iter()
            .map(|(name, data)| {
                let path = dir.path().join(name);
                fs::write(&path, data).unwrap();
                path
            })
            .collect();
        (dir, paths)
    }

    fn pack(writer: &AilWriter) -> Vec<u8> {
        let mut out = Vec::new();
        writer.write_to(&mut out, &|_| {}).unwrap();
        out
    }

    #[test]
    fn test_new_rejects_bad_input() {
        let empty: &[&str] = &[];
        assert!(matches!(AilWriter::new(empty), Err(Error::EmptyFileList)));
        assert!(matches!(
            AilWriter::new(&["notes.bin"]),
            Err(Error::InvalidEntryName { .. })
        ));
        assert!(matches!(
            AilWriter::new(&["a#00001.bin", "b#00001.png"]),
            Err(Error::DuplicateSlot { index: 1, .. })
        ));
        assert!(matches!(
            AilWriter::new(&["a#65535.bin"]),
            Err(Error::TooManySlots { count: 65536, .. })
        ));
        assert!(AilWriter::new(&["a#65534.bin"]).is_ok());
    }

    #[test]
    fn test_placeholders() {
        let writer = AilWriter::new(&["x/a#00002.bin", "x/a#00000.bin"]).unwrap();
        assert_eq!(writer.slot_count(), 3);
        assert_eq!(writer.placeholder_indices(), vec![1]);
        assert!(writer.entries()[1].is_placeholder());
        assert_eq!(
            writer.entries()[0].file_path.as_deref(),
            Some(Path::new("x/a#00000.bin"))
        );
    }

    #[test]
    fn test_each_gap_is_reported_once() {
        let writer = AilWriter::new(&["b#00004", "b#00001", "b#00006"]).unwrap();
        assert_eq!(writer.placeholder_indices(), vec![0, 2, 3, 5]);

        let placeholders = writer.entries().iter().filter(|e| e.is_placeholder()).count();
        assert_eq!(placeholders, writer.placeholder_indices().len());
    }

    #[test]
    fn test_small_file_is_stored() {
        let (_dir, paths) = write_inputs(&[("a#00000", b"hi")]);
        let out = pack(&AilWriter::new(&paths).unwrap());
        assert_eq!(out, [1, 0, 0, 0, 6, 0, 0, 0, 0, 0, 0, 0, b'h', b'i']);
    }

    #[test]
    fn test_compressible_file_is_packed() {
        let data = [b'a'; 64];
        let (_dir, paths) = write_inputs(&[("a#00000.bin", &data)]);
        let out = pack(&AilWriter::new(&paths).unwrap());

        let size = u32::from_le_bytes(out[4..8].try_into().unwrap()) as usize;
        assert_eq!(size, out.len() - 8);
        assert_eq!(&out[8..10], &[1, 0]);
        assert_eq!(u32::from_le_bytes(out[10..14].try_into().unwrap()), 64);
        assert_eq!(lzss::decompress(&out[14..]), data);
    }

    #[test]
    fn test_incompressible_file_is_stored() {
        let (_dir, paths) = write_inputs(&[("a#00000.bin", b"abcdefghi")]);
        let out = pack(&AilWriter::new(&paths).unwrap());
        assert_eq!(u32::from_le_bytes(out[4..8].try_into().unwrap()), 13);
        assert_eq!(&out[8..12], &[0, 0, 0, 0]);
        assert_eq!(&out[12..], b"abcdefghi");
    }

    #[test]
    fn test_compression_disabled() {
        let (_dir, paths) = write_inputs(&[("a#00000.bin", &[b'a'; 64])]);
        let out = pack(&AilWriter::new(&paths).unwrap().with_compression(false));
        assert_eq!(u32::from_le_bytes(out[4..8].try_into().unwrap()), 68);
        assert_eq!(out.len(), 8 + 68);
    }

    #[test]
    fn test_placeholder_slot_has_zero_size() {
        let (_dir, paths) = write_inputs(&[("a#00000", b"one"), ("a#00002", b"two")]);
        let out = pack(&AilWriter::new(&paths).unwrap());
        assert_eq!(u32::from_le_bytes(out[0..4].try_into().unwrap()), 3);
        assert_eq!(u32::from_le_bytes(out[8..12].try_into().unwrap()), 0);
        assert_eq!(out.len(), 16 + 7 + 7);
    }

    #[test]
    fn test_failed_write_removes_output() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone#00000.bin");
        let output = dir.path().join("out.ail");

        let writer = AilWriter::new(&[&missing]).unwrap();
        let err = writer.write(&output).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_slot_size_limit() {
        let path = Path::new("big#00000.bin");
        assert_eq!(checked_slot_size(path, u64::from(u32::MAX) - 1).unwrap(), u32::MAX - 1);
        assert!(matches!(
            checked_slot_size(path, u64::from(u32::MAX)),
            Err(Error::EntryTooLarge { size, .. }) if size == u64::from(u32::MAX)
        ));
        assert!(matches!(
            checked_slot_size(path, u64::from(u32::MAX) + 1),
            Err(Error::EntryTooLarge { .. })
        ));
        assert_eq!(slot_size(path, MicroHeader::Stored, b"abc").unwrap(), 7);
    }
}
