//! Core AIL archive operations

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::super::{AilEntry, AilPhase, AilProgress, AilReader, AilWriter, ArchiveInfo};
use super::ProgressCallback;
use super::helpers::find_input_files;
use crate::error::Result;

/// High-level AIL archive operations.
pub struct AilOperations;

impl AilOperations {
    /// Extract an AIL archive to a directory
    ///
    /// Returns the extracted entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the archive cannot be opened or an output file cannot be written.
    /// Returns a format error such as [`Error::InvalidSlotCount`] if the slot table is invalid;
    /// in that case no output is created.
    /// Returns [`Error::UnpackedSizeMismatch`] if a compressed entry is corrupt; extraction
    /// stops at that entry and its file is not created.
    ///
    /// [`Error::Io`]: crate::Error::Io
    /// [`Error::InvalidSlotCount`]: crate::Error::InvalidSlotCount
    /// [`Error::UnpackedSizeMismatch`]: crate::Error::UnpackedSizeMismatch
    pub fn extract<P: AsRef<Path>, Q: AsRef<Path>>(
        archive_path: P,
        output_dir: Q,
    ) -> Result<Vec<AilEntry>> {
        Self::extract_with_progress(archive_path, output_dir, &|_| {})
    }

    /// Extract an AIL archive to a directory with progress callback
    ///
    /// The callback receives [`AilProgress`] with phase and file information.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the archive cannot be opened or an output file cannot be written.
    /// Returns a format error such as [`Error::InvalidSlotCount`] if the slot table is invalid;
    /// in that case no output is created.
    /// Returns [`Error::UnpackedSizeMismatch`] if a compressed entry is corrupt; extraction
    /// stops at that entry and its file is not created.
    ///
    /// [`Error::Io`]: crate::Error::Io
    /// [`Error::InvalidSlotCount`]: crate::Error::InvalidSlotCount
    /// [`Error::UnpackedSizeMismatch`]: crate::Error::UnpackedSizeMismatch
    pub fn extract_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
        archive_path: P,
        output_dir: Q,
        progress: ProgressCallback,
    ) -> Result<Vec<AilEntry>> {
        let archive_path = archive_path.as_ref();
        let output_dir = output_dir.as_ref();

        let mut reader = AilReader::open(archive_path)?;

        progress(&AilProgress::new(AilPhase::ReadingTable, 1, 1));
        reader.read_slot_table()?;

        progress(&AilProgress::new(AilPhase::DetectingTypes, 1, 1));
        let entries = reader.classify_entries()?.to_vec();

        std::fs::create_dir_all(output_dir)?;

        let total = entries.len();
        for (i, entry) in entries.iter().enumerate() {
            progress(&AilProgress::with_file(
                AilPhase::ExtractingFiles,
                i + 1,
                total,
                entry.name.as_str(),
            ));

            let output_path = output_dir.join(&entry.name);
            if entry.is_packed {
                // decode first so a corrupt entry leaves nothing behind
                let data = reader.read_entry(entry)?;
                fs::write(&output_path, data)?;
            } else {
                let mut output = BufWriter::new(File::create(&output_path)?);
                reader.extract_entry(entry, &mut output)?;
                output.flush()?;
            }
        }

        tracing::info!(
            "Extracted {} entries from {} to {}",
            total,
            archive_path.display(),
            output_dir.display()
        );

        progress(&AilProgress::new(AilPhase::Complete, total, total));
        Ok(entries)
    }

    /// Create an AIL archive from numbered input files
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryName`] if a file name has no `#NNNNN` slot token.
    /// Returns [`Error::Io`] if a file cannot be read or the archive cannot be written.
    ///
    /// [`Error::InvalidEntryName`]: crate::Error::InvalidEntryName
    /// [`Error::Io`]: crate::Error::Io
    pub fn create<P: AsRef<Path>, Q: AsRef<Path>>(files: &[P], output_path: Q) -> Result<()> {
        Self::create_with_compression_and_progress(files, output_path, true, &|_| {})
    }

    /// Create an AIL archive with compression toggled
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryName`] if a file name has no `#NNNNN` slot token.
    /// Returns [`Error::Io`] if a file cannot be read or the archive cannot be written.
    ///
    /// [`Error::InvalidEntryName`]: crate::Error::InvalidEntryName
    /// [`Error::Io`]: crate::Error::Io
    pub fn create_with_compression<P: AsRef<Path>, Q: AsRef<Path>>(
        files: &[P],
        output_path: Q,
        compress: bool,
    ) -> Result<()> {
        Self::create_with_compression_and_progress(files, output_path, compress, &|_| {})
    }

    /// Create an AIL archive with compression toggled and progress callback
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyFileList`] if no files are given.
    /// Returns [`Error::InvalidEntryName`] if a file name has no `#NNNNN` slot token.
    /// Returns [`Error::DuplicateSlot`] if two files claim the same slot.
    /// Returns [`Error::Io`] if a file cannot be read or the archive cannot be written.
    ///
    /// [`Error::EmptyFileList`]: crate::Error::EmptyFileList
    /// [`Error::InvalidEntryName`]: crate::Error::InvalidEntryName
    /// [`Error::DuplicateSlot`]: crate::Error::DuplicateSlot
    /// [`Error::Io`]: crate::Error::Io
    pub fn create_with_compression_and_progress<P: AsRef<Path>, Q: AsRef<Path>>(
        files: &[P],
        output_path: Q,
        compress: bool,
        progress: ProgressCallback,
    ) -> Result<()> {
        progress(&AilProgress::new(AilPhase::ScanningFiles, 1, 1));
        let writer = AilWriter::new(files)?.with_compression(compress);
        writer.write_with_progress(output_path, progress)
    }

    /// Create an AIL archive from every file under a directory
    ///
    /// # Errors
    ///
    /// Returns [`Error::WalkDirError`] if the directory cannot be traversed,
    /// plus everything [`Self::create_with_compression_and_progress`] returns.
    ///
    /// [`Error::WalkDirError`]: crate::Error::WalkDirError
    pub fn create_from_dir<P: AsRef<Path>, Q: AsRef<Path>>(
        source_dir: P,
        output_path: Q,
        compress: bool,
    ) -> Result<()> {
        let files = find_input_files(source_dir)?;
        Self::create_with_compression(&files, output_path, compress)
    }

    /// List the entries of an AIL archive
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the archive cannot be opened.
    /// Returns a format error if the slot table is invalid.
    ///
    /// [`Error::Io`]: crate::Error::Io
    pub fn list<P: AsRef<Path>>(archive_path: P) -> Result<Vec<AilEntry>> {
        AilReader::open(archive_path)?.list_entries()
    }

    /// Summarize an AIL archive
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the archive cannot be opened.
    /// Returns a format error if the slot table is invalid.
    ///
    /// [`Error::Io`]: crate::Error::Io
    pub fn info<P: AsRef<Path>>(archive_path: P) -> Result<ArchiveInfo> {
        AilReader::open(archive_path)?.info()
    }

    /// Read one entry without extracting the archive
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryNotFound`] if the slot holds no entry.
    /// Returns [`Error::UnpackedSizeMismatch`] if the entry is corrupt.
    ///
    /// [`Error::EntryNotFound`]: crate::Error::EntryNotFound
    /// [`Error::UnpackedSizeMismatch`]: crate::Error::UnpackedSizeMismatch
    pub fn read_entry<P: AsRef<Path>>(archive_path: P, index: u32) -> Result<Vec<u8>> {
        let mut reader = AilReader::open(archive_path)?;
        let entry = reader.entry(index)?;
        reader.read_entry(&entry)
    }

    /// Find every file under a directory, sorted
    ///
    /// # Errors
    ///
    /// Returns [`Error::WalkDirError`] if directory traversal fails.
    ///
    /// [`Error::WalkDirError`]: crate::Error::WalkDirError
    pub fn find_input_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        find_input_files(dir)
    }
}
