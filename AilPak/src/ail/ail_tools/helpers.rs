//! Helper functions for AIL operations

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Find every file under `dir`, recursively, in sorted order
///
/// `.DS_Store` files are skipped. Symlinks are followed.
///
/// # Errors
/// Returns [`Error::WalkDirError`] if the directory cannot be traversed.
///
/// [`Error::WalkDirError`]: crate::Error::WalkDirError
pub fn find_input_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.file_name() != ".DS_Store" {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Default extraction directory: the archive path without its extension
#[must_use]
pub fn default_output_dir<P: AsRef<Path>>(archive_path: P) -> PathBuf {
    archive_path.as_ref().with_extension("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_input_files_sorted_and_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b#00001.bin"), b"b").unwrap();
        fs::write(dir.path().join("sub").join("a#00000.bin"), b"a").unwrap();
        fs::write(dir.path().join(".DS_Store"), b"").unwrap();

        let files = find_input_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("b#00001.bin"), dir.path().join("sub").join("a#00000.bin")]
        );
    }

    #[test]
    fn test_find_input_files_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_input_files(dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_default_output_dir() {
        assert_eq!(default_output_dir("data/Gall0.ail"), PathBuf::from("data/Gall0"));
        assert_eq!(default_output_dir("Gall0"), PathBuf::from("Gall0"));
    }
}
