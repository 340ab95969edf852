use std::fs;
use std::io;
use std::path::Path;
use treecmp_common::{EntryKind, TreeCmpError};

/// Classify the entry at `path` without following symbolic links.
pub fn classify(path: &Path) -> Result<EntryKind, TreeCmpError> {
    entry_kind(path)?.ok_or_else(|| {
        TreeCmpError::io(
            path,
            io::Error::new(io::ErrorKind::NotFound, "entry does not exist"),
        )
    })
}

/// Existence and kind in one lookup.
///
/// `Ok(None)` means nothing is there. A dangling symbolic link still exists.
/// Devices, sockets and FIFOs are `UnsupportedFileType`.
pub fn entry_kind(path: &Path) -> Result<Option<EntryKind>, TreeCmpError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(TreeCmpError::io(path, e)),
    };

    EntryKind::from_file_type(&metadata.file_type())
        .map(Some)
        .ok_or_else(|| TreeCmpError::UnsupportedFileType {
            path: path.to_path_buf(),
        })
}
