use jwalk::{Parallelism, WalkDir};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;
use treecmp_common::{RelativePath, TreeCmpError};

/// Folder scanner using jwalk
///
/// Every entry below the root is listed, hidden ones included. Symbolic links
/// are reported as entries but never followed, so a link to a directory does
/// not pull the target's contents into the listing.
#[derive(Debug, Clone, Default)]
pub struct FolderScanner {
    parallel: bool,
}

impl FolderScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read directories on the rayon pool instead of the calling thread
    pub fn with_parallelism(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Scan a directory and return the relative path of every entry under it.
    ///
    /// The order of the result is unspecified. The first directory that cannot
    /// be read aborts the scan; no partial listing is returned.
    pub fn scan(&self, root: &Path) -> Result<Vec<RelativePath>, TreeCmpError> {
        // jwalk only reports an unreadable root as a walk item, open it up front
        // so the error carries the root path and a real io::ErrorKind.
        fs::read_dir(root).map_err(|e| TreeCmpError::io(root, e))?;

        let mut walker = WalkDir::new(root)
            .follow_links(false)
            .skip_hidden(false);
        if !self.parallel {
            walker = walker.parallelism(Parallelism::Serial);
        }

        let mut entries = Vec::new();

        for entry in walker {
            let mut entry = entry.map_err(|e| walk_error(root, e))?;

            if let Some(err) = entry.read_children_error.take() {
                return Err(walk_error(root, err));
            }

            let path = entry.path();
            let relative_path = path
                .strip_prefix(root)
                .map_err(|e| TreeCmpError::InvalidPath(format!("{}: {}", path.display(), e)))?;

            // Skip the synthetic root entry (empty path)
            if relative_path.as_os_str().is_empty() {
                continue;
            }

            entries.push(RelativePath::new(relative_path)?);
        }

        debug!("Scanned {} entries from {:?}", entries.len(), root);
        Ok(entries)
    }
}

fn walk_error(root: &Path, err: jwalk::Error) -> TreeCmpError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message));
    TreeCmpError::io(path, source)
}

/// Union of two scans: sorted by component order, each path exactly once.
///
/// Scans come back in walk order, so the input is sorted here before adjacent
/// duplicates are collapsed.
pub fn merge_path_sets(first: Vec<RelativePath>, second: Vec<RelativePath>) -> Vec<RelativePath> {
    let mut all_paths: Vec<RelativePath> = first.into_iter().chain(second).collect();
    all_paths.sort();
    all_paths.dedup();
    all_paths
}
