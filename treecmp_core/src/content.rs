use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;
use treecmp_common::TreeCmpError;

/// Read size used when streaming two regular files side by side
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Byte-for-byte comparison of two regular files.
///
/// Files of different length are reported as different before either is
/// opened. With `shallow` set, equal length is taken as a match.
pub fn regular_files_match(first: &Path, second: &Path, shallow: bool) -> Result<bool, TreeCmpError> {
    let first_len = fs::metadata(first)
        .map_err(|e| TreeCmpError::io(first, e))?
        .len();
    let second_len = fs::metadata(second)
        .map_err(|e| TreeCmpError::io(second, e))?
        .len();

    if first_len != second_len {
        debug!("Size mismatch: {:?} ({}) vs {:?} ({})", first, first_len, second, second_len);
        return Ok(false);
    }

    if shallow {
        return Ok(true);
    }

    let mut first_file = File::open(first).map_err(|e| TreeCmpError::io(first, e))?;
    let mut second_file = File::open(second).map_err(|e| TreeCmpError::io(second, e))?;

    streams_match(&mut first_file, first, &mut second_file, second)
}

/// Compare two readers chunk by chunk.
///
/// A chunk-length disagreement means one stream ended early. When the sizes
/// were checked beforehand this only happens if a file changed underneath
/// us, and it is reported as a mismatch rather than an error.
pub fn streams_match<A: Read, B: Read>(
    first: &mut A,
    first_path: &Path,
    second: &mut B,
    second_path: &Path,
) -> Result<bool, TreeCmpError> {
    let mut first_buf = vec![0u8; CHUNK_SIZE];
    let mut second_buf = vec![0u8; CHUNK_SIZE];

    loop {
        let first_len = fill_chunk(first, &mut first_buf).map_err(|e| TreeCmpError::io(first_path, e))?;
        let second_len =
            fill_chunk(second, &mut second_buf).map_err(|e| TreeCmpError::io(second_path, e))?;

        if first_len != second_len {
            return Ok(false);
        }
        if first_len == 0 {
            return Ok(true);
        }
        if first_buf[..first_len] != second_buf[..second_len] {
            return Ok(false);
        }
    }
}

/// Fill `buf` as far as the reader allows. Returns less than `buf.len()` only at end of stream.
fn fill_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Compare the raw targets of two symbolic links. Targets are not resolved.
pub fn symlinks_match(first: &Path, second: &Path) -> Result<bool, TreeCmpError> {
    let first_target = fs::read_link(first).map_err(|e| TreeCmpError::io(first, e))?;
    let second_target = fs::read_link(second).map_err(|e| TreeCmpError::io(second, e))?;

    // Path equality normalizes `a/./b` and repeated separators; compare the raw text
    Ok(first_target.as_os_str() == second_target.as_os_str())
}
