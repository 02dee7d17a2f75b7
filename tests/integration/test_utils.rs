//! Shared test utilities for integration tests

use std::path::{Path, PathBuf};

/// Find the bulk file for `(context_id, sequence)` in `dir`.
///
/// Names follow `<id>-bulk<timestamp>-<seq>.log`; the timestamp is not
/// significant, so matching goes by prefix and suffix.
pub fn find_bulk_file(dir: &Path, context_id: u64, sequence: u64) -> Option<PathBuf> {
    let prefix = format!("{context_id}-bulk");
    let suffix = format!("-{sequence}.log");
    std::fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .find(|path| {
            path.file_name()
                .map(|name| {
                    let name = name.to_string_lossy();
                    name.starts_with(&prefix) && name.ends_with(&suffix)
                })
                .unwrap_or(false)
        })
}

/// Read the bulk file for `(context_id, sequence)`, if it exists.
pub fn read_bulk_file(dir: &Path, context_id: u64, sequence: u64) -> Option<String> {
    let path = find_bulk_file(dir, context_id, sequence)?;
    std::fs::read_to_string(path).ok()
}
