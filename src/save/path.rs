#![forbid(unsafe_code)]

use std::path::{Component, Path};

use crate::save::error::{SaveError, SaveResult};

/// Entry name for a file found in the input directory.
pub fn entry_name(file_path: &Path) -> SaveResult<String> {
    file_path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| SaveError::InvalidFileName(file_path.to_path_buf()))
}

/// Rejects names that would land anywhere but directly inside the output directory.
pub fn check_entry_name(name: &str) -> SaveResult<()> {
    let unsafe_name = || SaveError::UnsafeEntryName(name.to_string());

    if name.is_empty() || name.contains(|c: char| std::path::is_separator(c) || c == '\0') {
        return Err(unsafe_name());
    }

    let mut comps = Path::new(name).components();
    match (comps.next(), comps.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(unsafe_name()),
    }
}
