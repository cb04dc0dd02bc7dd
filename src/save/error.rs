#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("savefile directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("savefile does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unable to create output directory {}: {source}", .path.display())]
    DirectoryCreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to read {}: {source}", .path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to write {}: {source}", .path.display())]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt savefile: {0}")]
    ArchiveCorrupt(String),

    #[error("refusing to unpack entry with unsafe name {0:?}")]
    UnsafeEntryName(String),

    #[error("file name is not valid unicode: {}", .0.display())]
    InvalidFileName(PathBuf),

    #[error("entry {name:?} is too large for the savefile format ({len} bytes)")]
    EntryTooLarge { name: String, len: usize },

    #[error("bad arguments: {0}")]
    BadArguments(String),
}

impl SaveError {
    /// Process exit code for this failure: 1 for usage errors, 2 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            SaveError::BadArguments(_) => 1,
            _ => 2,
        }
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        SaveError::ArchiveCorrupt(msg.into())
    }
}

pub type SaveResult<T> = Result<T, SaveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_exit_with_one() {
        assert_eq!(SaveError::BadArguments("missing input".into()).exit_code(), 1);
    }

    #[test]
    fn io_and_format_errors_exit_with_two() {
        assert_eq!(SaveError::DirectoryNotFound("x".into()).exit_code(), 2);
        assert_eq!(SaveError::corrupt("truncated").exit_code(), 2);
        assert_eq!(SaveError::UnsafeEntryName("../x".into()).exit_code(), 2);
    }
}
