#![forbid(unsafe_code)]

mod build;
mod error;
mod format;
mod io;
mod ops;
mod path;
mod read;

pub use build::{encode, PackOptions, SaveWriter};

pub use error::{SaveError, SaveResult};
pub use format::{Entry, EntryInfo, VerifyReport, BLOCK_SIZE, MARKER, TERMINATOR};
pub use path::check_entry_name;
pub use read::{decode, SaveReader};

pub use ops::{entries, list, pack, unpack, verify, verify_bytes};
