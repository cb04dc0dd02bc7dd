#![forbid(unsafe_code)]

/// Leading format byte. Its meaning is unknown; every savefile seen so far carries 0x01.
pub const MARKER: u8 = 0x01;

/// Written twice after the last entry. Only the first copy ends decoding.
pub const TERMINATOR: u32 = 0xDEADBEEF;

/// Savefiles are zero-padded to a multiple of this many bytes.
pub const BLOCK_SIZE: usize = 262_144;

/// One decoded record, borrowing from the savefile buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    pub name: &'a str,
    pub payload: &'a [u8],
    /// Offset of the payload bytes from the start of the savefile.
    pub payload_offset: usize,
}

/// Public view of a savefile entry (for listing and inspection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub payload_offset: u64,
    pub payload_len: u64,
}

impl From<Entry<'_>> for EntryInfo {
    fn from(e: Entry<'_>) -> Self {
        EntryInfo {
            name: e.name.to_string(),
            payload_offset: e.payload_offset as u64,
            payload_len: e.payload.len() as u64,
        }
    }
}

/// Result of a strict structural check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub marker: u8,
    pub entries: usize,
    pub total_len: u64,
}
