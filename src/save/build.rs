#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::save::error::{SaveError, SaveResult};
use crate::save::format::{BLOCK_SIZE, MARKER};
use crate::save::io::{write_name, write_payload, write_terminator};
use crate::save::path::{check_entry_name, entry_name};

/// Knobs for packing a directory.
#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    /// Emit entries sorted by file name instead of directory listing order,
    /// so the same directory always produces the same savefile.
    pub sort: bool,
}

/// In-memory savefile encoder.
///
/// Savefile layout:
/// - [u8 marker = 0x01]
/// - entries...
///   - [i32 name_len][name bytes UTF-8]
///   - [i32 payload_len][payload bytes]
/// - [u32 0xDEADBEEF][u32 0xDEADBEEF]
/// - zero padding up to a multiple of 256 KiB
#[derive(Debug)]
pub struct SaveWriter {
    buf: Vec<u8>,
    entries: usize,
}

impl SaveWriter {
    pub fn new() -> Self {
        SaveWriter {
            buf: vec![MARKER],
            entries: 0,
        }
    }

    pub fn push(&mut self, name: &str, payload: &[u8]) -> SaveResult<()> {
        write_name(&mut self.buf, name)?;
        write_payload(&mut self.buf, name, payload)?;
        self.entries += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Appends the terminator and padding, returning the finished savefile.
    pub fn finish(mut self) -> Vec<u8> {
        write_terminator(&mut self.buf);
        let rem = self.buf.len() % BLOCK_SIZE;
        if rem != 0 {
            self.buf.resize(self.buf.len() + BLOCK_SIZE - rem, 0);
        }
        self.buf
    }
}

impl Default for SaveWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Encodes `(name, payload)` pairs into a complete savefile.
pub fn encode<'a, I>(entries: I) -> SaveResult<Vec<u8>>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut writer = SaveWriter::new();
    for (name, payload) in entries {
        writer.push(name, payload)?;
    }
    Ok(writer.finish())
}

/// Regular files directly inside `input`, in listing order (or by name with `sort`).
fn collect_files(input: &Path, options: &PackOptions) -> SaveResult<Vec<(String, PathBuf)>> {
    let mut walker = WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);
    if options.sort {
        walker = walker.sort_by_file_name();
    }

    let mut files = Vec::new();
    for ent in walker {
        let ent = ent.map_err(|e| {
            if e.depth() == 0 {
                return SaveError::DirectoryNotFound(input.to_path_buf());
            }
            let path = e.path().unwrap_or(input).to_path_buf();
            let msg = e.to_string();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, msg));
            SaveError::FileReadError { path, source }
        })?;

        if !ent.file_type().is_file() {
            debug!(path = %ent.path().display(), "skipping non-file entry");
            continue;
        }

        let name = entry_name(ent.path())?;
        check_entry_name(&name)?;
        files.push((name, ent.into_path()));
    }
    Ok(files)
}

/// Packs every file in `input` into a savefile at `output`.
///
/// Nothing touches `output` until the whole savefile has been built in memory.
pub fn build(output: &Path, input: &Path, options: &PackOptions) -> SaveResult<usize> {
    if !input.is_dir() {
        return Err(SaveError::DirectoryNotFound(input.to_path_buf()));
    }

    info!(input = %input.display(), output = %output.display(), "packing savefile");

    let mut writer = SaveWriter::new();
    for (name, physical) in collect_files(input, options)? {
        let data = std::fs::read(&physical).map_err(|source| SaveError::FileReadError {
            path: physical.clone(),
            source,
        })?;
        debug!(name = %name, len = data.len(), "packing entry");
        writer.push(&name, &data)?;
    }

    let count = writer.len();
    let bytes = writer.finish();
    std::fs::write(output, &bytes).map_err(|source| SaveError::FileWriteError {
        path: output.to_path_buf(),
        source,
    })?;

    info!(entries = count, bytes = bytes.len(), "savefile written");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_savefile_is_one_block() {
        let out = encode(std::iter::empty()).unwrap();
        assert_eq!(out.len(), BLOCK_SIZE);
        assert_eq!(out[0], MARKER);
        assert_eq!(&out[1..9], &[0xEF, 0xBE, 0xAD, 0xDE, 0xEF, 0xBE, 0xAD, 0xDE]);
        assert!(out[9..].iter().all(|&b| b == 0));
    }

    #[test]
    fn exact_fit_gets_no_extra_block() {
        // marker + name field + "a" + payload field + terminator = 18 bytes of framing
        let payload = vec![7u8; BLOCK_SIZE - 18];
        let out = encode([("a", payload.as_slice())]).unwrap();
        assert_eq!(out.len(), BLOCK_SIZE);
        assert_eq!(&out[out.len() - 8..], &[0xEF, 0xBE, 0xAD, 0xDE, 0xEF, 0xBE, 0xAD, 0xDE]);
    }

    #[test]
    fn overflowing_one_block_pads_to_two() {
        let payload = vec![1u8; BLOCK_SIZE];
        let out = encode([("big.bin", payload.as_slice())]).unwrap();
        assert_eq!(out.len(), 2 * BLOCK_SIZE);
    }

    #[test]
    fn entries_are_written_in_push_order() {
        let mut w = SaveWriter::new();
        w.push("b", b"2").unwrap();
        w.push("a", b"1").unwrap();
        assert_eq!(w.len(), 2);
        let out = w.finish();
        assert_eq!(&out[1..11], &[1, 0, 0, 0, b'b', 1, 0, 0, 0, b'2']);
        assert_eq!(&out[11..21], &[1, 0, 0, 0, b'a', 1, 0, 0, 0, b'1']);
    }
}
