#![forbid(unsafe_code)]

use byteorder::{ByteOrder, LittleEndian};
use std::path::Path;
use tracing::{debug, info};

use crate::save::build::{build as build_impl, PackOptions};
use crate::save::error::{SaveError, SaveResult};
use crate::save::format::{EntryInfo, VerifyReport, BLOCK_SIZE, TERMINATOR};
use crate::save::path::check_entry_name;
use crate::save::read::SaveReader;

fn read_savefile(path: &Path) -> SaveResult<Vec<u8>> {
    if !path.is_file() {
        return Err(SaveError::FileNotFound(path.to_path_buf()));
    }
    std::fs::read(path).map_err(|source| SaveError::FileReadError {
        path: path.to_path_buf(),
        source,
    })
}

pub fn pack(output: &Path, input: &Path, options: &PackOptions) -> SaveResult<usize> {
    build_impl(output, input, options)
}

/// Unpacks every entry of `savefile` into `output`, creating it if needed.
///
/// Entries are written as they are decoded; if a later entry turns out to be
/// corrupt the files written so far are left in place.
pub fn unpack(savefile: &Path, output: &Path) -> SaveResult<usize> {
    if !savefile.is_file() {
        return Err(SaveError::FileNotFound(savefile.to_path_buf()));
    }

    std::fs::create_dir_all(output).map_err(|source| SaveError::DirectoryCreateError {
        path: output.to_path_buf(),
        source,
    })?;

    let buf = read_savefile(savefile)?;
    info!(savefile = %savefile.display(), output = %output.display(), "unpacking savefile");

    let mut count = 0;
    for entry in SaveReader::new(&buf)? {
        let entry = entry?;
        check_entry_name(entry.name)?;

        let out_path = output.join(entry.name);
        std::fs::write(&out_path, entry.payload).map_err(|source| SaveError::FileWriteError {
            path: out_path.clone(),
            source,
        })?;
        debug!(name = entry.name, len = entry.payload.len(), "unpacked entry");
        count += 1;
    }

    info!(entries = count, "savefile unpacked");
    Ok(count)
}

/// Read savefile entries without writing anything.
pub fn entries(savefile: &Path) -> SaveResult<Vec<EntryInfo>> {
    let buf = read_savefile(savefile)?;
    SaveReader::new(&buf)?
        .map(|e| e.map(EntryInfo::from))
        .collect()
}

pub fn list(savefile: &Path, verbose: bool) -> SaveResult<()> {
    for e in entries(savefile)? {
        if verbose {
            println!("{}  off={} len={}", e.name, e.payload_offset, e.payload_len);
        } else {
            println!("{}", e.name);
        }
    }
    Ok(())
}

/// Strict structural check of a savefile held in memory.
///
/// Unlike unpacking, this also requires the full two-field terminator, an
/// all-zero tail, block alignment, and names that are safe to unpack.
pub fn verify_bytes(buf: &[u8]) -> SaveResult<VerifyReport> {
    let mut reader = SaveReader::new(buf)?;
    let marker = reader.marker();

    let mut count = 0;
    for entry in reader.by_ref() {
        let entry = entry?;
        check_entry_name(entry.name)?;
        count += 1;
    }

    let frames = reader.frames();
    let end = frames.position();
    if LittleEndian::read_u32(&buf[end - 4..end]) != TERMINATOR {
        return Err(SaveError::corrupt(format!(
            "entries end with a zero length at offset {} instead of the terminator",
            end - 4
        )));
    }
    if frames.read_u32()? != TERMINATOR {
        return Err(SaveError::corrupt(format!(
            "second terminator field missing at offset {end}"
        )));
    }

    let tail_start = frames.position();
    if let Some(i) = frames.remaining().iter().position(|&b| b != 0) {
        return Err(SaveError::corrupt(format!(
            "non-zero padding byte at offset {}",
            tail_start + i
        )));
    }
    if buf.len() % BLOCK_SIZE != 0 {
        return Err(SaveError::corrupt(format!(
            "length {} is not a multiple of {BLOCK_SIZE}",
            buf.len()
        )));
    }

    Ok(VerifyReport {
        marker,
        entries: count,
        total_len: buf.len() as u64,
    })
}

pub fn verify(savefile: &Path) -> SaveResult<VerifyReport> {
    let buf = read_savefile(savefile)?;
    let report = verify_bytes(&buf)?;
    info!(marker = report.marker, entries = report.entries, "savefile verified");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::build::encode;

    #[test]
    fn packed_savefiles_verify() {
        let buf = encode([("a", &b"1"[..]), ("b", &b""[..])]).unwrap();
        let report = verify_bytes(&buf).unwrap();
        assert_eq!(report.marker, 0x01);
        assert_eq!(report.entries, 2);
        assert_eq!(report.total_len, BLOCK_SIZE as u64);
    }

    #[test]
    fn non_zero_padding_fails_verify() {
        let mut buf = encode([("a", &b"1"[..])]).unwrap();
        let last = buf.len() - 1;
        buf[last] = 0x42;
        assert!(matches!(verify_bytes(&buf), Err(SaveError::ArchiveCorrupt(_))));
    }

    #[test]
    fn broken_second_terminator_fails_verify() {
        let mut buf = encode(std::iter::empty()).unwrap();
        buf[5..9].copy_from_slice(&[0, 0, 0, 0]);
        assert!(matches!(verify_bytes(&buf), Err(SaveError::ArchiveCorrupt(_))));
    }

    #[test]
    fn zero_length_end_fails_verify() {
        let mut buf = encode(std::iter::empty()).unwrap();
        buf[1..5].copy_from_slice(&[0, 0, 0, 0]);
        assert!(matches!(verify_bytes(&buf), Err(SaveError::ArchiveCorrupt(_))));
    }

    #[test]
    fn unaligned_length_fails_verify() {
        let mut buf = encode(std::iter::empty()).unwrap();
        buf.truncate(100);
        assert!(matches!(verify_bytes(&buf), Err(SaveError::ArchiveCorrupt(_))));
    }

    #[test]
    fn unsafe_names_fail_verify() {
        let buf = encode([("../up", &b"x"[..])]).unwrap();
        assert!(matches!(verify_bytes(&buf), Err(SaveError::UnsafeEntryName(_))));
    }
}
