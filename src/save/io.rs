#![forbid(unsafe_code)]

use byteorder::{LittleEndian, ReadBytesExt};

use crate::save::error::{SaveError, SaveResult};
use crate::save::format::TERMINATOR;

fn len_field(name: &str, len: usize) -> SaveResult<i32> {
    i32::try_from(len).map_err(|_| SaveError::EntryTooLarge {
        name: name.to_string(),
        len,
    })
}

/// Length-prefixed UTF-8 name. The prefix is the byte count.
pub fn write_name(out: &mut Vec<u8>, name: &str) -> SaveResult<()> {
    let len = len_field(name, name.len())?;
    write_prefixed(out, len, name.as_bytes());
    Ok(())
}

/// Length-prefixed raw payload. `name` is only used for error reporting.
pub fn write_payload(out: &mut Vec<u8>, name: &str, payload: &[u8]) -> SaveResult<()> {
    let len = len_field(name, payload.len())?;
    write_prefixed(out, len, payload);
    Ok(())
}

fn write_prefixed(out: &mut Vec<u8>, len: i32, bytes: &[u8]) {
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(bytes);
}

pub fn write_terminator(out: &mut Vec<u8>) {
    out.extend_from_slice(&TERMINATOR.to_le_bytes());
    out.extend_from_slice(&TERMINATOR.to_le_bytes());
}

/// Forward-only reader over an in-memory savefile.
///
/// Every read either consumes input or fails, so a malformed buffer can
/// never make the caller spin.
pub struct FrameReader<'a> {
    buf: &'a [u8],
    rest: &'a [u8],
}

impl<'a> FrameReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        FrameReader { buf, rest: buf }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.buf.len() - self.rest.len()
    }

    pub fn remaining(&self) -> &'a [u8] {
        self.rest
    }

    pub fn read_u8(&mut self) -> SaveResult<u8> {
        let at = self.position();
        self.rest
            .read_u8()
            .map_err(|_| SaveError::corrupt(format!("unexpected end of file at offset {at}")))
    }

    pub fn read_u32(&mut self) -> SaveResult<u32> {
        let at = self.position();
        self.rest.read_u32::<LittleEndian>().map_err(|_| {
            SaveError::corrupt(format!("truncated length field at offset {at}"))
        })
    }

    pub fn read_i32(&mut self) -> SaveResult<i32> {
        let at = self.position();
        self.rest.read_i32::<LittleEndian>().map_err(|_| {
            SaveError::corrupt(format!("truncated length field at offset {at}"))
        })
    }

    pub fn take(&mut self, len: usize) -> SaveResult<&'a [u8]> {
        if len > self.rest.len() {
            return Err(SaveError::corrupt(format!(
                "record at offset {} claims {len} bytes but only {} remain",
                self.position(),
                self.rest.len()
            )));
        }
        let (head, tail) = self.rest.split_at(len);
        self.rest = tail;
        Ok(head)
    }

    fn take_len(&mut self, len: i32) -> SaveResult<&'a [u8]> {
        let len = usize::try_from(len).map_err(|_| {
            SaveError::corrupt(format!(
                "negative length {len} before offset {}",
                self.position()
            ))
        })?;
        self.take(len)
    }

    /// Reads the next entry name, or `None` once the end-of-entries sentinel
    /// (a zero length or the first terminator field) is reached.
    pub fn read_name(&mut self) -> SaveResult<Option<&'a str>> {
        let len = self.read_i32()?;
        if len == 0 || len as u32 == TERMINATOR {
            return Ok(None);
        }
        let at = self.position();
        let bytes = self.take_len(len)?;
        std::str::from_utf8(bytes)
            .map(Some)
            .map_err(|_| SaveError::corrupt(format!("entry name at offset {at} is not utf8")))
    }

    pub fn read_payload(&mut self) -> SaveResult<&'a [u8]> {
        let len = self.read_i32()?;
        self.take_len(len)
    }
}
