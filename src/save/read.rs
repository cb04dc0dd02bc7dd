#![forbid(unsafe_code)]

use crate::save::error::{SaveError, SaveResult};
use crate::save::format::Entry;
use crate::save::io::FrameReader;

/// Walks the entries of an in-memory savefile.
///
/// Iteration stops at the first end-of-entries sentinel; the padding after it
/// is never looked at. After an error the iterator is exhausted.
pub struct SaveReader<'a> {
    frames: FrameReader<'a>,
    marker: u8,
    done: bool,
}

impl<'a> SaveReader<'a> {
    pub fn new(buf: &'a [u8]) -> SaveResult<Self> {
        let mut frames = FrameReader::new(buf);
        let marker = frames
            .read_u8()
            .map_err(|_| SaveError::corrupt("savefile is empty"))?;
        Ok(SaveReader {
            frames,
            marker,
            done: false,
        })
    }

    pub fn marker(&self) -> u8 {
        self.marker
    }

    /// The frame reader, positioned right after the last thing read.
    pub(crate) fn frames(&mut self) -> &mut FrameReader<'a> {
        &mut self.frames
    }

    fn next_entry(&mut self) -> SaveResult<Option<Entry<'a>>> {
        let Some(name) = self.frames.read_name()? else {
            return Ok(None);
        };
        let payload_offset = self.frames.position() + 4;
        let payload = self.frames.read_payload()?;
        Ok(Some(Entry {
            name,
            payload,
            payload_offset,
        }))
    }
}

impl<'a> Iterator for SaveReader<'a> {
    type Item = SaveResult<Entry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Decodes every entry of `buf` into owned `(name, payload)` pairs.
pub fn decode(buf: &[u8]) -> SaveResult<Vec<(String, Vec<u8>)>> {
    SaveReader::new(buf)?
        .map(|e| e.map(|e| (e.name.to_string(), e.payload.to_vec())))
        .collect()
}
