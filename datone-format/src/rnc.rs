//! Detection of Rob Northen (RNC / ProPack) compressed payloads.

use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::de::DeserializeOwned;
use crate::endian::Endianness;

pub const RNC_TAG: &[u8; 3] = b"RNC";
pub const RNC_HEADER_SIZE: usize = 12;

/// The leading 12 bytes of an RNC payload. Always big-endian, whatever the
/// archive's byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RncHeader {
    pub magic: u32,
    pub unpacked_length: u32,
    pub packed_length: u32,
}

impl RncHeader {
    pub fn version(&self) -> u8 {
        (self.magic & 0xff) as u8
    }

    pub fn is_valid(&self) -> bool {
        self.magic.to_be_bytes()[..3] == RNC_TAG[..]
    }
}

/// Reads the header at the start of `reader`, if there is a valid one.
///
/// Short reads and I/O errors count as "not compressed". The stream position
/// is restored either way.
pub fn read_header<R: Read + Seek>(reader: &mut R) -> Option<RncHeader> {
    let pos = reader.stream_position().ok()?;

    let mut buf = [0u8; RNC_HEADER_SIZE];
    let header = reader
        .seek(SeekFrom::Start(0))
        .and_then(|_| reader.read_exact(&mut buf))
        .map_err(Into::into)
        .and_then(|_| {
            RncHeader::deserialize_owned(&mut Cursor::new(&buf[..]), Endianness::Big)
        });

    if let Err(e) = reader.seek(SeekFrom::Start(pos)) {
        tracing::warn!(error = %e, "could not restore stream position after probe");
    }

    match header {
        Ok(header) if header.is_valid() => Some(header),
        _ => None,
    }
}

/// Returns the unpacked length if `reader` holds an RNC payload.
pub fn probe<R: Read + Seek>(reader: &mut R) -> Option<u32> {
    read_header(reader).map(|h| h.unpacked_length)
}
