use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::endian::{Endianness, ReadEndianExt};
use crate::error::{Error, FormatError, Result, StructuralError};
use crate::header::DatHeader;
use crate::record::{Blob, Entry, BLOB_SIZE, ENTRY_SIZE};
use crate::rnc::RncHeader;
use crate::table::{FileTable, SIGNATURE};

pub(crate) trait DeserializeOwned {
    fn deserialize_owned<R: Read + Seek>(reader: &mut R, endian: Endianness) -> Result<Self>
    where
        Self: Sized;
}

/// Maps a short read onto the section being read.
fn truncated(what: &'static str) -> impl Fn(std::io::Error) -> Error {
    move |e| match e.kind() {
        ErrorKind::UnexpectedEof => FormatError::Truncated { what }.into(),
        _ => Error::Io(e),
    }
}

fn stream_len<R: Seek>(reader: &mut R) -> Result<u64> {
    let pos = reader.stream_position()?;
    let len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(pos))?;
    Ok(len)
}

impl DeserializeOwned for DatHeader {
    fn deserialize_owned<R: Read + Seek>(reader: &mut R, endian: Endianness) -> Result<Self> {
        let start = reader.stream_position()?;
        let table = reader.read_u32_with(endian).map_err(truncated("header"))?;
        let trailer = reader.read_u32_with(endian).map_err(truncated("header"))?;
        let end = reader.stream_position()?;
        tracing::debug!(
            start = format_args!("{:#x}", start),
            end = format_args!("{:#x}", end),
            table = format_args!("{:#x}", table),
            "deserialized DatHeader"
        );
        Ok(DatHeader { table, trailer })
    }
}

impl DeserializeOwned for Entry {
    fn deserialize_owned<R: Read + Seek>(reader: &mut R, endian: Endianness) -> Result<Self> {
        let t = truncated("entry table");
        Ok(Entry {
            blob_index: reader.read_i16_with(endian).map_err(&t)?,
            node_index: reader.read_i16_with(endian).map_err(&t)?,
            name: reader.read_u32_with(endian).map_err(&t)?,
        })
    }
}

impl DeserializeOwned for Blob {
    fn deserialize_owned<R: Read + Seek>(reader: &mut R, endian: Endianness) -> Result<Self> {
        let t = truncated("blob table");
        Ok(Blob {
            data: reader.read_u32_with(endian).map_err(&t)?,
            actual_size: reader.read_u32_with(endian).map_err(&t)?,
            uncompressed_size: reader.read_u32_with(endian).map_err(&t)?,
            compress_flag: reader.read_u32_with(endian).map_err(&t)?,
        })
    }
}

impl DeserializeOwned for RncHeader {
    fn deserialize_owned<R: Read + Seek>(reader: &mut R, endian: Endianness) -> Result<Self> {
        let t = truncated("compressed payload header");
        Ok(RncHeader {
            magic: reader.read_u32_with(endian).map_err(&t)?,
            unpacked_length: reader.read_u32_with(endian).map_err(&t)?,
            packed_length: reader.read_u32_with(endian).map_err(&t)?,
        })
    }
}

/// Reads `count` fixed-size records after checking that they fit in `remaining` bytes.
fn read_records<T: DeserializeOwned, R: Read + Seek>(
    reader: &mut R,
    endian: Endianness,
    what: &'static str,
    record_size: u64,
    remaining: u64,
) -> Result<Vec<T>> {
    let start = reader.stream_position()?;
    let count = reader.read_u32_with(endian).map_err(truncated(what))?;
    if count as u64 * record_size > remaining {
        return Err(StructuralError::TableTooLarge { what, count }.into());
    }

    let mut buf = Vec::with_capacity(count as usize);
    for _ in 0..count {
        buf.push(T::deserialize_owned(reader, endian)?);
    }

    let end = reader.stream_position()?;
    tracing::debug!(
        start = format_args!("{:#x}", start),
        end = format_args!("{:#x}", end),
        bytes = end - start,
        count,
        "deserialized {}",
        what
    );
    Ok(buf)
}

fn resolve_name(strings: &[u8], offset: u32, index: usize) -> Result<String> {
    let tail = strings
        .get(offset as usize..)
        .ok_or(FormatError::NameOutOfBounds { offset })?;
    let len = tail
        .iter()
        .position(|b| *b == 0)
        .ok_or(FormatError::NameOutOfBounds { offset })?;
    let name = std::str::from_utf8(&tail[..len]).map_err(|_| FormatError::NameEncoding { index })?;
    Ok(name.to_string())
}

impl DeserializeOwned for FileTable {
    fn deserialize_owned<R: Read + Seek>(reader: &mut R, endian: Endianness) -> Result<Self> {
        let start = reader.stream_position()?;
        let len = stream_len(reader)?;
        let remaining = |reader: &mut R| -> Result<u64> {
            Ok(len.saturating_sub(reader.stream_position()?))
        };

        let checksum = reader
            .read_u32_with(endian)
            .map_err(truncated("file table"))?;

        let rem = remaining(reader)?;
        let blobs: Vec<Blob> = read_records(reader, endian, "blobs", BLOB_SIZE, rem)?;
        let rem = remaining(reader)?;
        let entries: Vec<Entry> = read_records(reader, endian, "entries", ENTRY_SIZE, rem)?;

        let names_start = reader.stream_position()?;
        let section_length = reader
            .read_u32_with(endian)
            .map_err(truncated("name section"))?;
        let strings_len = (section_length as u64)
            .checked_sub(4)
            .ok_or(FormatError::Truncated {
                what: "name section",
            })?;
        if strings_len > remaining(reader)? {
            return Err(FormatError::Truncated {
                what: "name section",
            }
            .into());
        }

        let mut strings = vec![0u8; strings_len as usize];
        reader
            .read_exact(&mut strings)
            .map_err(truncated("name section"))?;

        let mut signature = vec![0u8; SIGNATURE.len()];
        let read = reader.read(&mut signature)?;
        signature.truncate(read);
        if signature.as_slice() != SIGNATURE.as_slice() {
            return Err(FormatError::Signature { found: signature }.into());
        }

        let names = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| resolve_name(&strings, entry.name, index))
            .collect::<Result<Vec<_>>>()?;

        let end = reader.stream_position()?;
        tracing::debug!(
            start = format_args!("{:#x}", start),
            end = format_args!("{:#x}", end),
            bytes = end - start,
            blobs = blobs.len(),
            entries = entries.len(),
            "deserialized FileTable"
        );

        Ok(FileTable {
            checksum,
            blobs,
            entries,
            names,
            signature_offset: (names_start + section_length as u64 - start) as u32,
        })
    }
}
