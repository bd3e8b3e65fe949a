use std::io::{Result, Seek, SeekFrom, Write};

use crate::endian::{Endianness, WriteEndianExt};
use crate::header::DatHeader;
use crate::record::{Blob, Entry};
use crate::table::{FileTable, Fixup, TableLayout, SIGNATURE};

pub(crate) trait Serialize {
    fn write<W: Write + Seek>(&self, writer: &mut W, endian: Endianness) -> Result<()>;
}

/// Offsets are stored as u32; anything past 4 GiB cannot be referenced.
pub(crate) fn to_offset(value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("offset {:#x} does not fit in 32 bits", value),
        )
    })
}

impl Serialize for DatHeader {
    fn write<W: Write + Seek>(&self, writer: &mut W, endian: Endianness) -> Result<()> {
        writer.write_u32_with(endian, self.table)?;
        writer.write_u32_with(endian, self.trailer)
    }
}

impl Serialize for Entry {
    fn write<W: Write + Seek>(&self, writer: &mut W, endian: Endianness) -> Result<()> {
        writer.write_i16_with(endian, self.blob_index)?;
        writer.write_i16_with(endian, self.node_index)?;
        writer.write_u32_with(endian, self.name)
    }
}

impl Serialize for Blob {
    fn write<W: Write + Seek>(&self, writer: &mut W, endian: Endianness) -> Result<()> {
        writer.write_u32_with(endian, self.data)?;
        writer.write_u32_with(endian, self.actual_size)?;
        writer.write_u32_with(endian, self.uncompressed_size)?;
        writer.write_u32_with(endian, self.compress_flag)
    }
}

impl FileTable {
    /// Writes the table at the current position. Name pointers and the
    /// section length are written as zero and returned as fixups.
    pub(crate) fn write_table<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endianness,
    ) -> Result<(TableLayout, Vec<Fixup>)> {
        let start = writer.stream_position()?;
        writer.write_u32_with(endian, self.checksum)?;

        writer.write_u32_with(endian, self.blobs.len() as u32)?;
        for blob in self.blobs.iter() {
            blob.write(writer, endian)?;
        }

        writer.write_u32_with(endian, self.entries.len() as u32)?;
        let mut name_fields = Vec::with_capacity(self.entries.len());
        for entry in self.entries.iter() {
            name_fields.push(writer.stream_position()? + 4);
            Entry { name: 0, ..*entry }.write(writer, endian)?;
        }

        let names_start = writer.stream_position()?;
        writer.write_u32_with(endian, 0)?;
        let strings_start = names_start + 4;

        let mut fixups = Vec::with_capacity(self.names.len() + 1);
        for (name, at) in self.names.iter().zip(name_fields) {
            let offset = writer.stream_position()? - strings_start;
            fixups.push(Fixup {
                at,
                value: to_offset(offset)?,
            });
            writer.write_all(name.as_bytes())?;
            writer.write_all(&[0])?;
        }

        let signature = writer.stream_position()?;
        fixups.push(Fixup {
            at: names_start,
            value: to_offset(signature - names_start)?,
        });
        writer.write_all(SIGNATURE)?;
        writer.write_all(&[0])?;

        let end = writer.stream_position()?;
        tracing::debug!(
            start = format_args!("{:#x}", start),
            end = format_args!("{:#x}", end),
            bytes = end - start,
            blobs = self.blobs.len(),
            entries = self.entries.len(),
            "serialized FileTable"
        );

        Ok((TableLayout { start, signature }, fixups))
    }
}

/// Patches every placeholder, leaving the writer at the end of the stream.
pub(crate) fn apply_fixups<W: Write + Seek>(
    writer: &mut W,
    endian: Endianness,
    fixups: &[Fixup],
) -> Result<()> {
    for fixup in fixups {
        writer.seek(SeekFrom::Start(fixup.at))?;
        writer.write_u32_with(endian, fixup.value)?;
    }
    writer.seek(SeekFrom::End(0))?;
    tracing::debug!(count = fixups.len(), "applied fixups");
    Ok(())
}
