use std::fmt;
use std::io::{Read, Result, Write};
use std::str::FromStr;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

/// Byte order of an archive's header and table. Console builds of the games
/// ship big-endian archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endianness::Little => f.write_str("little"),
            Endianness::Big => f.write_str("big"),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown endianness `{0}`, expected `little` or `big`")]
pub struct ParseEndiannessError(String);

impl FromStr for Endianness {
    type Err = ParseEndiannessError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "little" | "le" => Ok(Endianness::Little),
            "big" | "be" => Ok(Endianness::Big),
            _ => Err(ParseEndiannessError(s.to_string())),
        }
    }
}

pub(crate) trait ReadEndianExt: Read {
    fn read_u32_with(&mut self, endian: Endianness) -> Result<u32> {
        match endian {
            Endianness::Little => self.read_u32::<LittleEndian>(),
            Endianness::Big => self.read_u32::<BigEndian>(),
        }
    }

    fn read_i16_with(&mut self, endian: Endianness) -> Result<i16> {
        match endian {
            Endianness::Little => self.read_i16::<LittleEndian>(),
            Endianness::Big => self.read_i16::<BigEndian>(),
        }
    }
}

impl<R: Read + ?Sized> ReadEndianExt for R {}

pub(crate) trait WriteEndianExt: Write {
    fn write_u32_with(&mut self, endian: Endianness, value: u32) -> Result<()> {
        match endian {
            Endianness::Little => self.write_u32::<LittleEndian>(value),
            Endianness::Big => self.write_u32::<BigEndian>(value),
        }
    }

    fn write_i16_with(&mut self, endian: Endianness, value: i16) -> Result<()> {
        match endian {
            Endianness::Little => self.write_i16::<LittleEndian>(value),
            Endianness::Big => self.write_i16::<BigEndian>(value),
        }
    }
}

impl<W: Write + ?Sized> WriteEndianExt for W {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        assert_eq!("little".parse::<Endianness>().unwrap(), Endianness::Little);
        assert_eq!("BIG".parse::<Endianness>().unwrap(), Endianness::Big);
        assert!("middle".parse::<Endianness>().is_err());
    }

    #[test]
    fn byte_order_is_respected() {
        let mut buf = vec![];
        buf.write_u32_with(Endianness::Big, 0x0102_0304).unwrap();
        buf.write_u32_with(Endianness::Little, 0x0102_0304).unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 4, 3, 2, 1]);

        let mut cursor = std::io::Cursor::new(buf);
        assert_eq!(cursor.read_u32_with(Endianness::Big).unwrap(), 0x0102_0304);
        assert_eq!(
            cursor.read_u32_with(Endianness::Little).unwrap(),
            0x0102_0304
        );
    }
}
