use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::PathBuf;

/// Where a file's bytes currently live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A byte range of the archive's backing file.
    Archive { offset: u64, length: u64 },
    /// A file on the host filesystem.
    Host(PathBuf),
    Memory(Vec<u8>),
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Memory(vec![])
    }
}

impl Payload {
    pub fn len(&self) -> io::Result<u64> {
        match self {
            Payload::Archive { length, .. } => Ok(*length),
            Payload::Host(path) => Ok(std::fs::metadata(path)?.len()),
            Payload::Memory(bytes) => Ok(bytes.len() as u64),
        }
    }

    pub fn is_empty(&self) -> io::Result<bool> {
        self.len().map(|len| len == 0)
    }

    /// Opens the payload for reading. `backing` is the archive file that
    /// `Payload::Archive` ranges point into.
    pub fn open<'a>(&'a self, backing: Option<&File>) -> io::Result<PayloadReader<'a>> {
        match self {
            Payload::Archive { offset, length } => {
                let file = backing.ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        "payload refers to an archive that is not open",
                    )
                })?;
                Ok(PayloadReader::Archive(Segment {
                    file: file.try_clone()?,
                    start: *offset,
                    len: *length,
                    pos: 0,
                }))
            }
            Payload::Host(path) => Ok(PayloadReader::Host(File::open(path)?)),
            Payload::Memory(bytes) => Ok(PayloadReader::Memory(Cursor::new(bytes))),
        }
    }
}

/// A window onto the archive's backing file.
///
/// The underlying handle may be shared with other segments, so every read
/// seeks to its own position first.
#[derive(Debug)]
pub struct Segment {
    file: File,
    start: u64,
    len: u64,
    pos: u64,
}

impl Read for Segment {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.len.saturating_sub(self.pos);
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let max = buf.len().min(remaining.min(usize::MAX as u64) as usize);
        self.file.seek(SeekFrom::Start(self.start + self.pos))?;
        let n = self.file.read(&mut buf[..max])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for Segment {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let next = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(n) => self.len.checked_add_signed(n),
            SeekFrom::Current(n) => self.pos.checked_add_signed(n),
        };

        match next {
            Some(n) => {
                self.pos = n;
                Ok(n)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}

#[derive(Debug)]
pub enum PayloadReader<'a> {
    Archive(Segment),
    Host(File),
    Memory(Cursor<&'a Vec<u8>>),
}

impl Read for PayloadReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            PayloadReader::Archive(x) => x.read(buf),
            PayloadReader::Host(x) => x.read(buf),
            PayloadReader::Memory(x) => x.read(buf),
        }
    }
}

impl Seek for PayloadReader<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            PayloadReader::Archive(x) => x.seek(pos),
            PayloadReader::Host(x) => x.seek(pos),
            PayloadReader::Memory(x) => x.seek(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn segment_is_bounded() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"0123456789").unwrap();

        let payload = Payload::Archive {
            offset: 3,
            length: 4,
        };
        let mut reader = payload.open(Some(&file)).unwrap();
        let mut buf = String::new();
        reader.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "3456");

        reader.seek(SeekFrom::End(-1)).unwrap();
        buf.clear();
        reader.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "6");
        assert!(reader.seek(SeekFrom::Current(-10)).is_err());
    }

    #[test]
    fn archive_payload_needs_backing() {
        let payload = Payload::Archive {
            offset: 0,
            length: 1,
        };
        assert!(payload.open(None).is_err());
    }

    #[test]
    fn memory_payload() {
        let payload = Payload::Memory(b"abc".to_vec());
        assert_eq!(payload.len().unwrap(), 3);
        let mut buf = vec![];
        payload.open(None).unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"abc");
    }
}
