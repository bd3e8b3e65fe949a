use std::fs::File;
use std::io::{self, prelude::*, BufWriter};
use std::path::Path;

use memmap2::{Mmap, MmapOptions};

use super::Archive;
use crate::decompress::{Decompressor, ProPack};
use crate::error::{Error, Result, TreeError};
use crate::node::{FileNode, Node};
use crate::path::DatPath;
use crate::payload::Payload;
use crate::rnc;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub files: usize,
    pub bytes: u64,
    pub decompressed: usize,
}

impl Archive {
    /// Maps a file's byte range of the backing archive.
    ///
    /// # Safety
    ///
    /// The archive file must not be truncated or modified while the map is alive.
    pub unsafe fn memory_map(&self, file: &FileNode) -> io::Result<Mmap> {
        let (offset, length) = match file.payload {
            Payload::Archive { offset, length } => (offset, length),
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "file is not stored in the archive",
                ))
            }
        };
        let backing = self
            .file
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "archive is not open"))?;

        if offset + length > backing.metadata()?.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "payload extends past the end of the archive",
            ));
        }

        MmapOptions::new()
            .offset(offset)
            .len(length as usize)
            .map(backing)
    }

    pub fn read_file(&self, path: &DatPath) -> Result<Vec<u8>> {
        let file = match self.root.lookup(path) {
            Some(Node::File(file)) => file,
            Some(Node::Directory(_)) => {
                return Err(TreeError::KindConflict {
                    path: path.clone(),
                    found: "directory",
                }
                .into())
            }
            None => return Err(TreeError::NotFound { path: path.clone() }.into()),
        };

        let mut buf = Vec::with_capacity(file.payload.len()? as usize);
        self.open_payload(file)?.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Copies every file to `dest`. With `decompress`, RNC payloads are
    /// unpacked by the configured ProPack program.
    pub fn extract<P: AsRef<Path>>(&self, dest: P, decompress: bool) -> Result<ExtractStats> {
        let propack = self.options.propack.as_ref().map(ProPack::new);
        let decompressor = propack.as_ref().map(|p| p as &dyn Decompressor);
        self.extract_inner(dest.as_ref(), decompress, decompressor)
    }

    /// Copies every file to `dest`, unpacking RNC payloads with
    /// `decompressor` when one is given.
    pub fn extract_with<P: AsRef<Path>>(
        &self,
        dest: P,
        decompressor: Option<&dyn Decompressor>,
    ) -> Result<ExtractStats> {
        self.extract_inner(dest.as_ref(), decompressor.is_some(), decompressor)
    }

    fn extract_inner(
        &self,
        dest: &Path,
        decompress: bool,
        decompressor: Option<&dyn Decompressor>,
    ) -> Result<ExtractStats> {
        tracing::info!(
            archive = %self.path.display(),
            dest = %dest.display(),
            decompress,
            "extracting"
        );
        std::fs::create_dir_all(dest)?;

        let mut stats = ExtractStats::default();
        for (path, file) in self.root.files() {
            let out = dest.join(path.to_path_buf());
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }

            if self.extract_file(&path, file, &out, decompress, decompressor)? {
                stats.decompressed += 1;
            }
            stats.files += 1;
            stats.bytes += file.payload.len()?;
        }

        tracing::info!(
            files = stats.files,
            bytes = stats.bytes,
            decompressed = stats.decompressed,
            "extracted"
        );
        Ok(stats)
    }

    /// Returns whether the file was decompressed.
    fn extract_file(
        &self,
        path: &DatPath,
        file: &FileNode,
        out: &Path,
        decompress: bool,
        decompressor: Option<&dyn Decompressor>,
    ) -> Result<bool> {
        let mut reader = self.open_payload(file)?;

        if decompress && rnc::probe(&mut reader).is_some() {
            let decompressor = decompressor.ok_or_else(|| Error::NoDecompressor {
                path: path.clone(),
            })?;

            let dir = out.parent().unwrap_or_else(|| Path::new("."));
            let mut packed = tempfile::NamedTempFile::new_in(dir)?;
            io::copy(&mut reader, packed.as_file_mut())?;
            packed.as_file_mut().flush()?;

            decompressor
                .decompress(packed.path(), out)
                .map_err(|source| Error::Decompress {
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!(path = %path, "decompressed");
            return Ok(true);
        }

        let mut writer = BufWriter::new(File::create(out)?);
        match file.payload {
            Payload::Archive { length, .. } if length > 0 => {
                let mmap = unsafe { self.memory_map(file)? };
                writer.write_all(&mmap)?;
            }
            _ => {
                io::copy(&mut reader, &mut writer)?;
            }
        }
        writer.flush()?;
        Ok(false)
    }
}
