use std::fs::File;
use std::io::{self, prelude::*, BufWriter, SeekFrom};
use std::path::Path;

use super::Archive;
use crate::encode::encode;
use crate::error::{Error, Result, StructuralError, TreeError};
use crate::fs::collect_files;
use crate::header::{DatHeader, HeaderLayout, HEADER_SIZE};
use crate::node::Node;
use crate::path::DatPath;
use crate::payload::Payload;
use crate::record::Blob;
use crate::rnc;
use crate::ser::{apply_fixups, to_offset, Serialize};
use crate::table::{FileTable, Fixup, CHECKSUM_SENTINEL};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteStats {
    pub files: usize,
    pub bytes: u64,
}

/// What a write pass put where, for rebinding the tree afterwards.
struct Written {
    leaves: Vec<DatPath>,
    blobs: Vec<Blob>,
    len: u64,
}

#[inline(always)]
pub(crate) fn align_up(offset: u64, alignment: u64) -> u64 {
    let diff = offset % alignment;
    if diff == 0 {
        offset
    } else {
        offset + (alignment - diff)
    }
}

impl Archive {
    fn write_archive<W: Write + Seek>(&self, writer: &mut W) -> Result<Written> {
        let endian = self.options.endianness;
        let alignment = self.options.alignment.get() as u64;
        let encoded = encode(&self.root, self.options.game)?;

        writer.seek(SeekFrom::Start(0))?;
        DatHeader::default().write(writer, endian)?;

        let mut blobs = Vec::with_capacity(encoded.leaves.len());
        let mut end = HEADER_SIZE;
        for path in encoded.leaves.iter() {
            let file = self
                .root
                .lookup(path)
                .and_then(Node::as_file)
                .ok_or_else(|| TreeError::NotFound { path: path.clone() })?;

            let length = file.payload.len()?;
            let actual_size = u32::try_from(length)
                .map_err(|_| StructuralError::PayloadTooLarge { path: path.clone() })?;

            let mut reader = self.open_payload(file)?;
            let (uncompressed_size, compress_flag) = match rnc::probe(&mut reader) {
                Some(unpacked) => (unpacked, 1),
                None => (actual_size, 0),
            };

            let offset = align_up(end, alignment);
            io::copy(&mut io::repeat(0).take(offset - end), writer)?;
            let copied = io::copy(&mut reader, writer)?;
            if copied != length {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("`{}` ended after {} of {} bytes", path, copied, length),
                )
                .into());
            }

            blobs.push(Blob {
                data: to_offset(offset)?,
                actual_size,
                uncompressed_size,
                compress_flag,
            });
            end = offset + length;
        }

        // The table follows the last payload unpadded.
        let table = FileTable {
            checksum: CHECKSUM_SENTINEL,
            blobs,
            entries: encoded.entries,
            names: encoded.names,
            signature_offset: 0,
        };
        let (layout, mut fixups) = table.write_table(writer, endian)?;

        fixups.push(Fixup {
            at: 0,
            value: to_offset(layout.start)?,
        });
        fixups.push(Fixup {
            at: 4,
            value: match self.options.header_layout {
                HeaderLayout::NamesEnd => to_offset(layout.signature - layout.start)?,
                HeaderLayout::SigningKey(key) => key,
            },
        });
        apply_fixups(writer, endian, &fixups)?;

        let len = writer.stream_position()?;
        Ok(Written {
            leaves: encoded.leaves,
            blobs: table.blobs,
            len,
        })
    }

    /// Points the tree at the freshly written archive at `dest`.
    fn commit(&mut self, dest: &Path, written: Written) -> Result<WriteStats> {
        self.path = dest.to_path_buf();
        self.file = Some(File::open(dest)?);

        for (k, (path, blob)) in written.leaves.iter().zip(written.blobs.iter()).enumerate() {
            if let Some(file) = self.root.lookup_mut(path).and_then(Node::as_file_mut) {
                file.payload = Payload::Archive {
                    offset: blob.data as u64,
                    length: blob.actual_size as u64,
                };
                file.blob_index = Some(-(k as i32) as i16);
                file.info = Some(blob.info());
            }
        }

        let staged = self.staged.keys().cloned().collect::<Vec<_>>();
        for path in staged {
            self.unstage(&path);
        }

        let stats = WriteStats {
            files: written.leaves.len(),
            bytes: written.len,
        };
        tracing::info!(
            path = %dest.display(),
            files = stats.files,
            bytes = stats.bytes,
            "wrote archive"
        );
        Ok(stats)
    }

    /// Adds every file under `source_dir` and writes the archive.
    pub fn build<P: AsRef<Path>>(&mut self, source_dir: P) -> Result<WriteStats> {
        let source_dir = source_dir.as_ref();
        tracing::info!(
            source = %source_dir.display(),
            game = %self.options.game,
            alignment = self.options.alignment.get(),
            "building archive"
        );

        for (path, host) in collect_files(source_dir)? {
            self.root.insert_file(&path, Payload::Host(host))?;
        }

        // Payloads may still point into the file at `path`.
        if self.file.is_some() {
            return self.rebuild();
        }

        let dest = self.path.clone();
        let written = {
            let mut writer = BufWriter::new(File::create(&dest)?);
            let written = self.write_archive(&mut writer)?;
            writer.flush()?;
            written
        };
        self.commit(&dest, written)
    }

    /// Writes the current tree over the archive's own path.
    pub fn rebuild(&mut self) -> Result<WriteStats> {
        let dest = self.path.clone();
        self.write_to(dest)
    }

    /// Writes the current tree to `dest` through a temporary file that
    /// replaces `dest` once complete. The archive then refers to `dest`.
    pub fn write_to<P: AsRef<Path>>(&mut self, dest: P) -> Result<WriteStats> {
        let dest = dest.as_ref();
        let dir = match dest.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        let written = {
            let mut writer = BufWriter::new(temp.as_file_mut());
            let written = self.write_archive(&mut writer)?;
            writer.flush()?;
            written
        };

        // Release the old archive before replacing it.
        let previous = self.file.take();
        if let Err(e) = temp.persist(dest) {
            self.file = previous;
            return Err(Error::Persist {
                path: dest.to_path_buf(),
                source: e.error,
            });
        }
        drop(previous);

        self.commit(dest, written)
    }

    /// Overlays the files under `patch_dir` onto the tree and writes the
    /// result to `output`, or over the archive itself. The original payload
    /// alignment is kept.
    pub fn patch<P: AsRef<Path>>(
        &mut self,
        patch_dir: P,
        output: Option<&Path>,
    ) -> Result<WriteStats> {
        let patch_dir = patch_dir.as_ref();
        self.options.alignment = self.inferred_alignment();
        tracing::info!(
            patch = %patch_dir.display(),
            alignment = self.options.alignment.get(),
            "patching archive"
        );

        for (path, host) in collect_files(patch_dir)? {
            match self.root.lookup(&path) {
                Some(_) => tracing::debug!(path = %path, "replacing"),
                None => tracing::debug!(path = %path, "adding"),
            }
            self.root.insert_file(&path, Payload::Host(host))?;
        }

        let dest = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.path.clone());
        self.write_to(dest)
    }
}
