//! Rebuilds the directory tree from the entry table.

use crate::error::{FormatError, Result, StructuralError};
use crate::node::Directory;
use crate::path::DatPath;
use crate::payload::Payload;
use crate::record::Entry;
use crate::table::FileTable;

/// Deepest directory nesting accepted in either direction.
pub(crate) const MAX_DEPTH: usize = 256;

struct Decoder<'a> {
    table: &'a FileTable,
    root: &'a mut Directory,
}

impl Decoder<'_> {
    fn entry(&self, index: usize) -> Result<Entry> {
        self.table.entries.get(index).copied().ok_or_else(|| {
            StructuralError::EntryOutOfBounds {
                index,
                len: self.table.entries.len(),
            }
            .into()
        })
    }

    fn path(&self, dir: Option<&DatPath>, index: usize) -> Result<DatPath> {
        let name = &self.table.names[index];
        DatPath::check_name(name).map_err(|source| FormatError::InvalidName { index, source })?;
        Ok(match dir {
            Some(dir) => DatPath(format!("{}/{}", dir.as_str(), name)),
            None => DatPath(name.clone()),
        })
    }

    /// Reads sibling entries from `start` until the forward links say the
    /// directory is done. Returns the index after the last entry consumed.
    fn walk(
        &mut self,
        start: usize,
        terminator: i16,
        dir: Option<&DatPath>,
        depth: usize,
    ) -> Result<usize> {
        if depth > MAX_DEPTH {
            return Err(StructuralError::TooDeep { depth: MAX_DEPTH }.into());
        }

        let len = self.table.entries.len();
        let terminator = terminator as i64;
        let mut idx = start;

        loop {
            let entry = self.entry(idx)?;
            let path = self.path(dir, idx)?;

            match entry.blob() {
                Some(blob_idx) => {
                    let blob = *self.table.blobs.get(blob_idx).ok_or(
                        StructuralError::BlobOutOfBounds {
                            index: blob_idx,
                            len: self.table.blobs.len(),
                        },
                    )?;

                    let file = self.root.insert_file(
                        &path,
                        Payload::Archive {
                            offset: blob.data as u64,
                            length: blob.actual_size as u64,
                        },
                    )?;
                    file.blob_index = Some(entry.blob_index);
                    file.info = Some(blob.info());
                    idx += 1;
                }
                None => {
                    self.root.insert_dir(&path)?;
                    idx = self.walk(idx + 1, entry.blob_index, Some(&path), depth + 1)?;
                }
            }

            let link = self.entry(idx - 1)?.node_index as i64;
            let more = (idx < len && link > 0 && link < terminator - 1)
                || (link == 0 && (idx as i64 - 1) < terminator);
            if !more {
                break;
            }
        }

        Ok(idx)
    }
}

/// Inserts every node described by `table` into `root`, binding files to
/// their byte ranges in the archive.
pub(crate) fn decode(table: &FileTable, root: &mut Directory) -> Result<()> {
    if table.entries.len() <= 1 {
        return Ok(());
    }

    let terminator = table.entries[0].blob_index;
    let mut decoder = Decoder { table, root };
    let end = decoder.walk(1, terminator, None, 0)?;

    if end < table.entries.len() {
        tracing::warn!(
            read = end,
            total = table.entries.len(),
            "entry table has entries past the end of the root directory"
        );
    }
    Ok(())
}
