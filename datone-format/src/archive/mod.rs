use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Seek, SeekFrom};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use crate::de::DeserializeOwned;
use crate::decode::decode;
use crate::error::{Error, Result, TreeError};
use crate::header::{DatHeader, HeaderLayout, HEADER_SIZE};
use crate::node::{Directory, FileNode, Node, NodeKind, TreeDisplay};
use crate::path::DatPath;
use crate::payload::{Payload, PayloadReader};
use crate::table::FileTable;

mod options;
mod reader;
mod writer;

pub use self::options::ArchiveOptions;
pub use self::reader::ExtractStats;
pub use self::writer::WriteStats;

/// A DAT archive: its directory tree, and the file the tree's payloads
/// point into.
#[derive(Debug)]
pub struct Archive {
    pub(crate) path: PathBuf,
    pub(crate) file: Option<File>,
    pub(crate) options: ArchiveOptions,
    pub(crate) root: Directory,
    /// Files copied out for in-place modification, by archive path.
    pub(crate) staged: HashMap<DatPath, PathBuf>,
}

impl Archive {
    /// Opens and reads an existing archive.
    pub fn open<P: AsRef<Path>>(path: P, options: ArchiveOptions) -> Result<Archive> {
        let file = OpenOptions::new().read(true).open(path.as_ref())?;

        let mut archive = Archive {
            path: path.as_ref().to_path_buf(),
            file: Some(file),
            options,
            root: Directory::default(),
            staged: HashMap::new(),
        };
        archive.read()?;
        Ok(archive)
    }

    /// Starts an empty archive. Nothing is written until it is built.
    pub fn create<P: AsRef<Path>>(path: P, options: ArchiveOptions) -> Archive {
        Archive {
            path: path.as_ref().to_path_buf(),
            file: None,
            options,
            root: Directory::default(),
            staged: HashMap::new(),
        }
    }

    /// Replaces the tree with the one stored in the backing file.
    pub fn read(&mut self) -> Result<()> {
        let file = self.file.as_ref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "archive has not been written yet")
        })?;
        let endian = self.options.endianness;
        tracing::info!(path = %self.path.display(), %endian, "reading archive");

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(0))?;
        let header = DatHeader::deserialize_owned(&mut reader, endian)?;
        reader.seek(SeekFrom::Start(header.table as u64))?;
        let table = FileTable::deserialize_owned(&mut reader, endian)?;

        self.options.header_layout = header.layout(table.signature_offset);
        if let HeaderLayout::SigningKey(key) = self.options.header_layout {
            tracing::debug!(key = format_args!("{:#010x}", key), "header carries a signing key");
        }

        let mut root = Directory::default();
        decode(&table, &mut root)?;
        self.root = root;

        tracing::info!(
            entries = table.entries.len(),
            blobs = table.blobs.len(),
            checksum = format_args!("{:#010x}", table.checksum),
            "read archive"
        );
        Ok(())
    }

    #[inline(always)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline(always)]
    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    #[inline(always)]
    pub fn options_mut(&mut self) -> &mut ArchiveOptions {
        &mut self.options
    }

    #[inline(always)]
    pub fn root(&self) -> &Directory {
        &self.root
    }

    #[inline(always)]
    pub fn root_mut(&mut self) -> &mut Directory {
        &mut self.root
    }

    /// Alignment of the archive as written: the lowest payload offset when
    /// it lies past the header, otherwise none.
    pub fn inferred_alignment(&self) -> NonZeroU32 {
        self.root
            .files()
            .into_iter()
            .filter_map(|(_, file)| match file.payload {
                Payload::Archive { offset, .. } => Some(offset),
                _ => None,
            })
            .min()
            .filter(|offset| *offset > HEADER_SIZE)
            .and_then(|offset| u32::try_from(offset).ok())
            .and_then(NonZeroU32::new)
            .unwrap_or(NonZeroU32::MIN)
    }

    #[inline(always)]
    pub fn lookup(&self, path: &DatPath) -> Option<&Node> {
        self.root.lookup(path)
    }

    /// Finds or creates a placeholder node at `path`.
    #[inline(always)]
    pub fn insert(&mut self, path: &DatPath, kind: NodeKind) -> Result<&mut Node> {
        Ok(self.root.insert(path, kind)?)
    }

    pub fn insert_file(&mut self, path: &DatPath, payload: Payload) -> Result<&mut FileNode> {
        Ok(self.root.insert_file(path, payload)?)
    }

    /// Renders the whole tree, or the subdirectory at `subdir`.
    pub fn list(&self, subdir: Option<&DatPath>) -> Result<TreeDisplay<'_>> {
        let dir = match subdir {
            None => &self.root,
            Some(path) => match self.root.lookup(path) {
                Some(Node::Directory(dir)) => dir,
                Some(Node::File(_)) => {
                    return Err(TreeError::NotADirectory { path: path.clone() }.into())
                }
                None => return Err(TreeError::NotFound { path: path.clone() }.into()),
            },
        };
        Ok(dir.display_tree())
    }

    #[inline(always)]
    pub fn open_payload<'a>(&self, file: &'a FileNode) -> io::Result<PayloadReader<'a>> {
        file.payload.open(self.file.as_ref())
    }

    fn staging_dir(&self) -> PathBuf {
        match &self.options.staging_dir {
            Some(dir) => dir.clone(),
            None => self
                .path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("_virt"),
        }
    }

    fn file_at(&self, path: &DatPath) -> Result<&FileNode> {
        match self.root.lookup(path) {
            Some(Node::File(file)) => Ok(file),
            Some(Node::Directory(_)) => Err(TreeError::KindConflict {
                path: path.clone(),
                found: "directory",
            }
            .into()),
            None => Err(TreeError::NotFound { path: path.clone() }.into()),
        }
    }

    /// Copies a file's current bytes into the staging directory and points
    /// the file at the copy, so it can be modified in place. Returns the
    /// staged host path.
    pub fn stage(&mut self, path: &DatPath) -> Result<PathBuf> {
        let file = self.file_at(path)?;
        if let Some(staged) = self.staged.get(path) {
            return Ok(staged.clone());
        }

        let dest = self.staging_dir().join(path.to_path_buf());
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let bytes = {
            let mut reader = self.open_payload(file)?;
            let mut out = File::create(&dest)?;
            io::copy(&mut reader, &mut out)?
        };
        tracing::debug!(path = %path, dest = %dest.display(), bytes, "staged file");

        if let Some(file) = self.root.lookup_mut(path).and_then(Node::as_file_mut) {
            file.set_payload(Payload::Host(dest.clone()));
        }
        self.staged.insert(path.clone(), dest.clone());
        Ok(dest)
    }

    fn unstage(&mut self, path: &DatPath) {
        if let Some(host) = self.staged.remove(path) {
            if let Err(e) = std::fs::remove_file(&host) {
                tracing::warn!(path = %host.display(), error = %e, "could not delete staged file");
            }
        }
    }

    /// Removes the node at `path` along with anything staged below it.
    pub fn remove(&mut self, path: &DatPath, recursive: bool) -> Result<Node> {
        let node = self.root.remove(path, recursive)?;

        let staged = self
            .staged
            .keys()
            .filter(|k| k.starts_with(path))
            .cloned()
            .collect::<Vec<_>>();
        for k in staged {
            self.unstage(&k);
        }
        Ok(node)
    }

    /// Moves the node at `from` to `to`, carrying staged files along.
    pub fn rename(&mut self, from: &DatPath, to: &DatPath, replace: bool) -> Result<()> {
        if from == to {
            self.root.rename(from, to, replace)?;
            return Ok(());
        }

        let replaced = self
            .staged
            .keys()
            .filter(|k| k.starts_with(to))
            .cloned()
            .collect::<Vec<_>>();

        self.root.rename(from, to, replace)?;

        for k in replaced {
            self.unstage(&k);
        }

        let moved = self
            .staged
            .keys()
            .filter(|k| k.starts_with(from))
            .cloned()
            .collect::<Vec<_>>();
        let staging = self.staging_dir();

        for old in moved {
            let host = match self.staged.remove(&old) {
                Some(host) => host,
                None => continue,
            };
            let new = DatPath(format!("{}{}", to.as_str(), &old.as_str()[from.as_str().len()..]));
            let new_host = staging.join(new.to_path_buf());
            if let Some(parent) = new_host.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::rename(&host, &new_host).map_err(|source| Error::Persist {
                path: new_host.clone(),
                source,
            })?;

            if let Some(file) = self.root.lookup_mut(&new).and_then(Node::as_file_mut) {
                file.payload = Payload::Host(new_host.clone());
            }
            self.staged.insert(new, new_host);
        }
        Ok(())
    }
}
