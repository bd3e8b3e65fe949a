use std::path::PathBuf;

use crate::path::{DatPath, IntoDatPathError};

pub type Result<T> = std::result::Result<T, Error>;

/// The bytes on disk are not a DAT archive this library understands.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("name section signature is {found:?}, expected \"IAN.S\"")]
    Signature { found: Vec<u8> },

    #[error("archive ends inside the {what}")]
    Truncated { what: &'static str },

    #[error("name pointer {offset:#x} lies outside the name section")]
    NameOutOfBounds { offset: u32 },

    #[error("entry {index} has an invalid name")]
    InvalidName {
        index: usize,
        #[source]
        source: IntoDatPathError,
    },

    #[error("entry {index} name is not valid UTF-8")]
    NameEncoding { index: usize },
}

/// The entry table cannot be walked, or a tree cannot be represented by one.
#[derive(Debug, thiserror::Error)]
pub enum StructuralError {
    #[error("entry index {index} is out of bounds ({len} entries)")]
    EntryOutOfBounds { index: usize, len: usize },

    #[error("blob index {index} is out of bounds ({len} blobs)")]
    BlobOutOfBounds { index: usize, len: usize },

    #[error("directory nesting deeper than {depth} levels")]
    TooDeep { depth: usize },

    #[error("{count} entries do not fit 16-bit entry indices")]
    TooManyEntries { count: usize },

    #[error("{count} files do not fit 16-bit blob indices")]
    TooManyBlobs { count: usize },

    #[error("table declares {count} {what}, more than the file can hold")]
    TableTooLarge { what: &'static str, count: u32 },

    #[error("payload of `{path}` is larger than 4 GiB")]
    PayloadTooLarge { path: DatPath },
}

/// A path-addressed operation on the directory tree failed.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("`{path}` already exists as a {found}")]
    KindConflict { path: DatPath, found: &'static str },

    #[error("`{path}` not found")]
    NotFound { path: DatPath },

    #[error("`{path}` is not a directory")]
    NotADirectory { path: DatPath },

    #[error("`{path}` already exists")]
    AlreadyExists { path: DatPath },

    #[error("directory `{path}` is not empty")]
    DirectoryNotEmpty { path: DatPath },

    #[error("cannot move `{from}` into its own subtree at `{to}`")]
    InvalidMove { from: DatPath, to: DatPath },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("invalid archive path")]
    Path(#[from] IntoDatPathError),

    #[error("`{path}` is RNC compressed but no decompressor is configured")]
    NoDecompressor { path: DatPath },

    #[error("cannot decompress `{path}`")]
    Decompress {
        path: DatPath,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot replace `{}`", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
