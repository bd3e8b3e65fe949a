//! Reading and writing TT Games DAT archives.
//!
//! An archive is an 8-byte header, the file payloads, and a file table that
//! flattens the directory tree into fixed-size entries linked by 16-bit
//! indices. [`Archive`] owns the tree and the backing file; [`encode`] and
//! the decoder translate between the tree and the table.

mod archive;
mod de;
mod decode;
mod decompress;
mod encode;
mod endian;
mod error;
pub mod fs;
mod game;
mod header;
mod node;
pub mod order;
pub mod path;
mod payload;
mod record;
pub mod rnc;
mod ser;
mod table;

pub use archive::{Archive, ArchiveOptions, ExtractStats, WriteStats};
pub use decompress::{Decompressor, ProPack};
pub use encode::{encode, EncodedTable};
pub use endian::{Endianness, ParseEndiannessError};
pub use error::{Error, FormatError, Result, StructuralError, TreeError};
pub use game::{Game, ParseGameError};
pub use header::HeaderLayout;
pub use node::{Directory, FileNode, Node, NodeKind, TreeDisplay};
pub use path::{DatPath, IntoDatPathError};
pub use payload::{Payload, PayloadReader, Segment};
pub use record::{Blob, BlobInfo, Entry};
