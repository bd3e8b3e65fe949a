use std::path::Path;

use datone_format::{Archive, ArchiveOptions};

use crate::error::{Error, Result};

pub mod build;
pub mod extract;
pub mod list;
pub mod modify;

pub use build::run as build;
pub use extract::run as extract;
pub use list::run as list;
pub use modify::run as modify;

fn open_archive(path: &Path, options: ArchiveOptions) -> Result<Archive> {
    Archive::open(path, options).map_err(|source| Error::OpenArchive {
        path: path.to_path_buf(),
        source,
    })
}

fn require_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(Error::MissingDirectory { path: path.to_path_buf() })
    }
}
