use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot open archive `{}`", .path.display())]
    OpenArchive {
        path: PathBuf,
        #[source]
        source: datone_format::Error,
    },

    #[error("Cannot list archive `{}`", .path.display())]
    List {
        path: PathBuf,
        #[source]
        source: datone_format::Error,
    },

    #[error("Cannot extract archive `{}`", .path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: datone_format::Error,
    },

    #[error("Cannot build archive `{}`", .path.display())]
    BuildArchive {
        path: PathBuf,
        #[source]
        source: datone_format::Error,
    },

    #[error("Cannot patch archive `{}`", .path.display())]
    Patch {
        path: PathBuf,
        #[source]
        source: datone_format::Error,
    },

    #[error("Data directory `{}` does not exist", .path.display())]
    MissingDirectory { path: PathBuf },
}
