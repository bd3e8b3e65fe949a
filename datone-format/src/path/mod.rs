use std::{
    fmt,
    path::{Component, Path, PathBuf},
};

mod error;

pub use self::error::IntoDatPathError;

#[cfg(not(windows))]
/// The platform-specific separator as a string, used for printing `DatPath`s
/// in the platform-preferred manner.
pub const PATH_PLATFORM_SEP: &str = "/";

#[cfg(windows)]
/// The platform-specific separator as a string, used for printing `DatPath`s
/// in the platform-preferred manner.
pub const PATH_PLATFORM_SEP: &str = "\\";

/// The separator used inside `DatPath`. Entry names on disk never contain it;
/// it only joins the names of a node's ancestors.
pub const PATH_DAT_SEP: &str = "/";

/// A relative path to a node inside an archive.
///
/// Components are stored exactly as given: no case folding and no Unicode
/// normalisation, because entry names are compared byte-for-byte when the
/// archive is read back.
#[derive(Debug, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct DatPath(pub(crate) String);

fn check_component(part: &str) -> Result<(), IntoDatPathError> {
    if part == "." || part == ".." {
        return Err(IntoDatPathError::RelativeComponent);
    }
    if part.contains('\0') {
        return Err(IntoDatPathError::UnrepresentableStr);
    }
    Ok(())
}

impl DatPath {
    /// Splits `path` on `/` and `\`, dropping empty components.
    pub fn new<S: AsRef<str>>(path: S) -> Result<DatPath, IntoDatPathError> {
        let mut out = vec![];

        for part in path.as_ref().split(['/', '\\']) {
            if part.is_empty() {
                continue;
            }
            check_component(part)?;
            out.push(part);
        }

        if out.is_empty() {
            return Err(IntoDatPathError::EmptyPath);
        }

        Ok(DatPath(out.join(PATH_DAT_SEP)))
    }

    /// Converts a relative host path, such as one produced by walking a
    /// source directory.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<DatPath, IntoDatPathError> {
        let mut out = vec![];

        for component in path.as_ref().components() {
            match component {
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
                Component::ParentDir => return Err(IntoDatPathError::RelativeComponent),
                Component::Normal(os_str) => {
                    let part = os_str
                        .to_str()
                        .ok_or(IntoDatPathError::UnrepresentableStr)?;
                    check_component(part)?;
                    out.push(part);
                }
            }
        }

        if out.is_empty() {
            return Err(IntoDatPathError::EmptyPath);
        }

        Ok(DatPath(out.join(PATH_DAT_SEP)))
    }

    /// Checks a single entry name as stored in a table or a tree node.
    pub fn check_name(name: &str) -> Result<(), IntoDatPathError> {
        if name.is_empty() {
            return Err(IntoDatPathError::EmptyPath);
        }
        if name.contains(['/', '\\']) {
            return Err(IntoDatPathError::UnrepresentableStr);
        }
        check_component(name)
    }

    /// The path made of the first `count` components.
    pub(crate) fn prefix(&self, count: usize) -> DatPath {
        DatPath(self.iter().take(count).collect::<Vec<_>>().join(PATH_DAT_SEP))
    }

    pub fn to_path_buf(&self) -> PathBuf {
        self.iter().collect()
    }

    pub fn parent(&self) -> Option<DatPath> {
        self.0
            .rsplit_once(PATH_DAT_SEP)
            .map(|(parent, _)| DatPath(parent.to_string()))
    }

    pub fn filename(&self) -> &str {
        match self.0.rsplit_once(PATH_DAT_SEP) {
            Some((_, name)) => name,
            None => &self.0,
        }
    }

    pub fn depth(&self) -> usize {
        self.0.matches(PATH_DAT_SEP).count()
    }

    pub fn starts_with(&self, other: &DatPath) -> bool {
        let mut mine = self.iter();
        other.iter().all(|part| mine.next() == Some(part))
    }

    pub fn iter(&self) -> std::str::Split<'_, &str> {
        self.0.split(PATH_DAT_SEP)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.iter();
        if let Some(v) = iter.next() {
            f.write_str(v)?;
        }
        for v in iter {
            f.write_str(PATH_PLATFORM_SEP)?;
            f.write_str(v)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for DatPath {
    type Err = IntoDatPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatPath::new(s)
    }
}
