//! Enumerating host directories into archive paths.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::path::DatPath;

/// Every regular file below `root`, paired with its path inside an archive.
///
/// Symlinks are not followed. Names that are not valid UTF-8 are rejected.
pub fn collect_files<P: AsRef<Path>>(root: P) -> Result<Vec<(DatPath, PathBuf)>> {
    let root = root.as_ref();
    let mut out = vec![];

    for entry in jwalk::WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .sort(true)
    {
        let entry = entry.map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = pathdiff::diff_paths(&path, root).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("`{}` is not below `{}`", path.display(), root.display()),
            )
        })?;

        out.push((DatPath::from_path(&relative)?, path));
    }

    tracing::debug!(root = %root.display(), files = out.len(), "collected files");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_archive_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("chars/ai")).unwrap();
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();
        std::fs::write(dir.path().join("chars/ai/hero.ai"), b"ai").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"hi").unwrap();

        let mut files = collect_files(dir.path()).unwrap();
        files.sort();
        let paths = files
            .iter()
            .map(|(path, _)| path.as_str())
            .collect::<Vec<_>>();
        assert_eq!(paths, vec!["chars/ai/hero.ai", "readme.txt"]);
        assert_eq!(files[1].1, dir.path().join("readme.txt"));
    }
}
