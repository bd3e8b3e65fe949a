use std::path::PathBuf;

use datone_format::{ArchiveOptions, Endianness, Game};

use crate::error::{Error, Result};

pub fn run(
    path: PathBuf,
    endian: Endianness,
    game: Game,
    patch_dir: PathBuf,
    output_file: Option<PathBuf>,
) -> Result<()> {
    super::require_dir(&patch_dir)?;

    let options = ArchiveOptions::default()
        .with_endianness(endian)
        .with_game(game);
    let mut archive = super::open_archive(&path, options)?;

    let stats = archive
        .patch(&patch_dir, output_file.as_deref())
        .map_err(|source| Error::Patch {
            path: path.clone(),
            source,
        })?;

    println!(
        "{}: wrote {} files ({} bytes)",
        archive.path().display(),
        stats.files,
        stats.bytes
    );
    Ok(())
}
