use std::num::NonZeroU32;
use std::path::PathBuf;

use datone_format::{Archive, ArchiveOptions, Endianness, Game};

use crate::error::{Error, Result};

pub fn run(
    path: PathBuf,
    endian: Endianness,
    game: Game,
    data_dir: PathBuf,
    alignment: NonZeroU32,
) -> Result<()> {
    super::require_dir(&data_dir)?;

    let options = ArchiveOptions::default()
        .with_endianness(endian)
        .with_game(game)
        .with_alignment(alignment);

    let stats = Archive::create(&path, options)
        .build(&data_dir)
        .map_err(|source| Error::BuildArchive {
            path: path.clone(),
            source,
        })?;

    println!(
        "{}: wrote {} files ({} bytes)",
        path.display(),
        stats.files,
        stats.bytes
    );
    Ok(())
}
