use std::path::PathBuf;

use datone_format::{ArchiveOptions, Endianness};

use crate::error::{Error, Result};

pub fn run(
    paths: Vec<PathBuf>,
    endian: Endianness,
    output_dir: PathBuf,
    decompress: bool,
    propack: PathBuf,
    verbose: bool,
) -> Result<()> {
    let mut options = ArchiveOptions::default().with_endianness(endian);
    if decompress {
        options = options.with_propack(propack);
    }

    for path in paths {
        let archive = super::open_archive(&path, options.clone())?;

        if verbose {
            for (file_path, _) in archive.root().files() {
                println!("{}", file_path);
            }
        }

        let stats = archive
            .extract(&output_dir, decompress)
            .map_err(|source| Error::Extract {
                path: path.clone(),
                source,
            })?;

        println!(
            "{}: extracted {} files ({} decompressed) into {}",
            path.display(),
            stats.files,
            stats.decompressed,
            output_dir.display()
        );
    }

    Ok(())
}
