use std::path::PathBuf;

use datone_format::{ArchiveOptions, DatPath, Endianness, FileNode, Payload};
use humansize::{file_size_opts as options, FileSize};

use crate::error::{Error, Result};

#[inline(always)]
fn size(bytes: u64) -> String {
    bytes
        .file_size(options::BINARY)
        .unwrap_or_else(|_| bytes.to_string())
}

#[inline(always)]
fn method(file: &FileNode) -> &'static str {
    match file.info() {
        Some(info) if info.compressed => "RNC",
        Some(_) => "Stored",
        None => "-",
    }
}

fn offset(file: &FileNode) -> String {
    match file.payload() {
        Payload::Archive { offset, .. } => format!("{:#010x}", offset),
        _ => "-".into(),
    }
}

pub fn run(
    path: PathBuf,
    endian: Endianness,
    list_dir: Option<DatPath>,
    verbose: bool,
) -> Result<()> {
    let archive = super::open_archive(&path, ArchiveOptions::default().with_endianness(endian))?;

    let tree = archive
        .list(list_dir.as_ref())
        .map_err(|source| Error::List {
            path: path.clone(),
            source,
        })?;

    if !verbose {
        print!("{}", tree);
        return Ok(());
    }

    println!("Method  Offset        Packed         Unpacked       Path");
    println!("------  ------------  -------------  -------------  --------");
    for (file_path, file) in archive.root().files() {
        if let Some(dir) = list_dir.as_ref() {
            if !file_path.starts_with(dir) {
                continue;
            }
        }

        let (packed, unpacked) = match file.info() {
            Some(info) => (
                size(info.actual_size as u64),
                size(info.uncompressed_size as u64),
            ),
            None => ("-".into(), "-".into()),
        };

        println!(
            "{:6}  {:12}  {:>12}   {:>12}   {}",
            method(file),
            offset(file),
            packed,
            unpacked,
            file_path,
        );
    }

    Ok(())
}
