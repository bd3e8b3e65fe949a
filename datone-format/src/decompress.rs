use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Turns a packed payload into its original bytes.
pub trait Decompressor {
    fn decompress(&self, packed: &Path, dest: &Path) -> io::Result<()>;
}

impl<F> Decompressor for F
where
    F: Fn(&Path, &Path) -> io::Result<()>,
{
    fn decompress(&self, packed: &Path, dest: &Path) -> io::Result<()> {
        self(packed, dest)
    }
}

/// Runs the external ProPack tool as `<program> u <packed> <dest>`.
#[derive(Debug, Clone)]
pub struct ProPack {
    program: PathBuf,
}

impl ProPack {
    pub fn new<P: Into<PathBuf>>(program: P) -> ProPack {
        ProPack {
            program: program.into(),
        }
    }
}

impl Decompressor for ProPack {
    fn decompress(&self, packed: &Path, dest: &Path) -> io::Result<()> {
        tracing::debug!(
            program = %self.program.display(),
            packed = %packed.display(),
            dest = %dest.display(),
            "running decompressor"
        );

        let status = Command::new(&self.program)
            .arg("u")
            .arg(packed)
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()?;

        if !status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("`{}` failed with {}", self.program.display(), status),
            ));
        }
        Ok(())
    }
}
