use std::num::NonZeroU32;
use std::path::PathBuf;

use crate::endian::Endianness;
use crate::game::Game;
use crate::header::HeaderLayout;

/// Settings an [`Archive`](super::Archive) is opened or created with.
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    pub game: Game,
    pub endianness: Endianness,
    /// Payload alignment used when writing. `1` packs payloads back to back.
    pub alignment: NonZeroU32,
    /// Replaced by the layout found on disk when an archive is read.
    pub header_layout: HeaderLayout,
    /// External ProPack program used to unpack RNC payloads on extraction.
    pub propack: Option<PathBuf>,
    /// Where files are copied to while being modified in place. Defaults to
    /// `_virt` next to the archive.
    pub staging_dir: Option<PathBuf>,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        ArchiveOptions {
            game: Game::default(),
            endianness: Endianness::default(),
            alignment: NonZeroU32::MIN,
            header_layout: HeaderLayout::default(),
            propack: None,
            staging_dir: None,
        }
    }
}

impl ArchiveOptions {
    pub fn with_game(mut self, game: Game) -> Self {
        self.game = game;
        self
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn with_alignment(mut self, alignment: NonZeroU32) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_header_layout(mut self, header_layout: HeaderLayout) -> Self {
        self.header_layout = header_layout;
        self
    }

    pub fn with_propack<P: Into<PathBuf>>(mut self, program: P) -> Self {
        self.propack = Some(program.into());
        self
    }

    pub fn with_staging_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }
}
