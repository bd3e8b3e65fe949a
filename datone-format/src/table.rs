use crate::record::{Blob, Entry};

/// Signature closing the name section.
pub(crate) const SIGNATURE: &[u8; 5] = b"IAN.S";

/// Never validated by the games; always written as all ones.
pub(crate) const CHECKSUM_SENTINEL: u32 = u32::MAX;

/// The decoded file table. `names[i]` belongs to `entries[i]`.
#[derive(Debug, Default)]
pub(crate) struct FileTable {
    pub(crate) checksum: u32,
    pub(crate) blobs: Vec<Blob>,
    pub(crate) entries: Vec<Entry>,
    pub(crate) names: Vec<String>,
    /// Signature offset relative to the start of the table, as found on read.
    pub(crate) signature_offset: u32,
}

/// Where a freshly written table landed. Offsets are absolute.
#[derive(Debug)]
pub(crate) struct TableLayout {
    pub(crate) start: u64,
    pub(crate) signature: u64,
}

/// A 32-bit reference written as a placeholder, resolved once its target has
/// been written.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fixup {
    pub(crate) at: u64,
    pub(crate) value: u32,
}
