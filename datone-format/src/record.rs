pub(crate) const ENTRY_SIZE: u64 = 8;
pub(crate) const BLOB_SIZE: u64 = 16;

/// One node of the flattened tree.
///
/// `blob_index <= 0` marks a file whose blob is `-blob_index`. A positive value
/// marks a directory and doubles as the scan terminator for its children.
/// `node_index` is the forward link the decoder tests to decide whether the
/// next entry is still a sibling; `0` means "no link".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Entry {
    pub blob_index: i16,
    pub node_index: i16,
    /// Offset of the NUL-terminated name, relative to the first name string.
    pub name: u32,
}

impl Entry {
    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        self.blob_index < 1
    }

    /// Blob table index of a leaf entry.
    #[inline(always)]
    pub fn blob(&self) -> Option<usize> {
        if self.is_leaf() {
            Some(-(self.blob_index as i32) as usize)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blob {
    /// Absolute offset of the payload.
    pub data: u32,
    pub actual_size: u32,
    pub uncompressed_size: u32,
    pub compress_flag: u32,
}

impl Blob {
    #[inline(always)]
    pub fn is_compressed(&self) -> bool {
        self.compress_flag == 1
    }

    pub fn info(&self) -> BlobInfo {
        BlobInfo {
            actual_size: self.actual_size,
            uncompressed_size: self.uncompressed_size,
            compressed: self.is_compressed(),
        }
    }
}

/// The size and compression facts recorded for a file in the blob table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobInfo {
    pub actual_size: u32,
    pub uncompressed_size: u32,
    pub compressed: bool,
}
