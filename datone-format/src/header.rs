/// Size of the archive header: the table pointer and the layout-dependent
/// second field.
pub(crate) const HEADER_SIZE: u64 = 8;

/// How the second header field is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderLayout {
    /// Offset of the name-section signature, relative to the file table.
    #[default]
    NamesEnd,
    /// An opaque key written by some game builds, kept verbatim.
    SigningKey(u32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DatHeader {
    /// Absolute offset of the file table.
    pub(crate) table: u32,
    pub(crate) trailer: u32,
}

impl DatHeader {
    /// Infers the layout from where the table's signature actually landed.
    pub(crate) fn layout(&self, signature_offset: u32) -> HeaderLayout {
        if self.trailer == signature_offset {
            HeaderLayout::NamesEnd
        } else {
            HeaderLayout::SigningKey(self.trailer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_inference() {
        let header = DatHeader {
            table: 0x100,
            trailer: 0x48,
        };
        assert_eq!(header.layout(0x48), HeaderLayout::NamesEnd);
        assert_eq!(header.layout(0x50), HeaderLayout::SigningKey(0x48));
    }
}
