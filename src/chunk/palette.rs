use crate::types::{Byte, Dword, Word};
use rgb::{RGB8, RGBA8};
use serde::{Deserialize, Serialize};

parsing::parsable_struct! {
    /// Palette chunk written by old versions, also used for 6-bit (0..63) palettes.
    #[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
    pub struct OldPaletteChunk {
        [[param: Word = num_packets, encode = self.packets.len()]]
        #[parse(collection: OldPalettePacket = num_packets)]
        pub packets: Vec<OldPalettePacket>,
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
    pub struct OldPalettePacket {
        /// Number of palette entries to skip from the last packet
        pub skip: Byte,
        [[param: Byte = num_colors, encode = packet_color_byte(self.colors.len())]]
        #[parse(collection: RGB8 = packet_color_count(num_colors))]
        pub colors: Vec<RGB8>,
    }
}

fn packet_color_count(num_colors: Byte) -> usize {
    match num_colors {
        0 => 256,
        n => usize::from(n),
    }
}

// a packet cannot hold zero colors, usize::MAX makes the count overflow its byte
fn packet_color_byte(len: usize) -> usize {
    match len {
        256 => 0,
        0 => usize::MAX,
        n => n,
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
    pub struct PaletteChunk {
        /// Total number of entries in the palette after this chunk is applied
        pub new_size: Dword,
        pub first_index: Dword,
        [[param: Dword = last_index, encode = self.last_index()]]
        [[padding_bytes = 8]]
        #[parse(collection: PaletteEntry = palette_entry_count(first_index, last_index))]
        pub entries: Vec<PaletteEntry>,
    }
}

// wrapping so an empty entry list survives a write and read
fn palette_entry_count(first_index: Dword, last_index: Dword) -> Dword {
    last_index.wrapping_sub(first_index).wrapping_add(1)
}

impl PaletteChunk {
    /// Palette replacing entries starting at index 0.
    pub fn new(entries: Vec<PaletteEntry>) -> Self {
        Self {
            new_size: Dword::try_from(entries.len()).unwrap_or(Dword::MAX),
            first_index: 0,
            entries,
        }
    }

    pub fn last_index(&self) -> Dword {
        let len = Dword::try_from(self.entries.len()).unwrap_or(Dword::MAX);
        self.first_index.wrapping_add(len).wrapping_sub(1)
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
    pub struct PaletteEntry {
        [[param: Word = entry_flags, encode = Word::from(self.name.is_some())]]
        pub color: RGBA8,
        #[parse(option_if: String = (entry_flags & 1) != 0)]
        pub name: Option<String>,
    }
}

impl PaletteEntry {
    pub fn new(color: RGBA8) -> Self {
        Self { color, name: None }
    }

    pub fn named(color: RGBA8, name: impl Into<String>) -> Self {
        Self {
            color,
            name: Some(name.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use parsing::{ReadBytes, WriteBytes};

    #[test]
    fn zero_color_byte_means_256() {
        let mut bytes: Vec<u8> = vec![1, 0, 3, 0];
        bytes.extend(std::iter::repeat(7).take(256 * 3));
        let mut b = bytes.as_slice();
        let chunk: OldPaletteChunk = b.read_type_le().unwrap();
        assert!(b.is_empty());
        assert_eq!(chunk.packets[0].skip, 3);
        assert_eq!(chunk.packets[0].colors.len(), 256);

        let mut out = Vec::new();
        out.write_type_le(&chunk).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn empty_packet_cannot_be_written() {
        let chunk = OldPaletteChunk {
            packets: vec![OldPalettePacket {
                skip: 0,
                colors: Vec::new(),
            }],
        };
        let mut out = Vec::new();
        assert!(out.write_type_le(&chunk).is_err());
    }

    #[test]
    fn unnamed_entry_has_no_name_bytes() {
        let mut out = Vec::new();
        out.write_type_le(&PaletteEntry::new(RGBA8::new(1, 2, 3, 4)))
            .unwrap();
        assert_eq!(out, [0, 0, 1, 2, 3, 4]);

        let mut out = Vec::new();
        out.write_type_le(&PaletteEntry::named(RGBA8::new(1, 2, 3, 4), "ab"))
            .unwrap();
        assert_eq!(out, [1, 0, 1, 2, 3, 4, 2, 0, b'a', b'b']);
    }

    #[test]
    fn entry_count_from_index_range() {
        let mut chunk = PaletteChunk::new(vec![PaletteEntry::new(RGBA8::default()); 3]);
        chunk.first_index = 5;
        assert_eq!(chunk.last_index(), 7);

        let mut out = Vec::new();
        out.write_type_le(&chunk).unwrap();
        assert_eq!(&out[8..12], &[7, 0, 0, 0]);

        let mut b = out.as_slice();
        assert_eq!(b.read_type_le::<PaletteChunk>().unwrap(), chunk);

        let empty = PaletteChunk::new(Vec::new());
        let mut out = Vec::new();
        out.write_type_le(&empty).unwrap();
        let mut b = out.as_slice();
        assert_eq!(b.read_type_le::<PaletteChunk>().unwrap(), empty);
    }
}
