use crate::types::{Short, Word};
use serde::{Deserialize, Serialize};

parsing::parsable_struct! {
    /// Deprecated, still found in old sprites
    #[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
    pub struct MaskChunk {
        pub x: Short,
        pub y: Short,
        pub width: Word,
        pub height: Word,
        pub name: String,
        /// One bit per pixel, rows padded to whole bytes
        #[parse(sized_buf = bitmap_len(width, height))]
        pub bitmap: Vec<u8>,
    }
}

pub fn bitmap_len(width: Word, height: Word) -> usize {
    usize::from(height) * usize::from(width).div_ceil(8)
}

impl MaskChunk {
    pub fn has_valid_bitmap(&self) -> bool {
        self.bitmap.len() == bitmap_len(self.width, self.height)
    }
}
