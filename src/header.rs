use crate::types::{impl_flags_codec, Byte, Dword, Short, Word};
use serde::{Deserialize, Serialize};

pub const HEADER_MAGIC: Word = 0xA5E0;

parsing::parsable_enum! {
    /// Stored in the header as the color depth in bits per pixel.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    #[repr(u16)]
    pub enum PixelFormat {
        Indexed = 8,
        Grayscale = 16,
        Rgba = 32,
    }
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Indexed => 1,
            Self::Grayscale => 2,
            Self::Rgba => 4,
        }
    }

    pub const fn color_depth(self) -> Word {
        self as Word
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
    pub struct HeaderFlags: Dword {
        const LAYER_OPACITY_VALID = 1;
        const GROUP_OPACITY_VALID = 2;
        const LAYER_UUIDS = 4;
    }
}

impl_flags_codec!(HeaderFlags, Dword);

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
    pub struct Header {
        pub file_size: Dword,
        [[magic: Word = HEADER_MAGIC]]
        pub frame_count: Word,
        pub width: Word,
        pub height: Word,
        pub pixel_format: PixelFormat,
        pub flags: HeaderFlags,
        /// Deprecated, now on each frame
        pub speed: Word,
        [[ignore: Dword]]
        [[ignore: Dword]]
        /// Only meaningful for indexed sprites
        pub transparent_index: Byte,
        [[padding_bytes = 3]]
        /// 0 means 256 for old sprites
        pub num_colors: Word,
        pub pixel_width: Byte,
        pub pixel_height: Byte,
        pub grid_x: Short,
        pub grid_y: Short,
        pub grid_width: Word,
        pub grid_height: Word,
        [[padding_bytes = 84]]
    }
}

impl Header {
    pub const LEN: usize = 128;

    /// Header for an empty sprite. Sizes and counts are filled in when frames
    /// are attached to a `Document` and again when it is written.
    pub fn new(width: Word, height: Word, pixel_format: PixelFormat) -> Self {
        Self {
            file_size: Self::LEN as Dword,
            frame_count: 0,
            width,
            height,
            pixel_format,
            flags: HeaderFlags::LAYER_OPACITY_VALID,
            speed: 100,
            transparent_index: 0,
            num_colors: 256,
            pixel_width: 1,
            pixel_height: 1,
            grid_x: 0,
            grid_y: 0,
            grid_width: 16,
            grid_height: 16,
        }
    }
}
